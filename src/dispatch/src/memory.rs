//! In-memory record store

use async_trait::async_trait;
use parking_lot::RwLock;
use wiking_core::{Condition, Record, RecordLookup, Result};

/// Rows of one data object held in memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    rows: RwLock<Vec<Record>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            rows: RwLock::new(records),
        }
    }

    /// Insert a row, replacing any row with the same key
    pub fn insert(&self, record: Record) {
        let mut rows = self.rows.write();
        match rows.iter_mut().find(|r| r.key == record.key) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

fn matches_all(record: &Record, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| c.holds(record))
}

#[async_trait]
impl RecordLookup for InMemoryRecords {
    async fn get(&self, key: &str) -> Result<Option<Record>> {
        Ok(self.rows.read().iter().find(|r| r.key == key).cloned())
    }

    async fn find_one(&self, conditions: &[Condition]) -> Result<Option<Record>> {
        Ok(self
            .rows
            .read()
            .iter()
            .find(|r| matches_all(r, conditions))
            .cloned())
    }

    async fn select(&self, conditions: &[Condition]) -> Result<Vec<Record>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| matches_all(r, conditions))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryRecords {
        InMemoryRecords::with_records(vec![
            Record::new("1").with_value("uid", 1).with_value("login", "joe"),
            Record::new("2").with_value("uid", 2).with_value("login", "ann"),
            Record::new("3").with_value("uid", 1).with_value("login", "joe2"),
        ])
    }

    #[tokio::test]
    async fn test_find_one_requires_all_conditions() {
        let store = store();
        let found = store
            .find_one(&[Condition::eq("uid", "1"), Condition::eq("login", "joe2")])
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.key), Some("3".to_string()));

        let missing = store.find_one(&[Condition::eq("login", "eve")]).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_by_key_ignores_values() {
        let store = InMemoryRecords::with_records(vec![Record::new("10").with_value("title", "x")]);
        assert!(store.get("10").await.unwrap().is_some());
        assert!(store.get("11").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_keeps_order() {
        let rows = store().select(&[Condition::eq("uid", "1")]).await.unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_insert_replaces_same_key() {
        let store = store();
        store.insert(Record::new("2").with_value("login", "anna"));
        assert_eq!(store.len(), 3);
        let found = store.find_one(&[Condition::eq("login", "anna")]).await.unwrap();
        assert!(found.is_some());
    }
}
