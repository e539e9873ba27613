//! Record lookup used by path resolution

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;

/// Column equality condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub value: String,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn holds(&self, record: &Record) -> bool {
        record.matches(&self.column, &self.value)
    }
}

/// Read access to the rows of one data object
///
/// All conditions of a query must hold for a row to match.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Row whose key is `key`
    async fn get(&self, key: &str) -> Result<Option<Record>>;

    /// First row matching all conditions
    async fn find_one(&self, conditions: &[Condition]) -> Result<Option<Record>>;

    /// All rows matching all conditions, in storage order
    async fn select(&self, conditions: &[Condition]) -> Result<Vec<Record>>;
}
