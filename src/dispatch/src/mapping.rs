//! Dynamic page mapping
//!
//! Maps a top-level path identifier to a module name through a table of
//! mapping rows. Unpublished rows are forbidden, private rows need the
//! `user` role.

use crate::context::RequestContext;
use crate::signal::ControlSignal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use wiking_authz::roles;
use wiking_core::{Condition, Record, RecordLookup};

/// Column names of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingColumns {
    pub identifier: String,
    pub module: String,
    pub published: String,
    pub private: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            identifier: "identifier".to_string(),
            module: "modname".to_string(),
            published: "published".to_string(),
            private: "private".to_string(),
        }
    }
}

pub struct PageMapping {
    rows: Arc<dyn RecordLookup>,
    columns: MappingColumns,
}

impl PageMapping {
    pub fn new(rows: Arc<dyn RecordLookup>) -> Self {
        Self::with_columns(rows, MappingColumns::default())
    }

    pub fn with_columns(rows: Arc<dyn RecordLookup>, columns: MappingColumns) -> Self {
        Self { rows, columns }
    }

    /// Module name mapped to `identifier`
    pub async fn resolve(&self, req: &RequestContext, identifier: &str) -> Result<String, ControlSignal> {
        let row = self
            .rows
            .find_one(&[Condition::eq(&self.columns.identifier, identifier)])
            .await?
            .ok_or(ControlSignal::NotFound)?;

        if !self.published(&row) {
            return Err(ControlSignal::Forbidden);
        }
        if row.flag(&self.columns.private) && !req.has_any_role(&[roles::USER.to_string()]).await {
            return Err(req.denial().await);
        }

        row.text(&self.columns.module).ok_or_else(|| {
            ControlSignal::Internal(format!("mapping '{}' names no module", identifier))
        })
    }

    /// Rows without a published flag count as published
    fn published(&self, row: &Record) -> bool {
        !matches!(row.get(&self.columns.published), Some(Value::Bool(false)))
    }
}
