//! Data rows as seen by modules and the authorization gate

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a module's data, identified by its key column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl Record {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Map::new(),
        }
    }

    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Column value rendered as text, the form path segments compare against
    ///
    /// Strings are returned as-is, numbers and booleans in their display
    /// form. Null, arrays and objects have no text form.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.values.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn flag(&self, column: &str) -> bool {
        matches!(self.values.get(column), Some(Value::Bool(true)))
    }

    pub fn matches(&self, column: &str, value: &str) -> bool {
        self.text(column).as_deref() == Some(value)
    }
}
