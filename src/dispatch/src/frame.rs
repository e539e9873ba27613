//! Forwarding frames

use crate::module::{Binding, Module};
use crate::path::uri_of;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use wiking_core::Record;

/// Data a forwarding module hands to the module it forwards to
#[derive(Debug, Clone, Default)]
pub struct ForwardMetadata {
    /// Binding through which the target was reached
    pub binding: Option<Binding>,
    /// Record of the forwarding module the binding applies to
    pub record: Option<Record>,
    /// Name of the forwarding module
    pub forwarded_by: Option<String>,
    pub title: Option<String>,
    pub args: BTreeMap<String, String>,
}

impl ForwardMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of a binding delegation
    pub fn binding(binding: Binding, record: Record, forwarded_by: &str, title: impl Into<String>) -> Self {
        Self {
            binding: Some(binding),
            record: Some(record),
            forwarded_by: Some(forwarded_by.to_string()),
            title: Some(title.into()),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

/// One entry of the forwarding stack
#[derive(Clone)]
pub struct ForwardFrame {
    module: Arc<dyn Module>,
    resolved: Vec<String>,
    unresolved: Vec<String>,
    metadata: Arc<ForwardMetadata>,
}

impl ForwardFrame {
    pub(crate) fn new(
        module: Arc<dyn Module>,
        resolved: Vec<String>,
        unresolved: Vec<String>,
        metadata: ForwardMetadata,
    ) -> Self {
        Self {
            module,
            resolved,
            unresolved,
            metadata: Arc::new(metadata),
        }
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    /// Segments resolved when the frame was pushed
    pub fn resolved_path(&self) -> &[String] {
        &self.resolved
    }

    /// Segments left for the target module when the frame was pushed
    pub fn unresolved_path(&self) -> &[String] {
        &self.unresolved
    }

    pub fn metadata(&self) -> &ForwardMetadata {
        &self.metadata
    }

    /// URI of the resolved part at the time of forwarding
    pub fn uri(&self) -> String {
        uri_of(&self.resolved)
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.metadata.args.get(name).map(String::as_str)
    }
}

impl fmt::Debug for ForwardFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardFrame")
            .field("module", &self.module.name())
            .field("resolved", &self.resolved)
            .field("unresolved", &self.unresolved)
            .field("metadata", &self.metadata)
            .finish()
    }
}
