//! Startup-built module registry

use crate::module::Module;
use crate::signal::ControlSignal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;
use wiking_core::{CoreError, Result};

/// Modules by stable name
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its name
    pub fn register(&mut self, module: Arc<dyn Module>) -> Result<()> {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            return Err(CoreError::configuration(format!("module '{}' registered twice", name)));
        }
        self.modules.insert(name, module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    /// Module that configuration refers to by name
    ///
    /// A missing module is a configuration error surfaced as an internal
    /// error signal, not as NotFound.
    pub fn require(&self, name: &str) -> std::result::Result<Arc<dyn Module>, ControlSignal> {
        self.get(name).ok_or_else(|| {
            error!(module = name, "Module not registered");
            ControlSignal::Internal(format!("module '{}' is not registered", name))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check that every binding targets a registered module
    pub fn validate(&self) -> Result<()> {
        for module in self.modules.values() {
            for binding in module.bindings() {
                if !self.modules.contains_key(&binding.target_module) {
                    return Err(CoreError::configuration(format!(
                        "binding '{}' of module '{}' targets unknown module '{}'",
                        binding.id,
                        module.name(),
                        binding.target_module
                    )));
                }
            }
        }
        Ok(())
    }
}
