//! Site definition loaded from TOML
//!
//! A site file declares everything the dispatcher serves: roles and
//! containment edges, accounts, data modules with their rows and
//! bindings, page mappings, the menu and management sections.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wiking_authz::memory::{InMemoryAccounts, InMemoryRoleStore};
use wiking_authz::{AccessPolicy, AuthorizationGate, RoleGraph, RoleGraphConfig, SystemClock};
use wiking_core::{Account, Record, Role, RoleEdge};
use wiking_dispatch::documentation::DOCUMENTATION_MODULE;
use wiking_dispatch::management::MANAGEMENT_MODULE;
use wiking_dispatch::memory::InMemoryRecords;
use wiking_dispatch::{
    Application, Binding, ColumnKind, DataModule, DataSpec, Dispatcher, Documentation, ManagementInterface,
    MappingColumns, MenuItem, ModuleRegistry, PageMapping, Section, Services, StaticMenu,
};

/// Demo site used when no site file is configured
pub const DEMO_SITE: &str = include_str!("../site/demo.toml");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub roles: Vec<Role>,
    pub edges: Vec<RoleEdge>,
    pub accounts: Vec<Account>,
    pub modules: Vec<ModuleConfig>,
    pub pages: Vec<PageConfig>,
    pub menu: Vec<MenuItem>,
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    pub title: Option<String>,
    pub key: String,
    #[serde(default)]
    pub key_kind: ColumnKind,
    pub referer: Option<String>,
    #[serde(default)]
    pub referer_kind: ColumnKind,
    #[serde(default)]
    pub policy: AccessPolicy,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    pub id: String,
    pub title: String,
    pub module: String,
    /// Column of the target's rows holding the parent key
    pub column: Option<String>,
    /// Boolean column of the parent row enabling the binding
    pub enabled_when: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub identifier: String,
    pub module: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub private: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub title: String,
    pub modules: Vec<String>,
}

impl SiteConfig {
    /// Load and validate a site file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid site file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let site: SiteConfig = toml::from_str(text).context("Failed to parse site TOML")?;
        site.validate()?;
        Ok(site)
    }

    pub fn demo() -> Result<Self> {
        Self::parse(DEMO_SITE).context("Built-in demo site is invalid")
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for module in &self.modules {
            ensure!(!module.key.is_empty(), "Module '{}' has an empty key column", module.name);
            if is_reserved(&module.name) {
                bail!("Module name '{}' is reserved", module.name);
            }
            ensure!(names.insert(module.name.as_str()), "Duplicate module name '{}'", module.name);
        }

        for module in &self.modules {
            for binding in &module.bindings {
                ensure!(
                    names.contains(binding.module.as_str()),
                    "Binding '{}' of module '{}' targets unknown module '{}'",
                    binding.id,
                    module.name,
                    binding.module
                );
            }
        }

        for page in &self.pages {
            ensure!(
                names.contains(page.module.as_str()) || is_reserved(&page.module),
                "Page '{}' maps to unknown module '{}'",
                page.identifier,
                page.module
            );
        }

        for section in &self.sections {
            for module in &section.modules {
                ensure!(
                    names.contains(module.as_str()),
                    "Section '{}' lists unknown module '{}'",
                    section.id,
                    module
                );
            }
        }

        let mut logins = BTreeSet::new();
        for account in &self.accounts {
            ensure!(logins.insert(account.login.as_str()), "Duplicate login '{}'", account.login);
        }

        for item in &self.menu {
            ensure!(item.uri.starts_with('/'), "Menu item '{}' has a relative uri", item.title);
        }

        Ok(())
    }

    /// Assemble the dispatcher serving this site
    pub fn build(&self, graph_config: RoleGraphConfig) -> Result<Dispatcher> {
        let store = Arc::new(InMemoryRoleStore::with_edges(self.edges.clone()));
        for role in &self.roles {
            store.add_role(role.clone());
        }
        let graph = RoleGraph::with_config(store.clone(), store, Arc::new(SystemClock), graph_config);
        let gate = AuthorizationGate::new(Arc::new(graph));

        let accounts = InMemoryAccounts::new();
        for account in &self.accounts {
            accounts.insert(account.clone());
        }

        let mut registry = ModuleRegistry::new();
        for module in &self.modules {
            let records = InMemoryRecords::with_records(module.records.clone());
            registry.register(Arc::new(DataModule::new(module.data_spec(), Arc::new(records))))?;
        }
        registry.register(Arc::new(Documentation::new()))?;
        registry.register(Arc::new(ManagementInterface::new(
            self.sections.iter().map(SectionConfig::section).collect(),
        )))?;
        registry.validate()?;

        let application = Application::standard(Arc::new(StaticMenu::new(self.menu.clone())))
            .with_pages(self.page_mapping());

        info!(
            modules = registry.len(),
            accounts = accounts.len(),
            pages = self.pages.len(),
            "Site assembled"
        );
        Ok(Dispatcher::new(
            application,
            Services::new(registry, gate, Arc::new(accounts)),
        ))
    }

    fn page_mapping(&self) -> PageMapping {
        let columns = MappingColumns::default();
        let rows = self
            .pages
            .iter()
            .map(|page| {
                Record::new(page.identifier.clone())
                    .with_value(columns.identifier.as_str(), page.identifier.clone())
                    .with_value(columns.module.as_str(), page.module.clone())
                    .with_value(columns.published.as_str(), page.published)
                    .with_value(columns.private.as_str(), page.private)
            })
            .collect();
        PageMapping::with_columns(Arc::new(InMemoryRecords::with_records(rows)), columns)
    }
}

impl ModuleConfig {
    fn data_spec(&self) -> DataSpec {
        let mut spec = DataSpec::new(self.name.clone(), self.key.clone())
            .title(self.title.clone().unwrap_or_else(|| self.name.clone()))
            .key_kind(self.key_kind)
            .policy(self.policy.clone());
        if let Some(referer) = &self.referer {
            spec = spec.referer(referer.clone(), self.referer_kind);
        }
        for binding in &self.bindings {
            spec = spec.binding(binding.binding());
        }
        spec
    }
}

impl BindingConfig {
    fn binding(&self) -> Binding {
        let mut binding = Binding::new(self.id.clone(), self.title.clone(), self.module.clone());
        if let Some(column) = &self.column {
            binding = binding.with_binding_column(column.clone());
        }
        if let Some(flag) = self.enabled_when.clone() {
            binding = binding.with_enabled(move |record: &Record| record.flag(&flag));
        }
        binding
    }
}

impl SectionConfig {
    fn section(&self) -> Section {
        let modules: Vec<&str> = self.modules.iter().map(String::as_str).collect();
        Section::new(self.id.clone(), self.title.clone(), &modules)
    }
}

fn is_reserved(name: &str) -> bool {
    name == DOCUMENTATION_MODULE || name == MANAGEMENT_MODULE
}
