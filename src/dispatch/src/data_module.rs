//! Generic record-backed module
//!
//! A data module serves the rows of one data object:
//!
//! - `/<module>` lists the rows
//! - `/<module>/<referer>` shows one row, identified by its referer
//!   column value
//! - `/<module>/<referer>/<binding>/...` delegates to the module bound
//!   under that binding id, filtered to rows related to the parent row
//!
//! A module reached through a binding refuses to render standalone: any
//! plain listing request redirects back to the parent record.

use crate::context::RequestContext;
use crate::frame::{ForwardFrame, ForwardMetadata};
use crate::module::{Binding, Module};
use crate::path::{uri_of, uri_with_params};
use crate::signal::{ControlSignal, HandlerResult, Response};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use wiking_authz::{actions, AccessPolicy};
use wiking_core::{Condition, Record, RecordLookup};

/// Request parameter selecting the action
pub const ACTION_PARAM: &str = "action";

/// Request parameter naming the form the request was submitted from
pub const FORM_NAME_PARAM: &str = "form_name";

/// Request parameter marking asynchronous requests
pub const ASYNC_PARAM: &str = "_async";

/// Value domain of a column used in URIs or parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Integer,
}

impl ColumnKind {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ColumnKind::Text => true,
            ColumnKind::Integer => value.parse::<i64>().is_ok(),
        }
    }
}

/// Declaration of a data module
#[derive(Debug, Clone)]
pub struct DataSpec {
    pub name: String,
    pub title: String,
    pub key_column: String,
    pub key_kind: ColumnKind,
    /// Column identifying a row in the URI, the key column when unset
    pub referer_column: Option<String>,
    pub referer_kind: ColumnKind,
    pub policy: AccessPolicy,
    pub bindings: Vec<Binding>,
}

impl DataSpec {
    pub fn new(name: impl Into<String>, key_column: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            key_column: key_column.into(),
            key_kind: ColumnKind::Text,
            referer_column: None,
            referer_kind: ColumnKind::Text,
            policy: AccessPolicy::default(),
            bindings: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn key_kind(mut self, kind: ColumnKind) -> Self {
        self.key_kind = kind;
        self
    }

    pub fn referer(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.referer_column = Some(column.into());
        self.referer_kind = kind;
        self
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

pub struct DataModule {
    spec: DataSpec,
    records: Arc<dyn RecordLookup>,
}

impl DataModule {
    pub fn new(spec: DataSpec, records: Arc<dyn RecordLookup>) -> Self {
        Self { spec, records }
    }

    pub fn spec(&self) -> &DataSpec {
        &self.spec
    }

    fn referer_column(&self) -> &str {
        self.spec.referer_column.as_deref().unwrap_or(&self.spec.key_column)
    }

    /// Whether rows are addressed in URIs by their key
    fn keyed_referer(&self) -> bool {
        self.referer_column() == self.spec.key_column
    }

    /// Path segment addressing `record`, `None` when it has no referer value
    fn referer_of(&self, record: &Record) -> Option<String> {
        if self.keyed_referer() {
            Some(record.key.clone())
        } else {
            record.text(self.referer_column())
        }
    }

    async fn find_by_key(&self, key: &str, binding_condition: Option<&Condition>) -> Result<Option<Record>, ControlSignal> {
        let record = self.records.get(key).await?;
        Ok(record.filter(|r| binding_condition.map_or(true, |c| c.holds(r))))
    }

    /// Resolve the current record from the next path segment or the key
    /// parameter
    async fn resolve(&self, req: &mut RequestContext) -> Result<Option<Record>, ControlSignal> {
        let binding_condition = self.binding_condition(req);

        if let Some(segment) = req.path().peek().map(str::to_owned) {
            if !self.spec.referer_kind.accepts(&segment) {
                return Err(ControlSignal::NotFound);
            }
            let record = if self.keyed_referer() {
                self.find_by_key(&segment, binding_condition.as_ref()).await?
            } else {
                let mut conditions = vec![Condition::eq(self.referer_column(), segment)];
                conditions.extend(binding_condition);
                self.records.find_one(&conditions).await?
            };
            let record = record.ok_or(ControlSignal::NotFound)?;
            req.path_mut().consume();
            return Ok(Some(record));
        }

        if req.param(ACTION_PARAM) == Some(actions::INSERT) {
            return Ok(None);
        }
        let Some(key) = req.param(&self.spec.key_column).map(str::to_owned) else {
            return Ok(None);
        };
        if !self.spec.key_kind.accepts(&key) {
            return Err(ControlSignal::BadRequest(format!(
                "invalid value of '{}'",
                self.spec.key_column
            )));
        }

        let record = self
            .find_by_key(&key, binding_condition.as_ref())
            .await?
            .ok_or(ControlSignal::NotFound)?;
        Ok(Some(record))
    }

    /// Nearest binding frame, when it forwarded to this module
    fn binding_forward(&self, req: &RequestContext) -> Option<ForwardFrame> {
        req.forwards()
            .into_iter()
            .rev()
            .find(|frame| frame.metadata().binding.is_some())
            .filter(|frame| frame.module_name() == self.name())
    }

    /// Filter relating this module's rows to the parent record
    fn binding_condition(&self, req: &RequestContext) -> Option<Condition> {
        let frame = self.binding_forward(req)?;
        let metadata = frame.metadata();
        let column = metadata.binding.as_ref()?.binding_column.as_ref()?;
        let parent = metadata.record.as_ref()?;
        Some(Condition::eq(column, parent.key.clone()))
    }

    /// URI of the parent record this module is bound under
    fn binding_parent_uri(&self, req: &RequestContext) -> Option<String> {
        let frame = self.binding_forward(req)?;
        let binding = frame.metadata().binding.as_ref()?;
        match frame.resolved_path().split_last() {
            Some((last, parent)) if *last == binding.id => Some(uri_of(parent)),
            _ => None,
        }
    }

    /// Parameters carried along when redirecting to the parent
    fn redirect_params(&self, req: &RequestContext) -> Vec<(String, String)> {
        if req.param(FORM_NAME_PARAM) != Some(self.name()) {
            return Vec::new();
        }
        req.params()
            .iter()
            .filter(|(name, _)| name.as_str() != ACTION_PARAM)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    async fn handle_subpath(&self, req: &mut RequestContext, record: Record) -> HandlerResult {
        let Some(segment) = req.path().peek().map(str::to_owned) else {
            return Err(ControlSignal::NotFound);
        };

        let Some(binding) = self.spec.bindings.iter().find(|b| b.id == segment) else {
            debug!(module = self.name(), segment = %segment, "No such binding");
            return Err(ControlSignal::NotFound);
        };
        req.authorize(self, actions::VIEW, Some(&record)).await?;
        if !binding.is_enabled(&record) {
            debug!(module = self.name(), binding = %binding.id, "Binding disabled for record");
            return Err(ControlSignal::Forbidden);
        }

        let target = req.registry().require(&binding.target_module)?;
        req.path_mut().consume();
        let title = self.referer_of(&record).unwrap_or_else(|| record.key.clone());
        let metadata = ForwardMetadata::binding(binding.clone(), record, self.name(), title);
        req.forward(target, metadata).await
    }

    async fn action_list(&self, req: &RequestContext) -> HandlerResult {
        if req.param(ASYNC_PARAM).is_none() {
            if let Some(parent) = self.binding_parent_uri(req) {
                let uri = uri_with_params(&parent, &self.redirect_params(req));
                debug!(module = self.name(), uri = %uri, "Bound module listed standalone, redirecting to parent");
                return Err(ControlSignal::redirect(uri));
            }
        }

        let conditions: Vec<Condition> = self.binding_condition(req).into_iter().collect();
        let rows = self.records.select(&conditions).await?;
        let base = req.path().resolved_uri();
        let items: Vec<Value> = rows
            .iter()
            .map(|row| {
                json!({
                    "key": row.key,
                    "uri": self.referer_of(row).map(|referer| join_uri(&base, &referer)),
                    "values": row.values,
                })
            })
            .collect();

        Response::json(&json!({
            "module": self.name(),
            "title": self.title(),
            "uri": base,
            "records": items,
        }))
    }

    async fn action_view(&self, req: &RequestContext, record: &Record) -> HandlerResult {
        let uri = match (req.path().resolved().last(), self.referer_of(record)) {
            (Some(last), Some(referer)) if *last == referer => req.path().resolved_uri(),
            (_, Some(referer)) => join_uri(&req.path().resolved_uri(), &referer),
            (_, None) => req.path().resolved_uri(),
        };

        let bindings: Vec<Value> = self
            .spec
            .bindings
            .iter()
            .filter(|binding| binding.is_enabled(record))
            .map(|binding| {
                json!({
                    "id": binding.id,
                    "title": binding.title,
                    "uri": join_uri(&uri, &binding.id),
                })
            })
            .collect();

        Response::json(&json!({
            "module": self.name(),
            "title": self.title(),
            "key": record.key,
            "uri": uri,
            "values": record.values,
            "bindings": bindings,
            "parent": self.binding_parent_uri(req),
        }))
    }

    /// Listing request for a single record: show the listing instead
    fn redirect_to_listing(&self, req: &RequestContext, record: &Record) -> HandlerResult {
        let resolved = req.path().resolved();
        let listing = match resolved.split_last() {
            Some((last, parent)) if self.referer_of(record).as_deref() == Some(last.as_str()) => uri_of(parent),
            _ => req.path().resolved_uri(),
        };
        let params = vec![("search".to_string(), record.key.clone())];
        Err(ControlSignal::redirect(uri_with_params(&listing, &params)))
    }
}

fn join_uri(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(segment)
    )
}

#[async_trait]
impl Module for DataModule {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn title(&self) -> &str {
        &self.spec.title
    }

    fn bindings(&self) -> &[Binding] {
        &self.spec.bindings
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.spec.policy
    }

    async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        let record = self.resolve(req).await?;

        if let Some(record) = record.as_ref() {
            if !req.path().is_exhausted() {
                return self.handle_subpath(req, record.clone()).await;
            }
        }

        let action = match req.param(ACTION_PARAM) {
            Some(action) => action.to_string(),
            None if record.is_some() => actions::VIEW.to_string(),
            None => actions::LIST.to_string(),
        };
        req.authorize(self, &action, record.as_ref()).await?;

        match (action.as_str(), record) {
            (actions::LIST, None) => self.action_list(req).await,
            (actions::LIST, Some(record)) => self.redirect_to_listing(req, &record),
            (actions::VIEW, Some(record)) => self.action_view(req, &record).await,
            (actions::VIEW, None) => Err(ControlSignal::BadRequest("no record selected".to_string())),
            (other, _) => Err(ControlSignal::BadRequest(format!("unsupported action '{}'", other))),
        }
    }
}
