//! # Wiking Dispatch
//!
//! Resolves a request path into a chain of module invocations.
//!
//! The [`Application`] consumes the first segment through a static
//! table or the page mapping and forwards to the chosen module. Modules
//! consume further segments themselves and may forward again through
//! their bindings. Every forward pushes a [`ForwardFrame`] onto the
//! request's stack for the duration of the call, which lets a module
//! find out whether it runs as a bound child and where its parent lives.
//!
//! Outcomes are [`HandlerResult`]s: either a [`Response`] or a
//! [`ControlSignal`] (redirect, not found, forbidden, authentication
//! required, bad request) that passes unchanged through every frame.

pub mod application;
pub mod context;
pub mod data_module;
pub mod dispatcher;
pub mod documentation;
pub mod frame;
pub mod management;
pub mod mapping;
pub mod memory;
pub mod menu;
pub mod module;
pub mod path;
pub mod registry;
pub mod signal;

#[cfg(test)]
pub(crate) mod testing;

pub use application::Application;
pub use context::RequestContext;
pub use data_module::{ColumnKind, DataModule, DataSpec};
pub use dispatcher::{Dispatcher, IncomingRequest, Services};
pub use documentation::Documentation;
pub use frame::{ForwardFrame, ForwardMetadata};
pub use management::{ManagementInterface, Section};
pub use mapping::{MappingColumns, PageMapping};
pub use menu::{MenuItem, MenuProvider, StaticMenu};
pub use module::{Binding, EnabledPredicate, Module};
pub use path::RequestPath;
pub use registry::ModuleRegistry;
pub use signal::{ControlSignal, HandlerResult, Response};
