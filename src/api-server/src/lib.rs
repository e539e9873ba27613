//! HTTP boundary of the wiking dispatcher

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod site;
pub mod state;

pub use error::{ApiError, Result};
pub use server::Server;
pub use site::SiteConfig;
pub use state::AppState;
