//! Wiking dispatcher HTTP server
//!
//! # Usage
//!
//! ```bash
//! # Serve the built-in demo site on 0.0.0.0:8080
//! cargo run -p wiking-server
//!
//! # Serve a site file on a custom address
//! cargo run -p wiking-server -- --site site.toml --host 127.0.0.1 --port 9090
//!
//! # Enable debug logging
//! RUST_LOG=debug cargo run -p wiking-server
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (trace, debug, info, warn, error)
//! - `WIKING_HOST`: Server host (default: 0.0.0.0)
//! - `WIKING_PORT`: Server port (default: 8080)
//! - `WIKING_ROLE_CACHE_TTL`: Role graph snapshot lifetime in seconds (default: 30)
//! - `WIKING_SITE`: Path to a TOML site file
//! - `WIKING_JSON_LOGS`: Emit JSON logs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiking_authz::RoleGraphConfig;
use wiking_server::{server::ServerBuilder, AppState, SiteConfig};

/// Wiking dispatcher HTTP server
#[derive(Parser, Debug)]
#[command(name = "wiking-server", version, about = "HTTP server for the wiking request dispatcher", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "WIKING_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "WIKING_PORT")]
    port: u16,

    /// Role graph snapshot lifetime in seconds
    #[arg(long, default_value = "30", env = "WIKING_ROLE_CACHE_TTL")]
    role_cache_ttl: u64,

    /// TOML site file; the built-in demo site is served without one
    #[arg(short = 's', long, env = "WIKING_SITE")]
    site: Option<PathBuf>,

    /// Enable JSON logging format
    #[arg(long, env = "WIKING_JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    info!("Starting wiking server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let site = match &args.site {
        Some(path) => {
            info!(path = %path.display(), "Loading site file");
            SiteConfig::load(path)?
        }
        None => {
            info!("No site file given, serving the built-in demo site");
            SiteConfig::demo()?
        }
    };

    let graph_config = RoleGraphConfig {
        ttl: Duration::from_secs(args.role_cache_ttl),
        ..RoleGraphConfig::default()
    };
    let dispatcher = site.build(graph_config)?;
    let state = Arc::new(AppState::new(dispatcher));

    let server = ServerBuilder::new()
        .host(&args.host)
        .port(args.port)
        .state(state)
        .build()?;

    info!("Press Ctrl+C to shutdown gracefully");

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing/logging subsystem
fn init_tracing(args: &Args) {
    let log_level = args.log_level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        tracing::Level::INFO
    });
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let deps = if log_level >= tracing::Level::DEBUG { "debug" } else { "info" };
        format!(
            "wiking_server={level},wiking_dispatch={level},wiking_authz={level},tower_http={deps}",
            level = log_level,
            deps = deps
        )
        .into()
    });

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
