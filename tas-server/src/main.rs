//! tas - Text Analysis Service
//!
//! Resolves configuration, installs logging, builds the processor registry
//! and serves the HTTP API until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tas_common::config::{ConfigOverrides, ConfigResolver, ContentTypeMatching};
use tas_common::logging::init_tracing;
use tas_server::{build_router, AppState};
use tokio::signal;
use tracing::info;

/// Command-line arguments for tas
///
/// Every option also has a `TAS_*` environment variable and a config file
/// key; the command line wins.
#[derive(Parser, Debug)]
#[command(name = "tas")]
#[command(about = "Text analysis service for captured web pages")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Keyword stop list identifier (e.g. SmartStoplist.txt)
    #[arg(long)]
    keyword_stop_list: Option<String>,

    /// Content type matching discipline: exact or prefix
    #[arg(long)]
    content_type_matching: Option<ContentTypeMatching>,

    /// Reject request bodies larger than this many bytes (0 disables)
    #[arg(long)]
    max_body_size: Option<usize>,

    /// Deadline for one content analysis, in milliseconds
    #[arg(long)]
    analysis_timeout_ms: Option<u64>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            host: args.host,
            port: args.port,
            keyword_stop_list: args.keyword_stop_list,
            content_type_matching: args.content_type_matching,
            max_body_size: args.max_body_size,
            analysis_timeout_ms: args.analysis_timeout_ms,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new(args.into())
        .resolve()
        .context("Failed to resolve configuration")?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting Text Analysis Service (tas) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.config_file {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => tracing::warn!("No configuration file found, using defaults"),
    }
    info!(
        stop_list = %config.keyword_stop_list,
        max_body_size = ?config.max_body_size,
        analysis_timeout_ms = config.analysis_timeout.as_millis() as u64,
        "Service configuration resolved"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config).context("Failed to initialize content analyser")?;
    info!(
        matching = ?state.analyser.matching(),
        content_types = ?state.analyser.content_types(),
        "Content processors registered"
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tas listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
