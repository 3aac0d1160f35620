//! tastevec-pe - Preference Estimator service
//!
//! **Module Identity:**
//! - Name: tastevec-pe (Preference Estimator)
//! - Default port: 5731
//!
//! Serves `/recommend`, `/search` and `/health`. Settings come from a TOML
//! file (see `tastevec_common::config`); `--host`/`--port` override it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tastevec_common::config::{resolve_config_path, ConfigSource, TomlConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tastevec_pe::services::{AcousticBrainzClient, MusicBrainzClient};
use tastevec_pe::AppState;

/// Command-line arguments for tastevec-pe
#[derive(Parser, Debug)]
#[command(name = "tastevec-pe")]
#[command(about = "Preference Estimator microservice for tastevec")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TASTEVEC_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "TASTEVEC_HOST")]
    host: Option<String>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Starting tastevec-pe (Preference Estimator)"
    );
    match ConfigSource::of(config_path.as_deref()) {
        ConfigSource::File(path) => info!("Config: {}", path.display()),
        ConfigSource::MissingFile(path) => {
            tracing::warn!("Config file {} not found, using built-in defaults", path.display())
        }
        ConfigSource::BuiltIn => info!("Config: built-in defaults"),
    }
    info!(
        k_neighbors = config.pipeline.k_neighbors,
        min_pts = config.pipeline.min_pts,
        max_concurrent_fetches = config.providers.max_concurrent_fetches,
        "Pipeline configured"
    );

    let features = AcousticBrainzClient::new(&config.providers)
        .context("Failed to create AcousticBrainz client")?;
    let catalog = MusicBrainzClient::new(&config.providers)
        .context("Failed to create MusicBrainz client")?;

    let state = AppState::new(
        Arc::new(features),
        Arc::new(catalog),
        config.pipeline,
        config.providers.max_concurrent_fetches,
    );
    let shutdown = state.shutdown.clone();
    let app = tastevec_pe::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
///
/// Cancels `token` so in-flight feature fetches stop early.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

    token.cancel();
}
