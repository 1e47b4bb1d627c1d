//! refill-gallery server

use anyhow::Context;
use clap::Parser;
use refill_gallery::{config::GalleryConfig, observability, state::AppState, storage::SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "refill-gallery")]
#[command(version)]
#[command(about = "Image upload and gallery service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "REFILL_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Listen address, overrides `server.bind`
    #[arg(short, long)]
    bind: Option<String>,
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    observability::init()?;

    let mut config = GalleryConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    tracing::debug!(?config, "Configuration loaded");

    let gateway = config.build_gateway()?;
    let bind = config.server.bind.clone();
    let state = AppState::from_parts(gateway, Arc::new(SystemClock), config);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Starting server on {}", bind);

    axum::serve(listener, refill_gallery::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
