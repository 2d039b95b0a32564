//! Mini Memcache - A memcached-style in-memory cache server
//!
//! Startup loads configuration from the environment, binds the listener,
//! serves until Ctrl+C or SIGTERM, then shuts down gracefully.

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_memcache::{CacheServer, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_memcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Memcache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: address={}, max_entries={}",
        config.address, config.max_entries
    );

    let server = CacheServer::new(config.address.as_str(), config.max_entries)
        .await
        .with_context(|| format!("failed to listen on {}", config.address))?;
    let handle = server.start().context("failed to start cache server")?;

    shutdown_signal().await;

    handle.stop().await.context("cache server did not stop cleanly")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
