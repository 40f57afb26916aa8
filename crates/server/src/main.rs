//! pagetitle server entry point.
//!
//! Loads configuration, opens the title cache, and serves the HTTP API
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use pagetitle_client::{FetchClient, FetchConfig, TitleResolver};
use pagetitle_core::{AppConfig, CacheDb, TitleCache};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = AppConfig::load()?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening title cache at {}", config.db_path.display()))?;

    let fetcher = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let resolver = TitleResolver::new(TitleCache::new(db.clone()), Arc::new(fetcher))
        .with_batch_concurrency(config.batch_concurrency);
    let state = Arc::new(handler::AppState { resolver: Arc::new(resolver), db });
    let app = handler::build_router(state, &config.allowed_origins);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        db_path = %config.db_path.display(),
        origins = config.allowed_origins.len(),
        "Starting pagetitle server"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("pagetitle server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
