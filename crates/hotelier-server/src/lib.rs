//! hotelier-server: HTTP API and picture store.
//!
//! This crate ties the core rules and the database layer into a running
//! server. It provides:
//!
//! - Axum-based HTTP API for hotels and their ordered pictures
//! - The picture store: blob storage, per-hotel locks, upload/delete sagas
//! - API-key authentication and request IDs
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod pictures;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::path::Path;

use hotelier_core::config::Config;
use hotelier_db::pool::DbPool;

use crate::context::AppContext;

/// Open (creating if needed) the database named in the config.
pub fn open_database(config: &Config) -> hotelier_core::Result<DbPool> {
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    ensure_dir(db_path.parent())?;

    let db_str = db_path.to_string_lossy();
    let db = hotelier_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }
    Ok(db)
}

fn ensure_dir(dir: Option<&Path>) -> hotelier_core::Result<()> {
    if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            tracing::info!("Created directory {}", dir.display());
        }
    }
    Ok(())
}

/// Start the hotelier server.
///
/// Initializes the database and storage root, builds the [`AppContext`],
/// and serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> hotelier_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db = open_database(&config)?;
    ensure_dir(Some(config.storage.root_dir.as_path()))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| hotelier_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, db);
    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| hotelier_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server.db_path = dir.path().join("nested/deeper/hotelier.db");

        open_database(&config).unwrap();
        assert!(config.server.db_path.exists());
    }
}
