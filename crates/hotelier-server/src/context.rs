//! Application context shared by route handlers.

use std::sync::Arc;
use std::time::Duration;

use hotelier_core::config::Config;
use hotelier_db::pool::DbPool;

use crate::pictures::{BlobStore, LocalDiskStore, PictureService};

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Picture store for all hotels.
    pub pictures: Arc<PictureService>,
}

impl AppContext {
    /// Build a context storing blobs on local disk under
    /// `config.storage.root_dir`.
    pub fn new(config: Config, db: DbPool) -> Self {
        let store: Arc<dyn BlobStore> = Arc::new(LocalDiskStore::new(
            config.storage.root_dir.clone(),
            Duration::from_secs(config.storage.io_timeout_secs),
        ));
        Self::with_store(config, db, store)
    }

    /// Build a context around an arbitrary blob store.
    pub fn with_store(config: Config, db: DbPool, store: Arc<dyn BlobStore>) -> Self {
        let pictures = Arc::new(PictureService::new(
            db.clone(),
            store,
            config.storage.clone(),
        ));
        Self {
            db,
            config: Arc::new(config),
            pictures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelier_db::pool::init_memory_pool;

    #[test]
    fn context_shares_pool_with_pictures() {
        let ctx = AppContext::new(Config::default(), init_memory_pool().unwrap());
        let clone = ctx.clone();
        assert!(Arc::ptr_eq(&ctx.pictures, &clone.pictures));
        assert_eq!(ctx.config.storage.public_base_url, "/storage");
    }
}
