//! Picture store operations for hotels.
//!
//! [`PictureService`] coordinates admission checks, the per-hotel lock,
//! the sagas and the ordering queries. Route handlers and the CLI go
//! through it rather than touching storage or the picture tables directly.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use hotelier_core::config::StorageConfig;
use hotelier_core::upload::{self, AcceptedUpload};
use hotelier_core::{Error, HotelId, PictureId, Result};
use hotelier_db::models::Picture;
use hotelier_db::pool::{get_conn, DbPool};
use hotelier_db::queries::{hotels, pictures};
use uuid::Uuid;

use super::locks::HotelLocks;
use super::saga::{ensure_picture_owned, DeleteSaga, UploadSaga};
use super::storage::BlobStore;

/// Key prefix for picture blobs.
pub const PICTURE_PREFIX: &str = "pictures";

/// Stashes older than this belong to deletes that will never purge them.
const STALE_STASH_AGE: Duration = Duration::from_secs(15 * 60);

/// A file received from a client, not yet checked.
#[derive(Debug, Clone)]
pub struct NewPicture {
    pub data: bytes::Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl NewPicture {
    fn original_extension(&self) -> Option<&str> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then_some(ext)
    }
}

/// Result of comparing stored blobs with picture rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Number of picture rows.
    pub rows: usize,
    /// Number of blobs under the picture prefix.
    pub blobs: usize,
    /// Blobs no row references.
    pub orphaned_blobs: Vec<String>,
    /// Rows whose blob is missing.
    pub missing_blobs: Vec<String>,
    /// Stashed blobs left behind by interrupted deletes.
    pub stale_stashes: Vec<String>,
    /// Orphaned blobs and stale stashes deleted by this run.
    pub purged: usize,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_blobs.is_empty()
            && self.missing_blobs.is_empty()
            && self.stale_stashes.is_empty()
    }
}

pub struct PictureService {
    db: DbPool,
    store: Arc<dyn BlobStore>,
    locks: HotelLocks,
    config: StorageConfig,
}

impl PictureService {
    pub fn new(db: DbPool, store: Arc<dyn BlobStore>, config: StorageConfig) -> Self {
        Self {
            db,
            store,
            locks: HotelLocks::new(),
            config,
        }
    }

    /// Public URL of a picture's blob.
    pub fn public_url(&self, picture: &Picture) -> String {
        self.config.public_url(&picture.filepath)
    }

    fn require_hotel(&self, hotel_id: HotelId) -> Result<()> {
        let conn = get_conn(&self.db)?;
        if !hotels::hotel_exists(&conn, hotel_id)? {
            return Err(Error::not_found("hotel", hotel_id));
        }
        Ok(())
    }

    /// Pictures of a hotel in display order.
    pub fn list(&self, hotel_id: HotelId) -> Result<Vec<Picture>> {
        self.require_hotel(hotel_id)?;
        let conn = get_conn(&self.db)?;
        pictures::list_pictures(&conn, hotel_id)
    }

    /// Store a picture and append it to the hotel's gallery.
    pub async fn upload(&self, hotel_id: HotelId, file: NewPicture) -> Result<Picture> {
        self.require_hotel(hotel_id)?;
        let accepted: AcceptedUpload = upload::admit(
            &file.data,
            file.content_type.as_deref(),
            file.original_extension(),
            self.config.max_upload_bytes,
        )?;

        let key = format!("{PICTURE_PREFIX}/{}.{}", Uuid::new_v4(), accepted.extension);

        let _guard = self.locks.acquire(hotel_id).await;
        let picture = UploadSaga::new(self.store.as_ref(), &self.db, hotel_id, key)
            .run(&file.data)
            .await?;

        tracing::info!(
            hotel_id = %hotel_id,
            picture_id = %picture.id,
            position = picture.position,
            format = accepted.format.mime_type(),
            size = accepted.size,
            "Picture uploaded"
        );
        Ok(picture)
    }

    /// Remove a picture owned by `hotel_id` and close the gap it leaves.
    pub async fn delete(&self, hotel_id: HotelId, picture_id: PictureId) -> Result<()> {
        let _guard = self.locks.acquire(hotel_id).await;
        let picture = ensure_picture_owned(&self.db, hotel_id, picture_id)?;
        DeleteSaga::new(self.store.as_ref(), &self.db, picture).run().await?;

        tracing::info!(hotel_id = %hotel_id, picture_id = %picture_id, "Picture deleted");
        Ok(())
    }

    /// Make `ordered` the hotel's display order.
    pub async fn reorder(&self, hotel_id: HotelId, ordered: &[PictureId]) -> Result<()> {
        let _guard = self.locks.acquire(hotel_id).await;
        let mut conn = get_conn(&self.db)?;
        pictures::reorder_pictures(&mut conn, hotel_id, ordered)?;

        tracing::info!(hotel_id = %hotel_id, count = ordered.len(), "Pictures reordered");
        Ok(())
    }

    /// Delete a hotel with its pictures, then remove their blobs.
    ///
    /// Rows go first in one transaction. Blob removal is best-effort: a
    /// blob that cannot be removed is logged and left for the storage audit.
    pub async fn delete_all_for_hotel(&self, hotel_id: HotelId) -> Result<()> {
        let _guard = self.locks.acquire(hotel_id).await;

        let keys = {
            let mut conn = get_conn(&self.db)?;
            hotels::remove_hotel(&mut conn, hotel_id)?
        }
        .ok_or_else(|| Error::not_found("hotel", hotel_id))?;

        let mut failed = 0;
        for key in &keys {
            match self.store.delete(key).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(key = %key, "Picture blob already gone"),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(hotel_id = %hotel_id, key = %key, error = %e, "Failed to remove picture blob");
                }
            }
        }

        tracing::info!(
            hotel_id = %hotel_id,
            pictures = keys.len(),
            blobs_left = failed,
            "Hotel deleted"
        );
        Ok(())
    }

    /// Compare blobs under the picture prefix with picture rows, optionally
    /// deleting blobs no row references along with stale stashes.
    pub async fn audit(&self, purge_orphans: bool) -> Result<AuditReport> {
        let rows: BTreeSet<String> = {
            let conn = get_conn(&self.db)?;
            pictures::list_all_filepaths(&conn)?.into_iter().collect()
        };
        let blobs: BTreeSet<String> = self
            .store
            .list(PICTURE_PREFIX)
            .await?
            .into_iter()
            .collect();

        let mut report = AuditReport {
            rows: rows.len(),
            blobs: blobs.len(),
            orphaned_blobs: blobs.difference(&rows).cloned().collect(),
            missing_blobs: rows.difference(&blobs).cloned().collect(),
            stale_stashes: self.store.stale_stashes(STALE_STASH_AGE).await?,
            purged: 0,
        };

        if purge_orphans {
            for key in report.orphaned_blobs.iter().chain(&report.stale_stashes) {
                match self.store.delete(key).await {
                    Ok(_) => report.purged += 1,
                    Err(e) => tracing::warn!(key = %key, error = %e, "Failed to purge orphaned blob"),
                }
            }
        }

        Ok(report)
    }
}
