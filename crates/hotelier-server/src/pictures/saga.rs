//! Upload and delete as two-step sagas over blob storage and the database.
//!
//! Neither step can join the other's transaction, so each saga runs the
//! blob step and the row step in a fixed order and undoes the blob step
//! when the row step fails. A failed undo leaves the two sides disagreeing;
//! that case is logged at `error` with the affected key and reported as
//! [`Error::Storage`].

use hotelier_core::{Error, HotelId, PictureId, Result};
use hotelier_db::models::Picture;
use hotelier_db::pool::{get_conn, DbPool};
use hotelier_db::queries::pictures;

use super::storage::{BlobStore, Stashed};

/// Look up a picture, failing with `Forbidden` unless `hotel_id` owns it.
///
/// A picture that exists under another hotel and one that does not exist
/// at all are indistinguishable to the caller.
pub fn ensure_picture_owned(
    db: &DbPool,
    hotel_id: HotelId,
    picture_id: PictureId,
) -> Result<Picture> {
    let conn = get_conn(db)?;
    pictures::get_owned_picture(&conn, hotel_id, picture_id)?.ok_or_else(|| {
        Error::Forbidden(format!(
            "picture {picture_id} does not belong to hotel {hotel_id}"
        ))
    })
}

/// Write blob, then insert row; delete the blob if the insert fails.
pub struct UploadSaga<'a> {
    store: &'a dyn BlobStore,
    db: &'a DbPool,
    hotel_id: HotelId,
    key: String,
}

impl<'a> UploadSaga<'a> {
    pub fn new(store: &'a dyn BlobStore, db: &'a DbPool, hotel_id: HotelId, key: String) -> Self {
        Self {
            store,
            db,
            hotel_id,
            key,
        }
    }

    pub async fn run(self, data: &[u8]) -> Result<Picture> {
        self.store.put(&self.key, data).await?;

        match self.record(data.len()) {
            Ok(picture) => Ok(picture),
            Err(cause) => Err(self.discard_blob(cause).await),
        }
    }

    fn record(&self, size: usize) -> Result<Picture> {
        let mut conn = get_conn(self.db)?;
        let size = i64::try_from(size)
            .map_err(|_| Error::validation("picture size does not fit in a row"))?;
        pictures::append_picture(&mut conn, self.hotel_id, &self.key, size)
    }

    /// Compensation for a failed insert.
    async fn discard_blob(&self, cause: Error) -> Error {
        match self.store.delete(&self.key).await {
            Ok(_) => {
                tracing::debug!(key = %self.key, error = %cause, "Discarded blob after failed insert");
                cause
            }
            Err(e) => {
                tracing::error!(
                    hotel_id = %self.hotel_id,
                    key = %self.key,
                    cause = %cause,
                    error = %e,
                    "Orphaned picture blob: insert failed and the blob could not be removed"
                );
                Error::storage(format!("orphaned blob {}", self.key))
            }
        }
    }
}

/// Stash blob, then delete row and compact; restore the blob if the row
/// step fails, purge it once the row is gone.
pub struct DeleteSaga<'a> {
    store: &'a dyn BlobStore,
    db: &'a DbPool,
    picture: Picture,
}

impl<'a> DeleteSaga<'a> {
    /// `picture` must already have passed [`ensure_picture_owned`].
    pub fn new(store: &'a dyn BlobStore, db: &'a DbPool, picture: Picture) -> Self {
        Self { store, db, picture }
    }

    pub async fn run(self) -> Result<()> {
        let stashed = self.store.stash(&self.picture.filepath).await?;
        if stashed.is_none() {
            tracing::warn!(
                picture_id = %self.picture.id,
                key = %self.picture.filepath,
                "Picture blob already missing; removing row anyway"
            );
        }

        let removed = match self.remove_row() {
            Ok(removed) => removed,
            Err(cause) => return Err(self.restore_blob(stashed.as_ref(), cause).await),
        };
        if !removed {
            let cause = Error::Forbidden(format!(
                "picture {} does not belong to hotel {}",
                self.picture.id, self.picture.hotel_id
            ));
            return Err(self.restore_blob(stashed.as_ref(), cause).await);
        }

        if let Some(stashed) = stashed {
            if let Err(e) = self.store.purge(&stashed).await {
                tracing::warn!(key = %stashed.key, error = %e, "Failed to purge stashed blob");
            }
        }
        Ok(())
    }

    fn remove_row(&self) -> Result<bool> {
        let mut conn = get_conn(self.db)?;
        pictures::delete_picture_and_compact(&mut conn, self.picture.hotel_id, self.picture.id)
    }

    /// Compensation for a failed row delete.
    async fn restore_blob(&self, stashed: Option<&Stashed>, cause: Error) -> Error {
        let Some(stashed) = stashed else {
            return cause;
        };
        match self.store.restore(stashed).await {
            Ok(()) => cause,
            Err(e) => {
                tracing::error!(
                    picture_id = %self.picture.id,
                    key = %stashed.key,
                    cause = %cause,
                    error = %e,
                    "Picture row kept but its blob could not be restored"
                );
                Error::storage(format!("lost blob {}", stashed.key))
            }
        }
    }
}
