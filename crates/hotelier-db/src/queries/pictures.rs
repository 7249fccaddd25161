//! Picture rows and their per-hotel ordering.
//!
//! Every write that touches `position` runs in a `BEGIN IMMEDIATE`
//! transaction so two writers on the same database serialize on the write
//! lock before reading `MAX(position)` or the hotel's picture set.

use chrono::Utc;
use hotelier_core::ordering::{self, Rank};
use hotelier_core::{Error, HotelId, PictureId, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use super::sql_error;
use crate::models::Picture;

const COLS: &str = "id, hotel_id, filepath, filesize, position, created_at";

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// The position a newly appended picture would take: `MAX(position) + 1`,
/// or 1 for a hotel with no pictures.
pub fn next_position(conn: &Connection, hotel_id: HotelId) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM pictures WHERE hotel_id = ?1",
        [hotel_id.get()],
        |row| row.get(0),
    )
    .map_err(db_err)
}

/// Insert a picture row at an explicit position.
pub fn insert_picture(
    conn: &Connection,
    hotel_id: HotelId,
    filepath: &str,
    filesize: i64,
    position: i64,
) -> Result<Picture> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO pictures (hotel_id, filepath, filesize, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![hotel_id.get(), filepath, filesize, position, now],
    )
    .map_err(sql_error)?;

    Ok(Picture {
        id: PictureId::from(conn.last_insert_rowid()),
        hotel_id,
        filepath: filepath.to_string(),
        filesize,
        position,
        created_at: now,
    })
}

/// Append a picture at the end of a hotel's gallery.
///
/// Position assignment and insert share one immediate transaction. Fails
/// with `NotFound` if the hotel row is gone.
pub fn append_picture(
    conn: &mut Connection,
    hotel_id: HotelId,
    filepath: &str,
    filesize: i64,
) -> Result<Picture> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(db_err)?;

    if !super::hotels::hotel_exists(&tx, hotel_id)? {
        return Err(Error::not_found("hotel", hotel_id));
    }

    let position = next_position(&tx, hotel_id)?;
    let picture = insert_picture(&tx, hotel_id, filepath, filesize, position)?;
    tx.commit().map_err(db_err)?;
    Ok(picture)
}

/// Get a picture only if it belongs to `hotel_id`.
pub fn get_owned_picture(
    conn: &Connection,
    hotel_id: HotelId,
    picture_id: PictureId,
) -> Result<Option<Picture>> {
    let q = format!("SELECT {COLS} FROM pictures WHERE id = ?1 AND hotel_id = ?2");
    conn.query_row(&q, [picture_id.get(), hotel_id.get()], Picture::from_row)
        .optional()
        .map_err(db_err)
}

/// List a hotel's pictures in ascending position order.
pub fn list_pictures(conn: &Connection, hotel_id: HotelId) -> Result<Vec<Picture>> {
    let q = format!("SELECT {COLS} FROM pictures WHERE hotel_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&q).map_err(db_err)?;
    let rows = stmt
        .query_map([hotel_id.get()], Picture::from_row)
        .map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// IDs of a hotel's pictures in ascending position order.
pub fn list_picture_ids(conn: &Connection, hotel_id: HotelId) -> Result<Vec<PictureId>> {
    let mut stmt = conn
        .prepare("SELECT id FROM pictures WHERE hotel_id = ?1 ORDER BY position")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([hotel_id.get()], |row| row.get::<_, i64>(0).map(PictureId::from))
        .map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// Blob keys of a hotel's pictures.
pub fn list_hotel_filepaths(conn: &Connection, hotel_id: HotelId) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT filepath FROM pictures WHERE hotel_id = ?1 ORDER BY position")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([hotel_id.get()], |row| row.get(0))
        .map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// Every blob key referenced by any picture row.
pub fn list_all_filepaths(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT filepath FROM pictures ORDER BY filepath")
        .map_err(db_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// Write rank assignments for one hotel.
///
/// Must run inside a transaction. `ranks` must name every picture of the
/// hotel. All positions are first lifted above the current maximum so no
/// intermediate row collides with `UNIQUE (hotel_id, position)`.
pub fn apply_ranks(conn: &Connection, hotel_id: HotelId, ranks: &[Rank]) -> Result<()> {
    if ranks.is_empty() {
        return Ok(());
    }

    let max: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(position), 0) FROM pictures WHERE hotel_id = ?1",
            [hotel_id.get()],
            |row| row.get(0),
        )
        .map_err(db_err)?;

    conn.execute(
        "UPDATE pictures SET position = position + ?1 WHERE hotel_id = ?2",
        rusqlite::params![max, hotel_id.get()],
    )
    .map_err(sql_error)?;

    let mut stmt = conn
        .prepare_cached("UPDATE pictures SET position = ?1 WHERE id = ?2 AND hotel_id = ?3")
        .map_err(db_err)?;
    for rank in ranks {
        let n = stmt
            .execute(rusqlite::params![
                rank.position,
                rank.picture_id.get(),
                hotel_id.get()
            ])
            .map_err(sql_error)?;
        if n != 1 {
            return Err(Error::Conflict(format!(
                "picture {} vanished while reordering hotel {hotel_id}",
                rank.picture_id
            )));
        }
    }

    Ok(())
}

/// Replace a hotel's ordering with `requested`.
///
/// The membership check and the rewrite share one immediate transaction;
/// on any error nothing changes.
pub fn reorder_pictures(
    conn: &mut Connection,
    hotel_id: HotelId,
    requested: &[PictureId],
) -> Result<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(db_err)?;

    if !super::hotels::hotel_exists(&tx, hotel_id)? {
        return Err(Error::not_found("hotel", hotel_id));
    }

    let owned = list_picture_ids(&tx, hotel_id)?;
    let ranks = ordering::plan_reorder(&owned, requested)?;
    apply_ranks(&tx, hotel_id, &ranks)?;

    tx.commit().map_err(db_err)
}

/// Delete one picture of a hotel and close the gap it leaves.
///
/// Returns `false` (and changes nothing) when no picture with that ID
/// belongs to the hotel.
pub fn delete_picture_and_compact(
    conn: &mut Connection,
    hotel_id: HotelId,
    picture_id: PictureId,
) -> Result<bool> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(db_err)?;

    let n = tx
        .execute(
            "DELETE FROM pictures WHERE id = ?1 AND hotel_id = ?2",
            [picture_id.get(), hotel_id.get()],
        )
        .map_err(sql_error)?;
    if n == 0 {
        return Ok(false);
    }

    let remaining = list_picture_ids(&tx, hotel_id)?;
    apply_ranks(&tx, hotel_id, &ordering::rank_in_order(&remaining))?;

    tx.commit().map_err(db_err)?;
    Ok(true)
}
