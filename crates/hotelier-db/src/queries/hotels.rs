//! Hotel record operations.

use chrono::Utc;
use hotelier_core::hotel::HotelInput;
use hotelier_core::{Error, HotelId, Result};
use rusqlite::{Connection, TransactionBehavior};

use super::sql_error;
use crate::models::Hotel;

const COLS: &str = "id, name, address1, address2, zipcode, city, country, lat, lng, \
                    description, max_capacity, price_per_night, created_at, updated_at";

/// Insert a hotel. The input is expected to have been validated.
pub fn create_hotel(conn: &Connection, input: &HotelInput) -> Result<Hotel> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO hotels (name, address1, address2, zipcode, city, country, lat, lng,
                             description, max_capacity, price_per_night, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        rusqlite::params![
            input.name,
            input.address1,
            input.address2,
            input.zipcode,
            input.city,
            input.country,
            input.lat,
            input.lng,
            input.description,
            input.max_capacity,
            input.price_per_night,
            now,
        ],
    )
    .map_err(sql_error)?;

    Ok(Hotel {
        id: HotelId::from(conn.last_insert_rowid()),
        name: input.name.clone(),
        address1: input.address1.clone(),
        address2: input.address2.clone(),
        zipcode: input.zipcode.clone(),
        city: input.city.clone(),
        country: input.country.clone(),
        lat: input.lat,
        lng: input.lng,
        description: input.description.clone(),
        max_capacity: input.max_capacity,
        price_per_night: input.price_per_night,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a hotel by ID.
pub fn get_hotel(conn: &Connection, id: HotelId) -> Result<Option<Hotel>> {
    let q = format!("SELECT {COLS} FROM hotels WHERE id = ?1");
    let result = conn.query_row(&q, [id.get()], Hotel::from_row);
    match result {
        Ok(h) => Ok(Some(h)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Whether a hotel row exists.
pub fn hotel_exists(conn: &Connection, id: HotelId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM hotels WHERE id = ?1)",
        [id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Delete a hotel (cascades to its picture rows).
pub fn delete_hotel(conn: &Connection, id: HotelId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM hotels WHERE id = ?1", [id.get()])
        .map_err(sql_error)?;
    Ok(n > 0)
}

/// Delete a hotel and its picture rows in one immediate transaction.
///
/// Returns the blob keys the deleted pictures referenced, or `None` if the
/// hotel did not exist. Blob removal is left to the caller.
pub fn remove_hotel(conn: &mut Connection, id: HotelId) -> Result<Option<Vec<String>>> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| Error::database(e.to_string()))?;

    let filepaths = super::pictures::list_hotel_filepaths(&tx, id)?;
    if !delete_hotel(&tx, id)? {
        return Ok(None);
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(Some(filepaths))
}
