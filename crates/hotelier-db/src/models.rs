//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use hotelier_core::{HotelId, PictureId};

// ---------------------------------------------------------------------------
// Hotel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub description: Option<String>,
    pub max_capacity: i64,
    pub price_per_night: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Hotel {
    /// Build from a row selected as:
    /// id, name, address1, address2, zipcode, city, country, lat, lng,
    /// description, max_capacity, price_per_night, created_at, updated_at
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: HotelId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            address1: row.get(2)?,
            address2: row.get(3)?,
            zipcode: row.get(4)?,
            city: row.get(5)?,
            country: row.get(6)?,
            lat: row.get(7)?,
            lng: row.get(8)?,
            description: row.get(9)?,
            max_capacity: row.get(10)?,
            price_per_night: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Picture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub id: PictureId,
    pub hotel_id: HotelId,
    /// Blob key relative to the storage root, e.g. `pictures/<uuid>.jpg`.
    pub filepath: String,
    pub filesize: i64,
    pub position: i64,
    pub created_at: String,
}

impl Picture {
    /// Build from a row selected as:
    /// id, hotel_id, filepath, filesize, position, created_at
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: PictureId::from(row.get::<_, i64>(0)?),
            hotel_id: HotelId::from(row.get::<_, i64>(1)?),
            filepath: row.get(2)?,
            filesize: row.get(3)?,
            position: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
