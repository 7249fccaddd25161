//! Hotel record input and its field rules.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MIN_CAPACITY: i64 = 1;
pub const MAX_CAPACITY: i64 = 200;

/// Fields supplied when creating a hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HotelInput {
    pub name: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    /// Latitude in degrees, -90..=90.
    pub lat: f64,
    /// Longitude in degrees, -180..=180.
    pub lng: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub max_capacity: i64,
    pub price_per_night: f64,
}

impl HotelInput {
    /// Check every field rule, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        required("name", &self.name)?;
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(Error::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        required("address1", &self.address1)?;
        required("zipcode", &self.zipcode)?;
        required("city", &self.city)?;
        required("country", &self.country)?;

        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::validation("lat must be between -90 and 90"));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::validation("lng must be between -180 and 180"));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(Error::validation(format!(
                    "description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }

        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.max_capacity) {
            return Err(Error::validation(format!(
                "max_capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}"
            )));
        }

        if !self.price_per_night.is_finite() || self.price_per_night < 0.0 {
            return Err(Error::validation("price_per_night must be a non-negative number"));
        }

        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}
