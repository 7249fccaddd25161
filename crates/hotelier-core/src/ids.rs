//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Each ID type is a newtype over the `i64` rowid SQLite assigns, preventing
//! accidental misuse (e.g., passing a `PictureId` where a `HotelId` is
//! expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generate a newtype ID wrapper over `i64`.
///
/// The macro produces a struct with:
/// - `get()` to read the raw rowid
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner integer
/// - `From<i64>` and `Into<i64>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Return the raw database rowid.
                #[must_use]
                pub fn get(self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.parse::<i64>().map(Self)
                }
            }

            impl From<i64> for $name {
                fn from(raw: i64) -> Self {
                    Self(raw)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Identifier of a hotel record.
    HotelId,
    /// Identifier of a picture attached to a hotel.
    PictureId,
}
