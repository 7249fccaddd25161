//! hotelier-core: shared types, IDs, errors, configuration, and the pure
//! rules behind picture uploads and ordering.
//!
//! This crate is the foundational dependency for the other hotelier
//! crates. It has no knowledge of SQL, HTTP, or the filesystem layout of
//! stored pictures; those live in `hotelier-db` and `hotelier-server`.

pub mod config;
pub mod error;
pub mod hotel;
pub mod ids;
pub mod ordering;
pub mod upload;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
