//! hotelier-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, and query modules for hotels and
//! their ordered pictures.
//!
//! # Example
//!
//! ```
//! use hotelier_db::pool::{get_conn, init_memory_pool};
//! use hotelier_db::queries::pictures;
//! use hotelier_core::HotelId;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//! assert!(pictures::list_pictures(&conn, HotelId::from(1)).unwrap().is_empty());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
