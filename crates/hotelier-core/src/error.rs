//! Unified error type for the hotelier application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in hotelier.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request itself was malformed (missing multipart field, bad path id).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The target does not belong to the parent named in the request.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "hotel", "picture").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A concurrent writer got there first.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The blob backend failed or timed out.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::BadRequest(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            Error::NotFound { .. } => 404,
            Error::Conflict(_) => 409,
            Error::Validation(_) => 422,
            Error::Storage(_) => 503,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound { .. } => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Validation(_) => "validation_error",
            Error::Storage(_) => "storage_error",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Server-side failures carry file paths and SQL text, so only a generic
    /// description leaves the process for those.
    pub fn public_message(&self) -> String {
        match self {
            Error::Storage(_) => "Picture storage is unavailable".into(),
            Error::Database { .. } | Error::Io { .. } | Error::Internal(_) => {
                "Internal server error".into()
            }
            other => other.to_string(),
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Storage`].
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
