//! Route handlers for the HTTP API.

pub mod health;
pub mod hotels;
pub mod pictures;

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use hotelier_core::Error;

/// Parse a numeric path segment, rejecting garbage with `BadRequest`.
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| Error::BadRequest(format!("invalid {entity} id: {raw:?}")))
}

/// Map a JSON body rejection onto the API error shape.
pub(crate) fn json_rejection(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::JsonDataError(e) => Error::validation(e.body_text()),
        other => Error::BadRequest(other.body_text()),
    }
}
