//! Database query modules.

pub mod hotels;
pub mod pictures;

use hotelier_core::Error;

/// Map a rusqlite error, surfacing constraint failures by kind.
///
/// CHECK failures mean a value slipped past input validation. Other
/// constraint failures come from a concurrent writer racing on the
/// `(hotel_id, position)` index or from a parent row vanishing mid-request.
pub(crate) fn sql_error(e: rusqlite::Error) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
        {
            Error::validation(e.to_string())
        }
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(e.to_string())
        }
        _ => Error::database(e.to_string()),
    }
}
