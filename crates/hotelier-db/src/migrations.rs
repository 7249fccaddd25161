//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use hotelier_core::{Error, Result};
use rusqlite::Connection;

/// V1: hotels and their ordered pictures.
const V1_INITIAL: &str = r#"
CREATE TABLE hotels (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    address1        TEXT NOT NULL,
    address2        TEXT,
    zipcode         TEXT NOT NULL,
    city            TEXT NOT NULL,
    country         TEXT NOT NULL,
    lat             REAL NOT NULL CHECK (lat BETWEEN -90 AND 90),
    lng             REAL NOT NULL CHECK (lng BETWEEN -180 AND 180),
    description     TEXT,
    max_capacity    INTEGER NOT NULL CHECK (max_capacity BETWEEN 1 AND 200),
    price_per_night REAL NOT NULL CHECK (price_per_night >= 0),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- position is unique per hotel; rewrites shift rows above the current
-- maximum first so the index never sees a duplicate mid-statement.
CREATE TABLE pictures (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    hotel_id   INTEGER NOT NULL REFERENCES hotels(id) ON DELETE CASCADE,
    filepath   TEXT NOT NULL UNIQUE,
    filesize   INTEGER NOT NULL CHECK (filesize >= 0),
    position   INTEGER NOT NULL CHECK (position > 0),
    created_at TEXT NOT NULL,
    UNIQUE (hotel_id, position)
);

CREATE INDEX idx_hotels_name ON hotels(name);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction. Returns
/// the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    let mut applied = 0;
    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        applied += 1;
    }

    Ok(applied)
}

/// Highest migration version bundled with this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|&(v, _)| v).unwrap_or(0)
}
