//! SQLite schema and the transactional store.
//!
//! [`Database`] owns one connection. Every mutation runs through
//! [`Database::transaction`], which hands a [`Store`] bound to an
//! `IMMEDIATE` transaction to the caller's closure; returning `Err` from the
//! closure rolls the whole transaction back.

mod catalog;
mod db;
pub mod migrations;
mod reactions;
mod reviews;
mod store;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub use db::{Database, DEFAULT_BUSY_TIMEOUT};
pub use store::{Store, UniqueInsert};

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read an RFC 3339 timestamp column.
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(idx, &raw)
}

/// Read a nullable RFC 3339 timestamp column.
pub(crate) fn optional_timestamp(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| parse_timestamp(idx, &raw))
        .transpose()
}

/// Whether a rusqlite error is a UNIQUE / PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}
