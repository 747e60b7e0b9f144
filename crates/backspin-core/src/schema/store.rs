use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::model::TargetKind;

/// Outcome of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueInsert {
    Inserted,
    AlreadyExists,
}

/// Row-level operations over one connection or transaction.
///
/// Obtained from [`super::Database::store`] for plain reads, or handed to the
/// closure of [`super::Database::transaction`] for writes.
#[derive(Debug, Clone, Copy)]
pub struct Store<'c> {
    pub(super) conn: &'c Connection,
}

impl<'c> Store<'c> {
    pub(super) const fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Whether a live entity of `kind` with `id` exists.
    ///
    /// Soft-deleted reviews do not count.
    pub fn exists(&self, kind: TargetKind, id: &str) -> Result<bool> {
        let live = if kind == TargetKind::Review {
            " AND deleted_at IS NULL"
        } else {
            ""
        };
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1{live}", kind.table());
        let found = self
            .conn
            .query_row(&sql, [id], |_| Ok(()))
            .optional()?
            .is_some();
        Ok(found)
    }
}
