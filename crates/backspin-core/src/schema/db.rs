use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

use super::migrations::MIGRATIONS;
use super::store::Store;

/// How long a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A database connection.
///
/// A `Database` is owned by a single worker. Workers that run concurrently
/// open their own `Database` on the same file; SQLite's locking and the
/// schema's unique indexes are the only coordination between them.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a database with a custom busy timeout.
    pub fn open_with_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// A store for reads outside of a transaction.
    #[must_use]
    pub fn store(&self) -> Store<'_> {
        Store::new(&self.conn)
    }

    /// Run `f` inside an `IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so concurrent writers queue on the
    /// busy timeout instead of failing on lock upgrade. The transaction
    /// commits only if `f` returns `Ok`; on `Err` it is rolled back when
    /// dropped and none of `f`'s writes are visible.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Store<'_>) -> Result<T>,
    {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(&Store::new(&tx))?;
        tx.commit()?;
        Ok(value)
    }

    /// Apply pending migrations.
    ///
    /// Each migration is checked and applied under the write lock, so
    /// workers opening a fresh file at the same time apply it exactly once.
    fn apply_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                [],
            )?;

            let applied = tx
                .query_row(
                    "SELECT 1 FROM schema_migrations WHERE version = ?1",
                    [migration.version],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            if !applied {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                tx.execute_batch(migration.sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
            tx.commit()?;
        }

        Ok(())
    }
}
