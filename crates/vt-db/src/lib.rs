//! Storage layer for the vitals health log.
//!
//! Everything is persisted as JSON text under string keys in a single SQLite
//! table, so the store behaves like a small key-value map:
//!
//! - [`EventLog`]: one key per record kind, holding a JSON array of records
//! - [`SettingsStore`]: one key per settings domain, holding a JSON object
//! - [`Journal`]: the service object that owns the store and the calendar
//!
//! # Thread Safety
//!
//! [`Database`] wraps its `rusqlite::Connection` in a `Mutex`, so a single
//! instance can be shared across threads. Read-modify-write cycles run in one
//! `IMMEDIATE` transaction while holding the lock, which keeps concurrent
//! appends to the same log from losing each other's writes.
//!
//! # Schema
//!
//! ```sql
//! kv(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```
//!
//! `updated_at` is ISO 8601 UTC with millisecond precision and is informational.

mod journal;
mod log;
mod settings;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use thiserror::Error;
use vt_core::ValidationError;

pub use journal::Journal;
pub use log::EventLog;
pub use settings::SettingsStore;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value could not be decoded.
    #[error("stored value under {key:?} is unreadable")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be encoded for storage.
    #[error("failed to encode value for {key:?}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// A thread panicked while holding the connection lock.
    #[error("database lock poisoned")]
    Poisoned,
    /// A value was rejected before being written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// String-keyed storage of JSON text.
///
/// Implemented by [`Database`]; the logs and settings store only depend on
/// this trait.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, DbError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), DbError>;

    /// Removes all of `keys` at once. Missing keys are ignored.
    fn multi_remove(&self, keys: &[&str]) -> Result<(), DbError>;

    /// Atomically reads `key`, passes the current value to `f`, and writes
    /// back the value `f` returns (`None` leaves the key untouched).
    ///
    /// No other update of the store interleaves between the read and the
    /// write. An error from `f` aborts without writing.
    fn update<T, F>(&self, key: &str, f: F) -> Result<T, DbError>
    where
        F: FnOnce(Option<&str>) -> Result<(Option<String>, T), DbError>;
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            -- kv table: JSON documents keyed by name
            -- updated_at: ISO 8601 format (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    /// Lists every stored key in lexicographic order.
    pub fn keys(&self) -> Result<Vec<String>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let conn = self.lock()?;
        read_value(&conn, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let conn = self.lock()?;
        write_value(&conn, key, value)?;
        tracing::debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn multi_remove(&self, keys: &[&str]) -> Result<(), DbError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM kv WHERE key = ?1")?;
            for key in keys {
                removed += stmt.execute([key])?;
            }
        }
        tx.commit()?;
        tracing::debug!(?keys, removed, "removed keys");
        Ok(())
    }

    fn update<T, F>(&self, key: &str, f: F) -> Result<T, DbError>
    where
        F: FnOnce(Option<&str>) -> Result<(Option<String>, T), DbError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_value(&tx, key)?;
        let (next, output) = f(current.as_deref())?;
        if let Some(value) = next {
            write_value(&tx, key, &value)?;
            tracing::debug!(key, bytes = value.len(), "updated value");
        }
        tx.commit()?;
        Ok(output)
    }
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        ",
        params![key, value, format_timestamp(Utc::now())],
    )?;
    Ok(())
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
