// crates/skywatch-services/src/preference_store.rs

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use skywatch_core::{RusqliteErrorExt, StorageError};

/// Durable string-keyed preference storage.
///
/// Values are stored as JSON text in a single SQLite table. Reads never
/// fail: a missing, unreadable, or unopenable store yields the caller's
/// default. Writes go straight to disk.
pub struct PreferenceStore {
    conn: Option<Connection>,
}

impl PreferenceStore {
    /// Open or create the database.
    ///
    /// On failure the store still works, but every read returns the default
    /// and every write reports `StorageError::Unavailable`.
    pub fn open(path: &Path) -> Self {
        match Self::try_open(path) {
            Ok(conn) => {
                tracing::debug!("Opened preference store at {}", path.display());
                Self { conn: Some(conn) }
            }
            Err(e) => {
                tracing::warn!(
                    "Preference store at {} unavailable, using defaults: {}",
                    path.display(),
                    e
                );
                Self { conn: None }
            }
        }
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Self {
        match Connection::open_in_memory()
            .map_err(RusqliteErrorExt::into_storage_error)
            .and_then(|conn| Self::init_schema(&conn).map(|_| conn))
        {
            Ok(conn) => Self { conn: Some(conn) },
            Err(e) => {
                tracing::warn!("In-memory preference store unavailable: {}", e);
                Self { conn: None }
            }
        }
    }

    /// A store with no backing database
    pub fn unavailable() -> Self {
        Self { conn: None }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    fn try_open(path: &Path) -> Result<Connection, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Unavailable(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path).map_err(RusqliteErrorExt::into_storage_error)?;
        Self::init_schema(&conn)?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(RusqliteErrorExt::into_storage_error)
    }

    /// Read a value, falling back to `default` on any problem
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(conn) = &self.conn else {
            return default;
        };

        let raw: Option<String> = match conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Failed to read preference '{}': {}",
                    key,
                    e.into_storage_error()
                );
                return default;
            }
        };

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable preference '{}': {}", key, e);
                    default
                }
            },
            None => default,
        }
    }

    /// Write a value through to disk
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let conn = self.conn.as_ref().ok_or_else(|| {
            StorageError::Unavailable("preference store is not open".to_string())
        })?;

        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Encoding(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            params![key, raw],
        )
        .map_err(RusqliteErrorExt::into_storage_error)?;

        tracing::debug!("Stored preference '{}'", key);
        Ok(())
    }

    /// Store a raw, already-encoded value (used to simulate hand-edited data)
    #[cfg(test)]
    pub(crate) fn set_raw(&self, key: &str, raw: &str) {
        if let Some(conn) = &self.conn {
            let _ = conn.execute(
                "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
                params![key, raw],
            );
        }
    }
}
