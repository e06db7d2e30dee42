//! SQLite-backed key/value storage.
//!
//! Every component's state is stored as a JSON document under a fixed key
//! in a single `kv` table. Writes for one component go through
//! [`Database::kv_set_many`] so its keys land in one transaction.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use super::store::KvBackend;
use crate::error::StorageError;

/// SQLite database holding the key/value table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/momentum/momentum.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("momentum.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Set several values atomically.
    pub fn kv_set_many(&mut self, entries: &[(&str, String)]) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()
    }

    /// Remove a key. Missing keys are ignored.
    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KvBackend for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        Ok(self.kv_set_many(entries)?)
    }
}
