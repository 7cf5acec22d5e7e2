use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};

use crate::auth::Credentials;
use crate::error::ApiError;

use super::{CredentialSlot, CredentialStore, decode, encode};

pub const SQLITE_FILE: &str = "pinman.db";

/// One row per slot in a local SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        let conn = Connection::open(path)
            .map_err(|err| ApiError::Storage(format!("Failed to open SQLite: {err}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|err| ApiError::Storage(format!("Failed to set SQLite journal mode: {err}")))?;

        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, ApiError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| ApiError::Storage(format!("Failed to open SQLite: {err}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, ApiError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credential_slots (
             slot_key TEXT PRIMARY KEY,
             credentials_json TEXT NOT NULL,
             updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
           );",
        )
        .map_err(|err| ApiError::Storage(format!("Failed to initialize SQLite schema: {err}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|_| ApiError::Storage("SQLite connection lock poisoned".to_string()))
    }

    fn load_raw(&self, slot: CredentialSlot) -> Result<Option<String>, ApiError> {
        self.conn()?
            .query_row(
                "SELECT credentials_json FROM credential_slots WHERE slot_key = ?1 LIMIT 1;",
                params![slot.storage_key()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| ApiError::Storage(format!("Failed to load credentials from SQLite: {err}")))
    }
}

impl CredentialStore for SqliteStore {
    fn load(&self, slot: CredentialSlot) -> Result<Option<Credentials>, ApiError> {
        Ok(self
            .load_raw(slot)?
            .and_then(|raw| decode(slot, &raw)))
    }

    fn save(&self, slot: CredentialSlot, credentials: &Credentials) -> Result<(), ApiError> {
        let raw = encode(credentials)?;
        self.conn()?
            .execute(
                "INSERT INTO credential_slots (slot_key, credentials_json, updated_at)
               VALUES (?1, ?2, strftime('%s','now'))
               ON CONFLICT(slot_key)
               DO UPDATE SET
                 credentials_json = excluded.credentials_json,
                 updated_at = excluded.updated_at;",
                params![slot.storage_key(), raw],
            )
            .map_err(|err| ApiError::Storage(format!("Failed to save credentials to SQLite: {err}")))?;
        Ok(())
    }

    fn clear(&self, slot: CredentialSlot) -> Result<(), ApiError> {
        self.conn()?
            .execute(
                "DELETE FROM credential_slots WHERE slot_key = ?1;",
                params![slot.storage_key()],
            )
            .map_err(|err| ApiError::Storage(format!("Failed to clear credentials in SQLite: {err}")))?;
        Ok(())
    }
}
