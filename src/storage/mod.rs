//! Local persistence of operator credentials.
//!
//! Each credential set lives in one slot keyed by a fixed storage key. The
//! record is stored as plain JSON text with no schema version and no
//! encryption. Concurrent writers are not coordinated; the last write wins.

mod sqlite;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::auth::Credentials;
use crate::error::ApiError;

pub use sqlite::{SQLITE_FILE, SqliteStore};

/// Which console the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    BestBets,
    Pinned,
}

impl CredentialSlot {
    pub const ALL: [CredentialSlot; 2] = [CredentialSlot::BestBets, CredentialSlot::Pinned];

    pub fn storage_key(self) -> &'static str {
        match self {
            CredentialSlot::BestBets => "optimizely-graph-credentials",
            CredentialSlot::Pinned => "optigraph-credentials",
        }
    }
}

pub trait CredentialStore: Send + Sync {
    /// `None` when nothing is stored, or when the stored record is unreadable.
    fn load(&self, slot: CredentialSlot) -> Result<Option<Credentials>, ApiError>;

    fn save(&self, slot: CredentialSlot, credentials: &Credentials) -> Result<(), ApiError>;

    /// Clearing an empty slot is not an error.
    fn clear(&self, slot: CredentialSlot) -> Result<(), ApiError>;
}

/// Decodes a stored record. A corrupt record is logged and treated as absent.
fn decode(slot: CredentialSlot, raw: &str) -> Option<Credentials> {
    match serde_json::from_str(raw) {
        Ok(credentials) => Some(credentials),
        Err(err) => {
            tracing::warn!(
                slot = slot.storage_key(),
                "Failed to load stored credentials: {err}"
            );
            None
        }
    }
}

fn encode(credentials: &Credentials) -> Result<String, ApiError> {
    serde_json::to_string(credentials)
        .map_err(|e| ApiError::Storage(format!("Failed to serialize credentials: {e}")))
}

/// One `<storage key>.json` file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, slot: CredentialSlot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.storage_key()))
    }

    fn ensure_dir(&self) -> Result<(), ApiError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ApiError::Storage(format!(
                "Failed to create data directory `{}`: {e}",
                self.dir.display()
            ))
        })
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self, slot: CredentialSlot) -> Result<Option<Credentials>, ApiError> {
        let file = self.file_for(slot);
        if !file.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&file).map_err(|e| {
            ApiError::Storage(format!(
                "Failed to read credentials file `{}`: {e}",
                file.display()
            ))
        })?;
        Ok(decode(slot, &raw))
    }

    fn save(&self, slot: CredentialSlot, credentials: &Credentials) -> Result<(), ApiError> {
        self.ensure_dir()?;
        let file = self.file_for(slot);
        fs::write(&file, encode(credentials)?).map_err(|e| {
            ApiError::Storage(format!(
                "Failed to write credentials file `{}`: {e}",
                file.display()
            ))
        })
    }

    fn clear(&self, slot: CredentialSlot) -> Result<(), ApiError> {
        let file = self.file_for(slot);
        if !file.exists() {
            return Ok(());
        }
        fs::remove_file(&file).map_err(|e| {
            ApiError::Storage(format!(
                "Failed to remove credentials file `{}`: {e}",
                file.display()
            ))
        })
    }
}

/// Keeps records in memory as JSON text, like the on-disk stores do.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<CredentialSlot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text as-is, bypassing serialization.
    pub fn put_raw(&self, slot: CredentialSlot, raw: impl Into<String>) -> Result<(), ApiError> {
        self.slots()?.insert(slot, raw.into());
        Ok(())
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CredentialSlot, String>>, ApiError> {
        self.slots
            .lock()
            .map_err(|_| ApiError::Storage("Credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, slot: CredentialSlot) -> Result<Option<Credentials>, ApiError> {
        Ok(self
            .slots()?
            .get(&slot)
            .and_then(|raw| decode(slot, raw)))
    }

    fn save(&self, slot: CredentialSlot, credentials: &Credentials) -> Result<(), ApiError> {
        let raw = encode(credentials)?;
        self.slots()?.insert(slot, raw);
        Ok(())
    }

    fn clear(&self, slot: CredentialSlot) -> Result<(), ApiError> {
        self.slots()?.remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials::new("ak", "sk", "https://cg.example.com")
    }

    fn exercise(store: &dyn CredentialStore) {
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), None);

        store.save(CredentialSlot::Pinned, &sample()).unwrap();
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), Some(sample()));
        assert_eq!(store.load(CredentialSlot::BestBets).unwrap(), None);

        let replacement = Credentials::new("ak2", "sk2", "");
        store.save(CredentialSlot::Pinned, &replacement).unwrap();
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), Some(replacement));

        store.clear(CredentialSlot::Pinned).unwrap();
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), None);
        store.clear(CredentialSlot::Pinned).unwrap();
    }

    #[test]
    fn memory_store_load_save_clear() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn json_file_store_load_save_clear() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&JsonFileStore::new(dir.path().join("nested")));
    }

    #[test]
    fn json_file_store_writes_plain_json_under_storage_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(CredentialSlot::BestBets, &sample()).unwrap();

        let raw =
            fs::read_to_string(dir.path().join("optimizely-graph-credentials.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["accessKey"], "ak");
        assert_eq!(value["secretKey"], "sk");
    }

    #[test]
    fn json_file_store_reads_legacy_field_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("optigraph-credentials.json"),
            r#"{"appKey":"ak","secret":"sk","gatewayUrl":"https://cg.example.com"}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), Some(sample()));
    }

    #[test]
    fn corrupt_record_loads_as_none() {
        let store = MemoryStore::new();
        store.put_raw(CredentialSlot::Pinned, "{not json").unwrap();
        assert_eq!(store.load(CredentialSlot::Pinned).unwrap(), None);
    }

    #[test]
    fn slots_have_distinct_keys() {
        assert_ne!(
            CredentialSlot::BestBets.storage_key(),
            CredentialSlot::Pinned.storage_key()
        );
    }
}
