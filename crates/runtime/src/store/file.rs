//! File-based RecordStore implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::ids::SequentialIds;
use super::{Record, RecordStore, Result, StoreError};

const META_FILE: &str = "_meta.json";

/// File-based implementation of RecordStore.
///
/// # File Format
///
/// ```text
/// {base_dir}/
///   users.json        ← one pretty-printed JSON array per collection
///   events.json
///   _meta.json        ← flags + id counter
/// ```
///
/// Every write lands in a `*.tmp` sibling first and is renamed into place,
/// so a crash never leaves a half-written collection behind.
pub struct FileRecordStore {
    base_dir: PathBuf,
    meta: Mutex<StoreMeta>,
    ids: SequentialIds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreMeta {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
    #[serde(default = "first_id")]
    next_id: u64,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            flags: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

fn first_id() -> u64 {
    1
}

impl FileRecordStore {
    /// Open (or create) a store rooted at `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(StoreError::Io)?;

        let meta_path = base_dir.join(META_FILE);
        let meta = if meta_path.exists() {
            let json = fs::read_to_string(&meta_path).map_err(StoreError::Io)?;
            serde_json::from_str(&json).map_err(|e| StoreError::CorruptedRecord {
                collection: META_FILE.to_owned(),
                reason: e.to_string(),
            })?
        } else {
            StoreMeta::default()
        };

        tracing::debug!(
            "Opened record store at {} (next id {})",
            base_dir.display(),
            meta.next_id
        );

        Ok(Self {
            ids: SequentialIds::starting_at(meta.next_id),
            meta: Mutex::new(meta),
            base_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a collection file.
    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        validate_name(collection)?;
        Ok(self.base_dir.join(format!("{collection}.json")))
    }

    fn write_meta(&self, meta: &StoreMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta)?;
        write_atomic(&self.base_dir.join(META_FILE), json.as_bytes())
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, collection: &str) -> Result<Option<Vec<Record>>> {
        let path = self.collection_path(collection)?;

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(StoreError::Io)?;
        let records: Vec<Record> =
            serde_json::from_str(&json).map_err(|e| StoreError::CorruptedRecord {
                collection: collection.to_owned(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Loaded {} record(s) from '{}'", records.len(), collection);

        Ok(Some(records))
    }

    fn set(&self, collection: &str, records: Vec<Record>) -> Result<()> {
        let path = self.collection_path(collection)?;
        let json = serde_json::to_string_pretty(&records)?;
        write_atomic(&path, json.as_bytes())?;

        tracing::debug!("Saved {} record(s) to '{}'", records.len(), collection);

        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        let path = self.collection_path(collection)?;

        if path.exists() {
            fs::remove_file(&path).map_err(StoreError::Io)?;
            tracing::debug!("Removed collection '{}'", collection);
        }

        Ok(())
    }

    fn collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(StoreError::Io)?;

        for entry in entries {
            let entry = entry.map_err(StoreError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(name) = filename.strip_suffix(".json")
                && validate_name(name).is_ok()
            {
                names.push(name.to_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    fn flag(&self, name: &str) -> Result<bool> {
        let meta = self.meta.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(meta.flags.get(name).copied().unwrap_or(false))
    }

    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        let mut meta = self.meta.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut updated = meta.clone();
        updated.flags.insert(name.to_owned(), value);
        self.write_meta(&updated)?;
        *meta = updated;
        Ok(())
    }

    fn next_id(&self) -> Result<String> {
        let mut meta = self.meta.lock().map_err(|_| StoreError::LockPoisoned)?;
        let (_, id) = self.ids.allocate();
        meta.next_id = self.ids.peek();
        self.write_meta(&meta)?;
        Ok(id)
    }
}

/// Collection names become file names, so only `[a-z0-9_]` starting with a
/// letter is accepted.
fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_owned()))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    // Write to temp file
    fs::write(&temp_path, bytes).map_err(StoreError::Io)?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(StoreError::Io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileRecordStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let (_temp, store) = setup();

        assert_eq!(store.get("teams").unwrap(), None);
        store
            .set("teams", vec![record(json!({"id": "1", "name": "Hawks"}))])
            .unwrap();

        let teams = store.get("teams").unwrap().unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0]["name"], "Hawks");
    }

    #[test]
    fn test_empty_collection_is_not_absent() {
        let (_temp, store) = setup();
        store.set("events", vec![]).unwrap();
        assert_eq!(store.get("events").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_list_skips_meta_and_temp_files() {
        let (temp, store) = setup();
        store.set("users", vec![]).unwrap();
        store.set("events", vec![]).unwrap();
        store.set_flag("x_migrated", true).unwrap();
        fs::write(temp.path().join("stray.json.tmp"), b"[]").unwrap();

        assert_eq!(store.collections().unwrap(), ["events", "users"]);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (_temp, store) = setup();
        assert!(matches!(
            store.get("../etc"),
            Err(StoreError::InvalidCollection(_))
        ));
        assert!(matches!(
            store.set("_meta", vec![]),
            Err(StoreError::InvalidCollection(_))
        ));
    }

    #[test]
    fn test_flags_and_ids_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let last = {
            let store = FileRecordStore::open(temp_dir.path()).unwrap();
            store.set_flag("team_stats_migrated", true).unwrap();
            store.next_id().unwrap();
            store.next_id().unwrap()
        };

        let reopened = FileRecordStore::open(temp_dir.path()).unwrap();
        assert!(reopened.flag("team_stats_migrated").unwrap());
        let next = reopened.next_id().unwrap();
        assert!(next > last);
    }

    #[test]
    fn test_corrupted_collection_is_reported() {
        let (temp, store) = setup();
        fs::write(temp.path().join("notes.json"), b"{not json").unwrap();

        match store.get("notes") {
            Err(StoreError::CorruptedRecord { collection, .. }) => assert_eq!(collection, "notes"),
            other => panic!("expected corrupted record error, got {other:?}"),
        }
    }
}
