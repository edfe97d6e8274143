//! In-memory RecordStore implementation for tests and ephemeral sessions.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::ids::SequentialIds;
use super::{Record, RecordStore, Result, StoreError};

/// In-memory implementation of RecordStore.
///
/// Thread-safe but not persistent across process restarts.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<BTreeMap<String, Vec<Record>>>,
    flags: RwLock<BTreeMap<String, bool>>,
    ids: SequentialIds,
}

impl InMemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw collections.
    pub fn with_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Record>)>,
        S: Into<String>,
    {
        let collections = collections
            .into_iter()
            .map(|(name, records)| (name.into(), records))
            .collect();
        Self {
            collections: RwLock::new(collections),
            ..Self::default()
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, collection: &str) -> Result<Option<Vec<Record>>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.get(collection).cloned())
    }

    fn set(&self, collection: &str, records: Vec<Record>) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections.insert(collection.to_owned(), records);
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections.remove(collection);
        Ok(())
    }

    fn collections(&self) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.keys().cloned().collect())
    }

    fn flag(&self, name: &str) -> Result<bool> {
        let flags = self.flags.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(flags.get(name).copied().unwrap_or(false))
    }

    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        let mut flags = self.flags.write().map_err(|_| StoreError::LockPoisoned)?;
        flags.insert(name.to_owned(), value);
        Ok(())
    }

    fn next_id(&self) -> Result<String> {
        Ok(self.ids.allocate().1)
    }
}
