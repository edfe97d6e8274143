//! Record store contract.

use serde_json::{Map, Value};

use super::Result;

/// A stored record: one JSON object.
pub type Record = Map<String, Value>;

/// Named-collection storage shared by every repository.
///
/// A collection is a flat, ordered list of records read and written as a
/// unit. Absence and emptiness are distinct: [`get`](Self::get) returns
/// `None` for a collection that was never written and `Some(vec![])` for one
/// written empty.
///
/// Writes replace the whole collection. Two handles writing the same
/// collection concurrently race, and the later `set` wins.
pub trait RecordStore: Send + Sync {
    /// Load every record of a collection.
    fn get(&self, collection: &str) -> Result<Option<Vec<Record>>>;

    /// Replace a collection with `records`.
    fn set(&self, collection: &str, records: Vec<Record>) -> Result<()>;

    /// Delete a collection. Deleting a missing collection is not an error.
    fn remove(&self, collection: &str) -> Result<()>;

    /// Names of every collection that currently exists, sorted.
    fn collections(&self) -> Result<Vec<String>>;

    /// Read a persisted boolean flag. Unset flags read as `false`.
    fn flag(&self, name: &str) -> Result<bool>;

    /// Persist a boolean flag.
    fn set_flag(&self, name: &str, value: bool) -> Result<()>;

    /// Allocate a fresh record id, unique within this store.
    fn next_id(&self) -> Result<String>;

    /// Check if a collection exists
    fn exists(&self, collection: &str) -> Result<bool> {
        Ok(self.get(collection)?.is_some())
    }
}
