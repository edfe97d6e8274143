//! Typed view of one collection.

use std::marker::PhantomData;

use huddle_core::Entity;
use serde_json::Value;

use super::{Record, RecordStore, Result, StoreError};

/// Maps the records of `T::COLLECTION` to and from `T`.
///
/// Every mutating call loads the whole collection, edits it in memory, and
/// writes it back with a single `set`.
pub struct Table<'a, T> {
    store: &'a dyn RecordStore,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Table<'a, T> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn name(&self) -> &'static str {
        T::COLLECTION.name()
    }

    /// All entities; an absent collection reads as empty.
    pub fn load(&self) -> Result<Vec<T>> {
        let Some(records) = self.store.get(self.name())? else {
            return Ok(Vec::new());
        };

        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record)).map_err(|e| {
                    StoreError::CorruptedRecord {
                        collection: self.name().to_owned(),
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Replace the collection with `entities`.
    pub fn save(&self, entities: &[T]) -> Result<()> {
        let records = entities
            .iter()
            .map(to_record)
            .collect::<Result<Vec<Record>>>()?;
        self.store.set(self.name(), records)
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<Vec<T>> {
        let mut entities = self.load()?;
        entities.retain(|entity| predicate(entity));
        Ok(entities)
    }

    pub fn find_one(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<Option<T>> {
        Ok(self.load()?.into_iter().find(|entity| predicate(entity)))
    }

    pub fn get(&self, id: &str) -> Result<Option<T>> {
        self.find_one(|entity| entity.record_id() == id)
    }

    /// Append one entity.
    pub fn insert(&self, entity: T) -> Result<T> {
        let mut entities = self.load()?;
        entities.push(entity.clone());
        self.save(&entities)?;
        Ok(entity)
    }

    /// Apply `edit` to the entity with `id` and persist.
    ///
    /// Returns `None` without writing when no entity has that id.
    pub fn update(&self, id: &str, edit: impl FnOnce(&mut T)) -> Result<Option<T>> {
        let mut entities = self.load()?;
        let Some(entity) = entities.iter_mut().find(|entity| entity.record_id() == id) else {
            return Ok(None);
        };
        edit(entity);
        let updated = entity.clone();
        self.save(&entities)?;
        Ok(Some(updated))
    }

    /// Delete the entity with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.retain(|entity| entity.record_id() != id)?;
        Ok(removed > 0)
    }

    /// Keep only entities matching `keep`; returns how many were dropped.
    ///
    /// Nothing is written when every entity is kept.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> Result<usize> {
        let mut entities = self.load()?;
        let before = entities.len();
        entities.retain(|entity| keep(entity));
        let removed = before - entities.len();
        if removed > 0 {
            self.save(&entities)?;
        }
        Ok(removed)
    }
}

fn to_record<T: Entity>(entity: &T) -> Result<Record> {
    match serde_json::to_value(entity)? {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::CorruptedRecord {
            collection: T::COLLECTION.name().to_owned(),
            reason: format!("entity serialized to a non-object value: {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chrono::{TimeZone, Utc};
    use huddle_core::{Collection, Note, NoteType};
    use serde_json::json;

    fn note(id: &str, content: &str) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Note {
            id: id.into(),
            author_id: "coach".into(),
            recipient_id: "player".into(),
            team_id: None,
            content: content.to_owned(),
            note_type: NoteType::Coaching,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn absent_collection_loads_empty() {
        let store = InMemoryRecordStore::new();
        let notes = Table::<Note>::new(&store);
        assert!(notes.load().unwrap().is_empty());
    }

    #[test]
    fn insert_get_update_remove() {
        let store = InMemoryRecordStore::new();
        let notes = Table::<Note>::new(&store);

        notes.insert(note("1", "box out")).unwrap();
        notes.insert(note("2", "run the floor")).unwrap();

        let updated = notes
            .update("2", |n| n.content = "sprint back".to_owned())
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "sprint back");
        assert_eq!(notes.get("2").unwrap().unwrap().content, "sprint back");

        assert!(notes.update("9", |_| {}).unwrap().is_none());

        assert!(notes.remove("1").unwrap());
        assert!(!notes.remove("1").unwrap());
        assert_eq!(notes.load().unwrap().len(), 1);
    }

    #[test]
    fn retain_skips_write_when_nothing_removed() {
        let store = InMemoryRecordStore::new();
        let notes = Table::<Note>::new(&store);
        assert_eq!(notes.retain(|_| true).unwrap(), 0);
        assert!(!store.exists(Collection::Notes.name()).unwrap());
    }

    #[test]
    fn malformed_record_is_reported_with_collection() {
        let store = InMemoryRecordStore::with_collections([(
            "notes",
            vec![json!({"id": "1", "content": 7}).as_object().cloned().unwrap()],
        )]);
        let notes = Table::<Note>::new(&store);

        match notes.load() {
            Err(StoreError::CorruptedRecord { collection, .. }) => assert_eq!(collection, "notes"),
            other => panic!("expected corrupted record error, got {other:?}"),
        }
    }
}
