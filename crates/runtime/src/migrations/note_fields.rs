use std::str::FromStr;

use huddle_core::{Collection, Note, NoteType, Timestamp};
use serde_json::Value;

use super::{Migration, MigrationOutcome, canonicalize, rename_key};
use crate::store::{Record, RecordStore, Result};

/// Rewrites notes stored with the old camelCase message keys.
pub struct NoteFieldsMigration;

const RENAMES: [(&str, &str); 7] = [
    ("fromUserId", "author_id"),
    ("toUserId", "recipient_id"),
    ("teamId", "team_id"),
    ("message", "content"),
    ("type", "note_type"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

impl Migration for NoteFieldsMigration {
    fn name(&self) -> &'static str {
        "note_fields"
    }

    fn run(&self, store: &dyn RecordStore, now: Timestamp) -> Result<MigrationOutcome> {
        let Some(notes) = store.get(Collection::Notes.name())? else {
            return Ok(MigrationOutcome::AlreadySatisfied);
        };

        let mut records = 0;
        let mut migrated = Vec::with_capacity(notes.len());
        for mut note in notes {
            if normalize(&mut note, now) {
                note = canonicalize::<Note>(note)?;
                records += 1;
            }
            migrated.push(note);
        }

        if records == 0 {
            return Ok(MigrationOutcome::AlreadySatisfied);
        }

        store.set(Collection::Notes.name(), migrated)?;
        Ok(MigrationOutcome::Applied { records })
    }
}

/// Returns true when the note had any legacy key.
fn normalize(note: &mut Record, now: Timestamp) -> bool {
    let mut changed = false;
    for (legacy, canonical) in RENAMES {
        changed |= rename_key(note, legacy, canonical);
    }
    if !changed {
        return false;
    }

    let note_type = note
        .get("note_type")
        .and_then(Value::as_str)
        .and_then(|raw| NoteType::from_str(raw.trim()).ok())
        .unwrap_or_default();
    note.insert("note_type".to_owned(), Value::String(note_type.to_string()));

    let created_at = note
        .entry("created_at")
        .or_insert_with(|| Value::String(now.to_rfc3339()))
        .clone();
    note.entry("updated_at").or_insert(created_at);

    true
}
