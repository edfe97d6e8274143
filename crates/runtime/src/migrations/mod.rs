//! One-time data migrations run when a [`crate::Huddle`] is opened.
//!
//! Each migration is gated by a persisted flag named `<name>_migrated`:
//! - a set flag makes the migration a no-op
//! - a migration that fails leaves its flag unset and is retried next time
//! - a failure never stops the remaining migrations
//!
//! Legacy record shapes are rewritten here so that repositories only ever
//! see one canonical shape per entity.

mod confirmation_status;
mod note_fields;
mod team_stats;

use std::sync::Arc;

use huddle_core::{Entity, Timestamp};
use serde_json::Value;
use tracing::{info, warn};

use crate::store::{Record, RecordStore, Result, StoreError};

pub use confirmation_status::ConfirmationStatusMigration;
pub use note_fields::NoteFieldsMigration;
pub use team_stats::TeamStatsMigration;

/// What a single successful migration run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Data was transformed; `records` is the number of records rewritten.
    Applied { records: usize },
    /// Data already had the target shape; only the flag was set.
    AlreadySatisfied,
    /// The flag was already set.
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationStatus {
    Done(MigrationOutcome),
    Failed(String),
}

/// A named, idempotent data transformation.
pub trait Migration: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transform the store. Every collection touched is written with a
    /// single `set`. `now` stands in for timestamps legacy records lack.
    fn run(&self, store: &dyn RecordStore, now: Timestamp) -> Result<MigrationOutcome>;
}

/// Per-migration results of one [`MigrationRunner::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub entries: Vec<(&'static str, MigrationStatus)>,
}

impl MigrationReport {
    pub fn status(&self, name: &str) -> Option<&MigrationStatus> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, status)| status)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().filter_map(|(name, status)| match status {
            MigrationStatus::Failed(reason) => Some((*name, reason.as_str())),
            MigrationStatus::Done(_) => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs migrations in a fixed order.
pub struct MigrationRunner {
    migrations: Vec<Arc<dyn Migration>>,
}

impl MigrationRunner {
    pub fn new(migrations: Vec<Arc<dyn Migration>>) -> Self {
        Self { migrations }
    }

    /// The migrations every store goes through, in order:
    /// - `team_stats`: legacy team rows move to `team_game_stats`
    /// - `confirmation_status`: events gain confirmation fields
    /// - `note_fields`: legacy note keys are renamed
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(TeamStatsMigration) as Arc<dyn Migration>,
            Arc::new(ConfirmationStatusMigration),
            Arc::new(NoteFieldsMigration),
        ])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.migrations.iter().map(|m| m.name())
    }

    pub fn run(&self, store: &dyn RecordStore, now: Timestamp) -> MigrationReport {
        let entries = self
            .migrations
            .iter()
            .map(|migration| {
                let name = migration.name();
                let status = match run_one(migration.as_ref(), store, now) {
                    Ok(outcome) => {
                        if outcome != MigrationOutcome::Skipped {
                            info!("Migration '{}' finished: {:?}", name, outcome);
                        }
                        MigrationStatus::Done(outcome)
                    }
                    Err(e) => {
                        warn!("Migration '{}' failed, will retry on next open: {}", name, e);
                        MigrationStatus::Failed(e.to_string())
                    }
                };
                (name, status)
            })
            .collect();

        MigrationReport { entries }
    }
}

fn run_one(
    migration: &dyn Migration,
    store: &dyn RecordStore,
    now: Timestamp,
) -> Result<MigrationOutcome> {
    let flag = flag_name(migration.name());
    if store.flag(&flag)? {
        return Ok(MigrationOutcome::Skipped);
    }

    let outcome = migration.run(store, now)?;
    store.set_flag(&flag, true)?;
    Ok(outcome)
}

/// Persisted flag guarding the migration called `name`.
pub fn flag_name(name: &str) -> String {
    format!("{name}_migrated")
}

/// Move `legacy` to `canonical` unless the canonical key is already present.
/// Returns true when the record changed.
fn rename_key(record: &mut Record, legacy: &str, canonical: &str) -> bool {
    let Some(value) = record.remove(legacy) else {
        return false;
    };
    if !record.contains_key(canonical) {
        record.insert(canonical.to_owned(), value);
    }
    true
}

/// Round-trip `record` through `T`, dropping unknown keys and rejecting
/// records that still do not fit.
fn canonicalize<T: Entity>(record: Record) -> Result<Record> {
    let collection = T::COLLECTION.name();
    let entity: T =
        serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::CorruptedRecord {
            collection: collection.to_owned(),
            reason: e.to_string(),
        })?;

    match serde_json::to_value(entity)? {
        Value::Object(record) => Ok(record),
        _ => Err(StoreError::CorruptedRecord {
            collection: collection.to_owned(),
            reason: "entity did not serialize to an object".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        runs: AtomicUsize,
    }

    impl Migration for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn run(&self, _: &dyn RecordStore, _: Timestamp) -> Result<MigrationOutcome> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(MigrationOutcome::AlreadySatisfied)
        }
    }

    struct Broken;

    impl Migration for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn run(&self, _: &dyn RecordStore, _: Timestamp) -> Result<MigrationOutcome> {
            Err(StoreError::Unavailable("boom".into()))
        }
    }

    #[test]
    fn flag_makes_second_run_a_no_op() {
        let store = InMemoryRecordStore::new();
        let counting = Arc::new(Counting {
            runs: AtomicUsize::new(0),
        });
        let runner = MigrationRunner::new(vec![counting.clone() as Arc<dyn Migration>]);

        runner.run(&store, Utc::now());
        let report = runner.run(&store, Utc::now());

        assert_eq!(counting.runs.load(Ordering::SeqCst), 1);
        assert_eq!(
            report.status("counting"),
            Some(&MigrationStatus::Done(MigrationOutcome::Skipped))
        );
        assert!(store.flag("counting_migrated").unwrap());
    }

    #[test]
    fn failure_leaves_flag_unset_and_later_migrations_run() {
        let store = InMemoryRecordStore::new();
        let counting = Arc::new(Counting {
            runs: AtomicUsize::new(0),
        });
        let runner = MigrationRunner::new(vec![
            Arc::new(Broken) as Arc<dyn Migration>,
            counting.clone(),
        ]);

        let report = runner.run(&store, Utc::now());

        assert!(!report.is_clean());
        assert_eq!(report.failures().map(|(name, _)| name).collect::<Vec<_>>(), ["broken"]);
        assert!(!store.flag("broken_migrated").unwrap());
        assert_eq!(counting.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn standard_order_is_fixed() {
        let names: Vec<_> = MigrationRunner::standard().names().collect();
        assert_eq!(names, ["team_stats", "confirmation_status", "note_fields"]);
    }

    #[test]
    fn rename_prefers_existing_canonical_value() {
        let mut record = serde_json::json!({"teamId": "old", "team_id": "new"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(rename_key(&mut record, "teamId", "team_id"));
        assert_eq!(record["team_id"], "new");
        assert!(!record.contains_key("teamId"));
    }
}
