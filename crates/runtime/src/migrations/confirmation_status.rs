use huddle_core::{Collection, Timestamp};
use serde_json::Value;

use super::{Migration, MigrationOutcome};
use crate::store::{Record, RecordStore, Result};

/// Backfills confirmation fields onto events written before games needed
/// the opponent's confirmation. Such events are treated as confirmed.
pub struct ConfirmationStatusMigration;

impl Migration for ConfirmationStatusMigration {
    fn name(&self) -> &'static str {
        "confirmation_status"
    }

    fn run(&self, store: &dyn RecordStore, _now: Timestamp) -> Result<MigrationOutcome> {
        let Some(mut events) = store.get(Collection::Events.name())? else {
            return Ok(MigrationOutcome::AlreadySatisfied);
        };

        let records = events.iter_mut().map(backfill).filter(|changed| *changed).count();
        if records == 0 {
            return Ok(MigrationOutcome::AlreadySatisfied);
        }

        store.set(Collection::Events.name(), events)?;
        Ok(MigrationOutcome::Applied { records })
    }
}

fn backfill(event: &mut Record) -> bool {
    if event.contains_key("is_confirmed") && event.contains_key("pending_confirmation") {
        return false;
    }

    let created_at = event.get("created_at").cloned().unwrap_or(Value::Null);
    event.entry("is_confirmed").or_insert(Value::Bool(true));
    event.entry("pending_confirmation").or_insert(Value::Bool(false));
    event.entry("confirmed_by").or_insert(Value::Null);
    event.entry("confirmed_at").or_insert(created_at);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chrono::Utc;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn legacy_events_become_confirmed() {
        let store = InMemoryRecordStore::with_collections([(
            "events",
            vec![
                record(json!({"id": "1", "created_at": "2023-05-01T10:00:00Z"})),
                record(json!({
                    "id": "2", "is_confirmed": false, "pending_confirmation": true,
                    "confirmed_by": null, "confirmed_at": null
                })),
            ],
        )]);

        let outcome = ConfirmationStatusMigration.run(&store, Utc::now()).unwrap();
        assert_eq!(outcome, MigrationOutcome::Applied { records: 1 });

        let events = store.get("events").unwrap().unwrap();
        assert_eq!(events[0]["is_confirmed"], true);
        assert_eq!(events[0]["pending_confirmation"], false);
        assert_eq!(events[0]["confirmed_by"], Value::Null);
        assert_eq!(events[0]["confirmed_at"], "2023-05-01T10:00:00Z");
        assert_eq!(events[1]["pending_confirmation"], true);
    }

    #[test]
    fn second_run_changes_nothing() {
        let store = InMemoryRecordStore::with_collections([(
            "events",
            vec![record(json!({"id": "1", "created_at": "2023-05-01T10:00:00Z"}))],
        )]);

        ConfirmationStatusMigration.run(&store, Utc::now()).unwrap();
        let after_first = store.get("events").unwrap();

        let outcome = ConfirmationStatusMigration.run(&store, Utc::now()).unwrap();
        assert_eq!(outcome, MigrationOutcome::AlreadySatisfied);
        assert_eq!(store.get("events").unwrap(), after_first);
    }

    #[test]
    fn missing_events_collection_is_satisfied() {
        let store = InMemoryRecordStore::new();
        let outcome = ConfirmationStatusMigration.run(&store, Utc::now()).unwrap();
        assert_eq!(outcome, MigrationOutcome::AlreadySatisfied);
        assert!(!store.exists("events").unwrap());
    }
}
