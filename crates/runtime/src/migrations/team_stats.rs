use huddle_core::{Collection, TeamGameStat, Timestamp};
use serde_json::Value;

use super::{Migration, MigrationOutcome, canonicalize, rename_key};
use crate::store::{Record, RecordStore, Result};

/// Moves legacy `team_stats` rows into `team_game_stats`.
///
/// Runs only when the legacy collection has rows and the destination is
/// empty; a populated destination is never overwritten. The legacy
/// collection is removed once the destination has been written.
pub struct TeamStatsMigration;

const RENAMES: [(&str, &str); 7] = [
    ("teamId", "team_id"),
    ("gameId", "game_id"),
    ("teamScore", "points_for"),
    ("team_score", "points_for"),
    ("opponentScore", "points_against"),
    ("opponent_score", "points_against"),
    ("createdAt", "created_at"),
];

impl Migration for TeamStatsMigration {
    fn name(&self) -> &'static str {
        "team_stats"
    }

    fn run(&self, store: &dyn RecordStore, now: Timestamp) -> Result<MigrationOutcome> {
        let legacy = store.get(Collection::TeamStats.name())?.unwrap_or_default();
        if legacy.is_empty() {
            return Ok(MigrationOutcome::AlreadySatisfied);
        }

        let destination = Collection::TeamGameStats.name();
        if store.get(destination)?.is_some_and(|rows| !rows.is_empty()) {
            tracing::info!(
                "Leaving {} legacy team_stats row(s) in place; {} is already populated",
                legacy.len(),
                destination
            );
            return Ok(MigrationOutcome::AlreadySatisfied);
        }

        let migrated = legacy
            .into_iter()
            .map(|record| normalize(record, now))
            .collect::<Result<Vec<_>>>()?;
        let records = migrated.len();

        store.set(destination, migrated)?;
        store.remove(Collection::TeamStats.name())?;

        Ok(MigrationOutcome::Applied { records })
    }
}

fn normalize(mut record: Record, now: Timestamp) -> Result<Record> {
    for (legacy, canonical) in RENAMES {
        rename_key(&mut record, legacy, canonical);
    }

    for key in ["points_for", "points_against"] {
        if let Some(Value::String(raw)) = record.get(key)
            && let Ok(score) = raw.trim().parse::<u32>()
        {
            record.insert(key.to_owned(), Value::from(score));
        }
    }

    record
        .entry("created_at")
        .or_insert_with(|| Value::String(now.to_rfc3339()));

    canonicalize::<TeamGameStat>(record)
}
