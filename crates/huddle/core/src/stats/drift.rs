use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::TeamId;
use crate::model::{GameStat, StatLine, TeamSeasonStats};
use crate::stats::totals::SeasonTotals;

/// Side-by-side view of a team's season cache and a recomputation from
/// game rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDrift {
    pub cached: SeasonTotals,
    pub recomputed: SeasonTotals,
}

impl CacheDrift {
    pub fn is_consistent(&self) -> bool {
        self.cached == self.recomputed
    }
}

/// Compares the cache against the rows stored for `team_id`.
///
/// The recomputation counts distinct games, not rows, since a team has one
/// row per player per game.
pub fn team_cache_drift(
    team_id: &TeamId,
    cache: Option<&TeamSeasonStats>,
    rows: &[GameStat],
) -> CacheDrift {
    let team_rows: Vec<&GameStat> = rows.iter().filter(|row| &row.team_id == team_id).collect();
    let games: BTreeSet<&str> = team_rows.iter().map(|row| row.game_id.as_str()).collect();

    let recomputed = SeasonTotals {
        games_played: games.len() as u32,
        totals: team_rows.iter().map(|row| &row.line).sum::<StatLine>(),
    };
    let cached = cache
        .map(|cache| SeasonTotals {
            games_played: cache.games_played,
            totals: cache.totals,
        })
        .unwrap_or_default();

    CacheDrift { cached, recomputed }
}
