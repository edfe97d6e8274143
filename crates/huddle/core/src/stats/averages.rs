use serde::{Deserialize, Serialize};

use crate::model::{GameStat, StatLine, TeamSeasonStats};
use crate::stats::totals::season_totals;

/// Per-game averages and shooting percentages.
///
/// Per-game values are rounded to one decimal; percentages are expressed in
/// percent and rounded to 0.1%. Division by zero yields `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub ppg: f64,
    pub apg: f64,
    pub rpg: f64,
    pub spg: f64,
    pub bpg: f64,
    pub tpg: f64,
    pub mpg: f64,
    pub fpg: f64,
    pub fg_pct: f64,
    pub ft_pct: f64,
    pub three_pct: f64,
}

impl Averages {
    pub fn from_totals(totals: &StatLine, games_played: u32) -> Self {
        if games_played == 0 {
            return Self::default();
        }

        let games = f64::from(games_played);
        let per_game = |value: u32| round_tenth(f64::from(value) / games);

        Self {
            ppg: per_game(totals.points),
            apg: per_game(totals.assists),
            rpg: per_game(totals.rebounds),
            spg: per_game(totals.steals),
            bpg: per_game(totals.blocks),
            tpg: per_game(totals.turnovers),
            mpg: per_game(totals.minutes),
            fpg: per_game(totals.fouls),
            fg_pct: percentage(totals.fg_made, totals.fg_attempted),
            ft_pct: percentage(totals.ft_made, totals.ft_attempted),
            three_pct: percentage(totals.three_made, totals.three_attempted),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Mean of every row given. Callers pass one player's rows.
pub fn player_averages<'a, I>(rows: I) -> Averages
where
    I: IntoIterator<Item = &'a GameStat>,
{
    let totals = season_totals(rows);
    Averages::from_totals(&totals.totals, totals.games_played)
}

/// Team averages read from the cumulative cache rather than game rows.
///
/// The cache is incremented on every save and never reconciled, so these
/// numbers drift from a recomputation whenever a game is saved twice or a
/// save fails halfway. See [`crate::stats::team_cache_drift`].
pub fn team_season_averages(cache: Option<&TeamSeasonStats>) -> Averages {
    match cache {
        Some(cache) => Averages::from_totals(&cache.totals, cache.games_played),
        None => Averages::default(),
    }
}

fn percentage(made: u32, attempted: u32) -> f64 {
    if attempted == 0 {
        return 0.0;
    }
    round_tenth(f64::from(made) / f64::from(attempted) * 100.0)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(line: StatLine) -> GameStat {
        GameStat {
            id: "r".into(),
            game_id: "g".into(),
            team_id: "t".into(),
            player_id: "p".into(),
            line,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_games_yield_zero_averages() {
        let averages = player_averages(std::iter::empty());
        assert!(averages.is_zero());
        assert!(!averages.ppg.is_nan());
        assert!(!averages.fg_pct.is_nan());
    }

    #[test]
    fn averages_round_to_one_decimal() {
        let rows = [
            row(StatLine {
                points: 10,
                fg_made: 4,
                fg_attempted: 10,
                ..Default::default()
            }),
            row(StatLine {
                points: 15,
                fg_made: 6,
                fg_attempted: 11,
                ..Default::default()
            }),
            row(StatLine {
                points: 12,
                fg_made: 3,
                fg_attempted: 8,
                ..Default::default()
            }),
        ];

        let averages = player_averages(&rows);
        assert_eq!(averages.ppg, 12.3);
        // 13 / 29 = 44.83%
        assert_eq!(averages.fg_pct, 44.8);
    }

    #[test]
    fn zero_attempts_give_zero_percentage() {
        let rows = [row(StatLine {
            points: 4,
            ft_made: 0,
            ft_attempted: 0,
            ..Default::default()
        })];
        let averages = player_averages(&rows);
        assert_eq!(averages.ft_pct, 0.0);
        assert_eq!(averages.three_pct, 0.0);
        assert_eq!(averages.ppg, 4.0);
    }

    #[test]
    fn missing_team_cache_is_zero() {
        assert!(team_season_averages(None).is_zero());
    }
}
