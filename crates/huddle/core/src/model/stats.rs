use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::collection::impl_entity;
use crate::ids::{
    EventId, GameStatId, SeasonStatsId, TeamGameStatId, TeamId, TeamSeasonStatsId, UserId,
};
use crate::time::Timestamp;

/// Raw counting stats for one player in one game, or a sum of those.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLine {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub minutes: u32,
    pub fg_made: u32,
    pub fg_attempted: u32,
    pub three_made: u32,
    pub three_attempted: u32,
    pub ft_made: u32,
    pub ft_attempted: u32,
}

impl StatLine {
    /// Made shots never exceed attempts.
    pub fn shooting_is_consistent(&self) -> bool {
        self.fg_made <= self.fg_attempted
            && self.three_made <= self.three_attempted
            && self.ft_made <= self.ft_attempted
            && self.three_made <= self.fg_made
    }

    /// Field-by-field sum, or `None` if any field overflows.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(StatLine {
            points: self.points.checked_add(rhs.points)?,
            rebounds: self.rebounds.checked_add(rhs.rebounds)?,
            assists: self.assists.checked_add(rhs.assists)?,
            steals: self.steals.checked_add(rhs.steals)?,
            blocks: self.blocks.checked_add(rhs.blocks)?,
            turnovers: self.turnovers.checked_add(rhs.turnovers)?,
            fouls: self.fouls.checked_add(rhs.fouls)?,
            minutes: self.minutes.checked_add(rhs.minutes)?,
            fg_made: self.fg_made.checked_add(rhs.fg_made)?,
            fg_attempted: self.fg_attempted.checked_add(rhs.fg_attempted)?,
            three_made: self.three_made.checked_add(rhs.three_made)?,
            three_attempted: self.three_attempted.checked_add(rhs.three_attempted)?,
            ft_made: self.ft_made.checked_add(rhs.ft_made)?,
            ft_attempted: self.ft_attempted.checked_add(rhs.ft_attempted)?,
        })
    }
}

/// Saturates at `u32::MAX`; use [`StatLine::checked_add`] where overflow
/// must be reported.
impl AddAssign for StatLine {
    fn add_assign(&mut self, rhs: Self) {
        self.points = self.points.saturating_add(rhs.points);
        self.rebounds = self.rebounds.saturating_add(rhs.rebounds);
        self.assists = self.assists.saturating_add(rhs.assists);
        self.steals = self.steals.saturating_add(rhs.steals);
        self.blocks = self.blocks.saturating_add(rhs.blocks);
        self.turnovers = self.turnovers.saturating_add(rhs.turnovers);
        self.fouls = self.fouls.saturating_add(rhs.fouls);
        self.minutes = self.minutes.saturating_add(rhs.minutes);
        self.fg_made = self.fg_made.saturating_add(rhs.fg_made);
        self.fg_attempted = self.fg_attempted.saturating_add(rhs.fg_attempted);
        self.three_made = self.three_made.saturating_add(rhs.three_made);
        self.three_attempted = self.three_attempted.saturating_add(rhs.three_attempted);
        self.ft_made = self.ft_made.saturating_add(rhs.ft_made);
        self.ft_attempted = self.ft_attempted.saturating_add(rhs.ft_attempted);
    }
}

impl Add for StatLine {
    type Output = StatLine;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl<'a> std::iter::Sum<&'a StatLine> for StatLine {
    fn sum<I: Iterator<Item = &'a StatLine>>(iter: I) -> Self {
        iter.fold(StatLine::default(), |acc, line| acc + *line)
    }
}

/// One player's line in one game. Source of truth for every aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStat {
    pub id: GameStatId,
    pub game_id: EventId,
    pub team_id: TeamId,
    pub player_id: UserId,
    #[serde(flatten)]
    pub line: StatLine,
    pub created_at: Timestamp,
}

impl_entity!(GameStat, GameStats);

/// Final score of one game from one team's side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGameStat {
    pub id: TeamGameStatId,
    pub game_id: EventId,
    pub team_id: TeamId,
    pub points_for: u32,
    #[serde(default)]
    pub points_against: Option<u32>,
    pub created_at: Timestamp,
}

impl_entity!(TeamGameStat, TeamGameStats);

/// Running per-player totals, bumped on every stats save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub id: SeasonStatsId,
    pub player_id: UserId,
    pub games_played: u32,
    #[serde(flatten)]
    pub totals: StatLine,
    pub updated_at: Timestamp,
}

impl_entity!(SeasonStats, SeasonStats);

/// Running per-team totals, bumped on every stats save.
///
/// This is a cache: it is only ever incremented, so re-saving a game counts
/// it twice. Game stat rows remain authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub id: TeamSeasonStatsId,
    pub team_id: TeamId,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_against: u32,
    #[serde(flatten)]
    pub totals: StatLine,
    pub updated_at: Timestamp,
}

impl_entity!(TeamSeasonStats, TeamSeasonStats);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_lines_sum_field_by_field() {
        let a = StatLine {
            points: 10,
            fg_made: 4,
            fg_attempted: 9,
            ..Default::default()
        };
        let b = StatLine {
            points: 7,
            rebounds: 5,
            fg_made: 3,
            fg_attempted: 6,
            ..Default::default()
        };

        let total: StatLine = [a, b].iter().sum();
        assert_eq!(total.points, 17);
        assert_eq!(total.rebounds, 5);
        assert_eq!(total.fg_attempted, 15);
    }

    #[test]
    fn game_stat_line_is_flattened_on_disk() {
        let row = GameStat {
            id: "1".into(),
            game_id: "g".into(),
            team_id: "t".into(),
            player_id: "p".into(),
            line: StatLine {
                points: 12,
                ..Default::default()
            },
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["points"], 12);
        assert!(value.get("line").is_none());
    }

    #[test]
    fn made_cannot_exceed_attempted() {
        let line = StatLine {
            ft_made: 3,
            ft_attempted: 2,
            ..Default::default()
        };
        assert!(!line.shooting_is_consistent());
    }

    #[test]
    fn checked_add_reports_overflow_and_plain_add_saturates() {
        let big = StatLine {
            points: u32::MAX,
            ..Default::default()
        };
        let one = StatLine {
            points: 1,
            rebounds: 1,
            ..Default::default()
        };

        assert_eq!(big.checked_add(one), None);
        assert_eq!(one.checked_add(one).map(|line| line.points), Some(2));
        let total = big + one;
        assert_eq!(total.points, u32::MAX);
        assert_eq!(total.rebounds, 1);
    }
}
