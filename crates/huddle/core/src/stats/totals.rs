use serde::{Deserialize, Serialize};

use crate::model::{GameStat, StatLine};

/// Summed stat line over a number of games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTotals {
    pub games_played: u32,
    pub totals: StatLine,
}

/// Sums rows as given; each row counts as one game played.
pub fn season_totals<'a, I>(rows: I) -> SeasonTotals
where
    I: IntoIterator<Item = &'a GameStat>,
{
    rows.into_iter()
        .fold(SeasonTotals::default(), |mut acc, row| {
            acc.games_played += 1;
            acc.totals += row.line;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn no_rows_is_zero() {
        let totals = season_totals(std::iter::empty());
        assert_eq!(totals, SeasonTotals::default());
    }

    #[test]
    fn counts_one_game_per_row() {
        let row = |points| GameStat {
            id: "r".into(),
            game_id: "g".into(),
            team_id: "t".into(),
            player_id: "p".into(),
            line: StatLine {
                points,
                ..Default::default()
            },
            created_at: Utc::now(),
        };
        let rows = [row(10), row(14), row(3)];
        let totals = season_totals(&rows);
        assert_eq!(totals.games_played, 3);
        assert_eq!(totals.totals.points, 27);
    }
}
