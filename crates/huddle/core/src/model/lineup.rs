use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::impl_entity;
use crate::ids::{LineupId, TeamId, UserId};
use crate::time::Timestamp;

/// Players on the floor at once.
pub const MAX_LINEUP_SIZE: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LineupError {
    #[error("lineup already has {} players", MAX_LINEUP_SIZE)]
    Full,

    #[error("player {0} is already in the lineup")]
    DuplicatePlayer(UserId),
}

/// Named, ordered selection of up to five players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    pub id: LineupId,
    pub team_id: TeamId,
    pub name: String,
    pub selected_players: ArrayVec<UserId, MAX_LINEUP_SIZE>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(Lineup, Lineups);

impl Lineup {
    /// Builds the player list, rejecting overflow and repeats.
    pub fn players_from<I>(players: I) -> Result<ArrayVec<UserId, MAX_LINEUP_SIZE>, LineupError>
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut selected = ArrayVec::new();
        for player in players {
            push_player(&mut selected, player)?;
        }
        Ok(selected)
    }

    /// Appends a player. The lineup is left untouched on error.
    pub fn try_add(&mut self, player: UserId) -> Result<(), LineupError> {
        push_player(&mut self.selected_players, player)
    }

    /// Returns false when the player was not selected.
    pub fn remove(&mut self, player: &UserId) -> bool {
        match self.selected_players.iter().position(|p| p == player) {
            Some(index) => {
                self.selected_players.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.selected_players.is_full()
    }
}

fn push_player(
    selected: &mut ArrayVec<UserId, MAX_LINEUP_SIZE>,
    player: UserId,
) -> Result<(), LineupError> {
    if selected.contains(&player) {
        return Err(LineupError::DuplicatePlayer(player));
    }
    selected.try_push(player).map_err(|_| LineupError::Full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lineup_of(n: usize) -> Lineup {
        let now = Utc::now();
        Lineup {
            id: "l1".into(),
            team_id: "t1".into(),
            name: "Starters".into(),
            selected_players: Lineup::players_from((0..n).map(|i| UserId::new(format!("p{i}"))))
                .unwrap(),
            created_by: "coach".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sixth_player_is_rejected() {
        let mut lineup = lineup_of(5);
        assert_eq!(lineup.try_add("p9".into()), Err(LineupError::Full));
        assert_eq!(lineup.selected_players.len(), MAX_LINEUP_SIZE);
    }

    #[test]
    fn repeated_player_is_rejected() {
        let mut lineup = lineup_of(2);
        assert_eq!(
            lineup.try_add("p1".into()),
            Err(LineupError::DuplicatePlayer("p1".into()))
        );
        assert_eq!(lineup.selected_players.len(), 2);
    }

    #[test]
    fn oversized_lineup_fails_to_deserialize() {
        let mut value = serde_json::to_value(lineup_of(5)).unwrap();
        value["selected_players"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!("p6"));
        assert!(serde_json::from_value::<Lineup>(value).is_err());
    }

    #[test]
    fn remove_preserves_order() {
        let mut lineup = lineup_of(4);
        assert!(lineup.remove(&"p1".into()));
        assert!(!lineup.remove(&"p1".into()));
        let ids: Vec<&str> = lineup.selected_players.iter().map(UserId::as_str).collect();
        assert_eq!(ids, ["p0", "p2", "p3"]);
    }
}
