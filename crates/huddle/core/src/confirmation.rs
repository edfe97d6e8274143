//! Game confirmation state machine.
//!
//! A game against another team is not on either calendar as a fixture until
//! the opponent answers:
//!
//! ```text
//!                       confirm
//! PendingConfirmation ──────────▶ Confirmed
//!          │
//!          │ decline
//!          ▼
//!       Declined  (event deleted)
//!
//! NoConfirmationNeeded            (practices, meetings, intra-team games)
//! ```
//!
//! Only `Confirmed` and `NoConfirmationNeeded` events accept game stats.
use thiserror::Error;

use crate::ids::TeamId;
use crate::model::{ConfirmationStatus, Event, EventType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConfirmationState {
    NoConfirmationNeeded,
    PendingConfirmation,
    Confirmed,
    Declined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConfirmationAction {
    Confirm,
    Decline,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot {action} a game in state {state}")]
pub struct TransitionError {
    pub state: ConfirmationState,
    pub action: ConfirmationAction,
}

impl ConfirmationState {
    /// State a freshly created event starts in.
    pub fn initial(event_type: EventType, opponent_team_id: Option<&TeamId>) -> Self {
        match (event_type, opponent_team_id) {
            (EventType::Game, Some(_)) => ConfirmationState::PendingConfirmation,
            (EventType::Game, None)
            | (EventType::Practice | EventType::Meeting | EventType::Other, _) => {
                ConfirmationState::NoConfirmationNeeded
            }
        }
    }

    /// Reads the state back from a stored event.
    ///
    /// Declined games are deleted, so an existing event is never `Declined`.
    pub fn of_event(event: &Event) -> Self {
        if !event.requires_confirmation() {
            return ConfirmationState::NoConfirmationNeeded;
        }
        if event.is_confirmed && !event.pending_confirmation {
            ConfirmationState::Confirmed
        } else {
            ConfirmationState::PendingConfirmation
        }
    }

    pub fn apply(self, action: ConfirmationAction) -> Result<Self, TransitionError> {
        match (self, action) {
            (ConfirmationState::PendingConfirmation, ConfirmationAction::Confirm) => {
                Ok(ConfirmationState::Confirmed)
            }
            (ConfirmationState::PendingConfirmation, ConfirmationAction::Decline) => {
                Ok(ConfirmationState::Declined)
            }
            (
                ConfirmationState::NoConfirmationNeeded
                | ConfirmationState::Confirmed
                | ConfirmationState::Declined,
                action,
            ) => Err(TransitionError {
                state: self,
                action,
            }),
        }
    }

    /// Whether game stats may be written for an event in this state.
    pub fn accepts_stats(self) -> bool {
        match self {
            ConfirmationState::NoConfirmationNeeded | ConfirmationState::Confirmed => true,
            ConfirmationState::PendingConfirmation | ConfirmationState::Declined => false,
        }
    }
}

impl From<ConfirmationStatus> for ConfirmationState {
    fn from(status: ConfirmationStatus) -> Self {
        match status {
            ConfirmationStatus::Pending => ConfirmationState::PendingConfirmation,
            ConfirmationStatus::Confirmed => ConfirmationState::Confirmed,
            ConfirmationStatus::Declined => ConfirmationState::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_games_with_opponents_start_pending() {
        let opponent = TeamId::new("rivals");
        assert_eq!(
            ConfirmationState::initial(EventType::Game, Some(&opponent)),
            ConfirmationState::PendingConfirmation
        );
        assert_eq!(
            ConfirmationState::initial(EventType::Game, None),
            ConfirmationState::NoConfirmationNeeded
        );
        assert_eq!(
            ConfirmationState::initial(EventType::Practice, Some(&opponent)),
            ConfirmationState::NoConfirmationNeeded
        );
    }

    #[test]
    fn pending_moves_to_confirmed_or_declined() {
        let pending = ConfirmationState::PendingConfirmation;
        assert_eq!(
            pending.apply(ConfirmationAction::Confirm),
            Ok(ConfirmationState::Confirmed)
        );
        assert_eq!(
            pending.apply(ConfirmationAction::Decline),
            Ok(ConfirmationState::Declined)
        );
    }

    #[test]
    fn settled_states_reject_every_action() {
        for state in [
            ConfirmationState::NoConfirmationNeeded,
            ConfirmationState::Confirmed,
            ConfirmationState::Declined,
        ] {
            for action in [ConfirmationAction::Confirm, ConfirmationAction::Decline] {
                assert_eq!(state.apply(action), Err(TransitionError { state, action }));
            }
        }
    }

    #[test]
    fn stats_gate() {
        assert!(ConfirmationState::Confirmed.accepts_stats());
        assert!(ConfirmationState::NoConfirmationNeeded.accepts_stats());
        assert!(!ConfirmationState::PendingConfirmation.accepts_stats());
        assert!(!ConfirmationState::Declined.accepts_stats());
    }
}
