use serde::{Deserialize, Serialize};

use crate::collection::impl_entity;
use crate::ids::{AvailabilityId, ConfirmationId, EventId, TeamId, UserId};
use crate::time::Timestamp;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventType {
    #[default]
    Practice,
    Game,
    Meeting,
    Other,
}

/// Calendar entry owned by `team_id`.
///
/// Games against another team start out unconfirmed (`pending_confirmation`)
/// until the opponent acts on the matching [`GameConfirmation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub team_id: TeamId,
    #[serde(default)]
    pub opponent_team_id: Option<TeamId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: Timestamp,
    #[serde(default)]
    pub location: Option<String>,
    pub event_type: EventType,
    pub is_confirmed: bool,
    pub pending_confirmation: bool,
    pub confirmed_by: Option<UserId>,
    pub confirmed_at: Option<Timestamp>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(Event, Events);

impl Event {
    /// Games against another team need the opponent's confirmation.
    pub fn requires_confirmation(&self) -> bool {
        self.event_type == EventType::Game && self.opponent_team_id.is_some()
    }

    /// True when `team_id` hosts this event or is the opponent in it.
    pub fn involves(&self, team_id: &TeamId) -> bool {
        &self.team_id == team_id || self.opponent_team_id.as_ref() == Some(team_id)
    }

    pub fn mark_confirmed(&mut self, by: UserId, at: Timestamp) {
        self.is_confirmed = true;
        self.pending_confirmation = false;
        self.confirmed_by = Some(by);
        self.confirmed_at = Some(at);
        self.updated_at = at;
    }

    pub fn apply(&mut self, update: EventUpdate, now: Timestamp) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(event_date) = update.event_date {
            self.event_date = event_date;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
        self.updated_at = now;
    }
}

/// Input for creating an event.
///
/// Required fields are modelled loosely so that missing values surface as
/// validation errors rather than construction panics.
#[derive(Clone, Debug, Default)]
pub struct NewEvent {
    pub team_id: TeamId,
    pub opponent_team_id: Option<TeamId>,
    pub title: String,
    pub description: Option<String>,
    pub event_date: Option<Timestamp>,
    pub location: Option<String>,
    pub event_type: EventType,
}

/// Editable event details. Team, opponent and type are fixed at creation.
#[derive(Clone, Debug, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<Timestamp>,
    pub location: Option<String>,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Declined,
}

/// Snapshot of the game as it looked when confirmation was requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub title: String,
    pub event_date: Timestamp,
    #[serde(default)]
    pub location: Option<String>,
}

/// Log of a cross-team game request and who answered it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfirmation {
    pub id: ConfirmationId,
    pub game_id: EventId,
    pub requesting_team_id: TeamId,
    pub target_team_id: TeamId,
    pub status: ConfirmationStatus,
    pub game_details: GameDetails,
    pub requested_by: UserId,
    #[serde(default)]
    pub responded_by: Option<UserId>,
    #[serde(default)]
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl_entity!(GameConfirmation, GameConfirmations);

impl GameConfirmation {
    pub fn respond(&mut self, status: ConfirmationStatus, by: UserId, at: Timestamp) {
        self.status = status;
        self.responded_by = Some(by);
        self.responded_at = Some(at);
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AvailabilityStatus {
    Available,
    Maybe,
    Unavailable,
}

/// A user's answer for one event. One record per (event, user).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: AvailabilityId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: AvailabilityStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub updated_at: Timestamp,
}

impl_entity!(Availability, Availability);
