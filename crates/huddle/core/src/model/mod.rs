//! Canonical entity records.
//!
//! One struct per persisted entity. Relationships are plain id fields that
//! repositories resolve at read time; no record holds a reference to another.
mod access;
mod event;
mod lineup;
mod note;
mod stats;
mod team;
mod user;

pub use access::{
    Invitation, InvitationStatus, NewInvitation, NewRegistrationKey, RegistrationKey,
};
pub use event::{
    Availability, AvailabilityStatus, ConfirmationStatus, Event, EventType, EventUpdate,
    GameConfirmation, GameDetails, NewEvent,
};
pub use lineup::{Lineup, LineupError, MAX_LINEUP_SIZE};
pub use note::{MessageReadStatus, NewNote, Note, NoteType};
pub use stats::{GameStat, SeasonStats, StatLine, TeamGameStat, TeamSeasonStats};
pub use team::{MembershipUpdate, NewMembership, NewTeam, Team, TeamMembership, TeamUpdate};
pub use user::{
    EmergencyContact, NewUser, PlayerProfile, Position, ProfileUpdate, Role, User, UserUpdate,
    hash_password,
};
