//! Domain types and pure rules for the Huddle team-management data layer.
//!
//! `huddle-core` defines the canonical entity records persisted by the
//! runtime, the closed enumerations that replace free-form status strings,
//! the game confirmation state machine, and the aggregation engine that
//! derives averages and totals from raw per-game stat rows.
//!
//! Nothing in this crate touches storage. The runtime crate owns the record
//! store and repositories and depends on the types re-exported here.
pub mod collection;
pub mod confirmation;
pub mod ids;
pub mod model;
pub mod stats;
pub mod time;

pub use collection::{Collection, Entity};
pub use confirmation::{ConfirmationAction, ConfirmationState, TransitionError};
pub use ids::{
    AvailabilityId, ConfirmationId, EventId, GameStatId, InvitationId, LineupId, MembershipId,
    NoteId, ProfileId, ReadStatusId, RegistrationKeyId, SeasonStatsId, TeamGameStatId, TeamId,
    TeamSeasonStatsId, UserId,
};
pub use model::{
    Availability, AvailabilityStatus, ConfirmationStatus, EmergencyContact, Event, EventType,
    EventUpdate, GameConfirmation, GameDetails, GameStat, Invitation, InvitationStatus, Lineup,
    LineupError, MAX_LINEUP_SIZE, MembershipUpdate, MessageReadStatus, NewEvent, NewInvitation,
    NewMembership, NewNote, NewRegistrationKey, NewTeam, NewUser, Note, NoteType, PlayerProfile,
    Position, ProfileUpdate, RegistrationKey, Role, SeasonStats, StatLine, Team, TeamGameStat,
    TeamMembership, TeamSeasonStats, TeamUpdate, User, UserUpdate, hash_password,
};
pub use stats::{
    Averages, CacheDrift, SeasonTotals, efficiency, overall_rating, player_averages,
    season_totals, suggest_lineup, team_cache_drift, team_season_averages,
};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};
