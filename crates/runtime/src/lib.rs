//! Persistence and repositories for the Huddle team-management data layer.
//!
//! This crate stores the entity records defined in `huddle-core` and exposes
//! typed repositories over them. Consumers open one [`Huddle`] per data
//! directory and reach every repository through it.
//!
//! Modules are organized by responsibility:
//! - [`store`] defines the record store contract and its backends
//! - [`migrations`] rewrites legacy data shapes once, on open
//! - [`repos`] holds the typed repositories and the confirmation workflow
//! - [`error`] is the error taxonomy shared by every repository
pub mod error;
pub mod migrations;
pub mod repos;
pub mod store;

mod huddle;

pub use error::{HuddleError, Result};
pub use huddle::Huddle;
pub use migrations::{
    Migration, MigrationOutcome, MigrationReport, MigrationRunner, MigrationStatus,
};
pub use repos::{
    AvailabilityRepo, AvailabilitySummary, EventsRepo, GameStatsSubmission, InvitationsRepo,
    KeysRepo, LineupsRepo, NotesRepo, PlayerLine, ProfilesRepo, RosterEntry, StatsRepo,
    TeamsRepo, UsersRepo,
};
pub use store::{
    FileRecordStore, InMemoryRecordStore, Record, RecordStore, StoreError, SyncedStore, Table,
};
