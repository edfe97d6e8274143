//! The `Huddle` handle: one store, one clock, every repository.

use std::sync::Arc;

use huddle_core::{Clock, SystemClock};

use crate::migrations::{MigrationReport, MigrationRunner};
use crate::repos::{
    AvailabilityRepo, Ctx, EventsRepo, InvitationsRepo, KeysRepo, LineupsRepo, NotesRepo,
    ProfilesRepo, StatsRepo, TeamsRepo, UsersRepo,
};
use crate::store::RecordStore;

/// Entry point to the data layer.
///
/// Construct once per data directory and pass by reference. Opening runs
/// the standard migrations before any repository can be reached.
pub struct Huddle {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    migrations: MigrationReport,
}

impl Huddle {
    /// Open on the system clock.
    pub fn open(store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_migrations(store, clock, &MigrationRunner::standard())
    }

    pub fn with_migrations(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        runner: &MigrationRunner,
    ) -> Self {
        let migrations = runner.run(store.as_ref(), clock.now());
        if !migrations.is_clean() {
            tracing::warn!(
                "Opened with {} failed migration(s)",
                migrations.failures().count()
            );
        }

        Self {
            store,
            clock,
            migrations,
        }
    }

    /// What the migrations did when this handle was opened.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.migrations
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn ctx(&self) -> Ctx<'_> {
        Ctx {
            store: self.store.as_ref(),
            clock: self.clock.as_ref(),
        }
    }

    pub fn users(&self) -> UsersRepo<'_> {
        UsersRepo::new(self.ctx())
    }

    pub fn profiles(&self) -> ProfilesRepo<'_> {
        ProfilesRepo::new(self.ctx())
    }

    pub fn teams(&self) -> TeamsRepo<'_> {
        TeamsRepo::new(self.ctx())
    }

    pub fn events(&self) -> EventsRepo<'_> {
        EventsRepo::new(self.ctx())
    }

    pub fn availability(&self) -> AvailabilityRepo<'_> {
        AvailabilityRepo::new(self.ctx())
    }

    pub fn stats(&self) -> StatsRepo<'_> {
        StatsRepo::new(self.ctx())
    }

    pub fn lineups(&self) -> LineupsRepo<'_> {
        LineupsRepo::new(self.ctx())
    }

    pub fn keys(&self) -> KeysRepo<'_> {
        KeysRepo::new(self.ctx())
    }

    pub fn invitations(&self) -> InvitationsRepo<'_> {
        InvitationsRepo::new(self.ctx())
    }

    pub fn notes(&self) -> NotesRepo<'_> {
        NotesRepo::new(self.ctx())
    }
}
