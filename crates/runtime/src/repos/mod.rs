//! Typed repositories over the record store.
//!
//! Each repository borrows the store and clock of a [`crate::Huddle`] and
//! reads or writes whole collections through [`Table`]. Query methods return
//! `Option`, empty lists, or zero aggregates when there is no data; only
//! writes that target a specific id raise [`crate::HuddleError::NotFound`].

mod availability;
mod events;
mod invitations;
mod keys;
mod lineups;
mod notes;
mod profiles;
mod stats;
mod teams;
mod users;

use huddle_core::{Clock, Entity, Timestamp};
use rand::Rng;

use crate::error::Result;
use crate::store::{RecordStore, Table};

pub use availability::{AvailabilityRepo, AvailabilitySummary};
pub use events::EventsRepo;
pub use invitations::InvitationsRepo;
pub use keys::KeysRepo;
pub use lineups::LineupsRepo;
pub use notes::NotesRepo;
pub use profiles::ProfilesRepo;
pub use stats::{GameStatsSubmission, PlayerLine, StatsRepo};
pub use teams::{RosterEntry, TeamsRepo};
pub use users::UsersRepo;

/// Store and clock shared by every repository.
#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub store: &'a dyn RecordStore,
    pub clock: &'a dyn Clock,
}

impl<'a> Ctx<'a> {
    pub fn table<T: Entity>(&self) -> Table<'a, T> {
        Table::new(self.store)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn next_id<I: From<String>>(&self) -> Result<I> {
        Ok(I::from(self.store.next_id()?))
    }
}

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 8;

/// Random uppercase alphanumeric code not present in `taken`.
pub(crate) fn generate_code(taken: &[&str]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (0..CODE_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect();
        if !taken.contains(&code.as_str()) {
            return code;
        }
    }
}

/// Codes are compared without regard to case or surrounding whitespace.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Reject blank required text.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(crate::HuddleError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// `now + valid_for`, rejecting lifetimes past the representable range.
pub(crate) fn expiry(now: Timestamp, valid_for: chrono::Duration) -> Result<Timestamp> {
    now.checked_add_signed(valid_for)
        .ok_or_else(|| crate::HuddleError::validation("valid_for", "is too far in the future"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_eight_uppercase_alphanumerics() {
        let code = generate_code(&[]);
        assert_eq!(code.len(), CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn codes_are_normalized() {
        assert_eq!(normalize_code("  ab12cd34 "), "AB12CD34");
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(require("title", "  ").is_err());
        assert!(require("title", "Practice").is_ok());
    }

    #[test]
    fn expiry_rejects_unrepresentable_lifetimes() {
        let now = chrono::Utc::now();
        assert_eq!(
            expiry(now, chrono::Duration::days(7)).unwrap(),
            now + chrono::Duration::days(7)
        );
        assert!(expiry(now, chrono::Duration::MAX).is_err());
    }
}
