//! Typed record identifiers.
//!
//! Every persisted record carries an opaque string id handed out by the
//! record store. Wrapping each in its own newtype keeps a `TeamId` from being
//! passed where a `UserId` is expected; on disk they serialize as plain
//! strings.
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Identifier of a [`crate::User`].
    UserId
);
record_id!(
    /// Identifier of a [`crate::Team`].
    TeamId
);
record_id!(MembershipId);
record_id!(ProfileId);
record_id!(
    /// Identifier of a calendar [`crate::Event`]. Game stat rows refer to
    /// their game through this id.
    EventId
);
record_id!(ConfirmationId);
record_id!(AvailabilityId);
record_id!(GameStatId);
record_id!(TeamGameStatId);
record_id!(SeasonStatsId);
record_id!(TeamSeasonStatsId);
record_id!(LineupId);
record_id!(RegistrationKeyId);
record_id!(InvitationId);
record_id!(NoteId);
record_id!(ReadStatusId);
