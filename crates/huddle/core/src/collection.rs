//! Named collections and the entity contract.
//!
//! The record store persists flat lists of JSON objects under a collection
//! name. [`Collection`] is the closed set of names this data layer uses, and
//! [`Entity`] ties each record type to the collection that owns it.
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Every collection known to the data layer.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Users,
    Teams,
    TeamMemberships,
    PlayerProfiles,
    Events,
    GameConfirmations,
    Availability,
    GameStats,
    TeamGameStats,
    SeasonStats,
    TeamSeasonStats,
    Lineups,
    RegistrationKeys,
    Invitations,
    Notes,
    MessageReadStatus,
    /// Legacy per-game team rows, superseded by `team_game_stats`.
    TeamStats,
}

impl Collection {
    /// Collection name as stored.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A record type persisted in exactly one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    /// The record's id as stored in its `id` field.
    fn record_id(&self) -> &str;
}

macro_rules! impl_entity {
    ($ty:ty, $collection:ident) => {
        impl $crate::collection::Entity for $ty {
            const COLLECTION: $crate::collection::Collection =
                $crate::collection::Collection::$collection;

            #[inline]
            fn record_id(&self) -> &str {
                self.id.as_str()
            }
        }
    };
}

pub(crate) use impl_entity;
