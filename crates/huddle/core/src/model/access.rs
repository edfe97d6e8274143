use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::collection::impl_entity;
use crate::ids::{InvitationId, RegistrationKeyId, TeamId, UserId};
use crate::model::user::Role;
use crate::time::Timestamp;

/// Shareable code granting a team role, limited in uses and time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationKey {
    pub id: RegistrationKeyId,
    pub code: String,
    pub team_id: TeamId,
    pub role: Role,
    pub max_uses: u32,
    pub uses_remaining: u32,
    pub expires_at: Timestamp,
    pub is_active: bool,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl_entity!(RegistrationKey, RegistrationKeys);

impl RegistrationKey {
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.is_active && self.uses_remaining > 0 && now < self.expires_at
    }

    /// Spends one use, deactivating the key when none remain.
    pub fn consume_use(&mut self) {
        self.uses_remaining = self.uses_remaining.saturating_sub(1);
        if self.uses_remaining == 0 {
            self.is_active = false;
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewRegistrationKey {
    pub team_id: TeamId,
    pub role: Role,
    pub max_uses: u32,
    pub valid_for: Duration,
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
pub enum InvitationStatus {
    Pending,
    Accepted,
    Revoked,
}

/// Single-use invitation addressed to an email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub code: String,
    pub team_id: TeamId,
    pub email: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub invited_by: UserId,
    pub expires_at: Timestamp,
    #[serde(default)]
    pub accepted_by: Option<UserId>,
    #[serde(default)]
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl_entity!(Invitation, Invitations);

impl Invitation {
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.status == InvitationStatus::Pending && now < self.expires_at
    }

    pub fn accept(&mut self, by: UserId, at: Timestamp) {
        self.status = InvitationStatus::Accepted;
        self.accepted_by = Some(by);
        self.accepted_at = Some(at);
    }
}

#[derive(Clone, Debug)]
pub struct NewInvitation {
    pub team_id: TeamId,
    pub email: String,
    pub role: Role,
    pub valid_for: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn key(uses: u32) -> RegistrationKey {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RegistrationKey {
            id: "k".into(),
            code: "ABCD2345".into(),
            team_id: "t".into(),
            role: Role::Player,
            max_uses: uses,
            uses_remaining: uses,
            expires_at: now + Duration::days(7),
            is_active: true,
            created_by: "c".into(),
            created_at: now,
        }
    }

    #[test]
    fn last_use_deactivates_key() {
        let mut key = key(1);
        assert!(key.is_usable(key.created_at));

        key.consume_use();
        assert_eq!(key.uses_remaining, 0);
        assert!(!key.is_active);
        assert!(!key.is_usable(key.created_at));
    }

    #[test]
    fn key_expires_at_deadline() {
        let key = key(3);
        assert!(key.is_usable(key.expires_at - Duration::seconds(1)));
        assert!(!key.is_usable(key.expires_at));
    }
}
