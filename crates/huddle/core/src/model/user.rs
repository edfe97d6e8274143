use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::collection::impl_entity;
use crate::ids::{ProfileId, UserId};
use crate::time::Timestamp;

/// Role a user holds, globally and within a team membership.
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
pub enum Role {
    #[default]
    Player,
    Coach,
    Manager,
    AssistantCoach,
    Parent,
}

impl Role {
    /// Coaching and management roles.
    pub fn is_staff(self) -> bool {
        match self {
            Role::Coach | Role::Manager | Role::AssistantCoach => true,
            Role::Player | Role::Parent => false,
        }
    }
}

/// Court position.
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
pub enum Position {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(User, Users);

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }
}

/// Registration input.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Placeholder credential digest: unsalted SHA-256, hex encoded.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub relationship: Option<String>,
}

/// Biometric extension of a [`User`]; at most one per user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    #[serde(default)]
    pub height_cm: Option<f32>,
    #[serde(default)]
    pub weight_kg: Option<f32>,
    #[serde(default)]
    pub wingspan_cm: Option<f32>,
    #[serde(default)]
    pub vertical_cm: Option<f32>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub preferred_position: Option<Position>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub medical_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(PlayerProfile, PlayerProfiles);

impl PlayerProfile {
    /// Empty profile for a user who has not filled anything in yet.
    pub fn empty(id: ProfileId, user_id: UserId, now: Timestamp) -> Self {
        Self {
            id,
            user_id,
            height_cm: None,
            weight_kg: None,
            wingspan_cm: None,
            vertical_cm: None,
            age: None,
            preferred_position: None,
            emergency_contact: None,
            medical_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every field the update carries.
    pub fn apply(&mut self, update: ProfileUpdate, now: Timestamp) {
        let ProfileUpdate {
            height_cm,
            weight_kg,
            wingspan_cm,
            vertical_cm,
            age,
            preferred_position,
            emergency_contact,
            medical_notes,
        } = update;

        if height_cm.is_some() {
            self.height_cm = height_cm;
        }
        if weight_kg.is_some() {
            self.weight_kg = weight_kg;
        }
        if wingspan_cm.is_some() {
            self.wingspan_cm = wingspan_cm;
        }
        if vertical_cm.is_some() {
            self.vertical_cm = vertical_cm;
        }
        if age.is_some() {
            self.age = age;
        }
        if preferred_position.is_some() {
            self.preferred_position = preferred_position;
        }
        if emergency_contact.is_some() {
            self.emergency_contact = emergency_contact;
        }
        if medical_notes.is_some() {
            self.medical_notes = medical_notes;
        }
        self.updated_at = now;
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub height_cm: Option<f32>,
    pub weight_kg: Option<f32>,
    pub wingspan_cm: Option<f32>,
    pub vertical_cm: Option<f32>,
    pub age: Option<u8>,
    pub preferred_position: Option<Position>,
    pub emergency_contact: Option<EmergencyContact>,
    pub medical_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn password_hash_is_stable_hex() {
        let digest = hash_password("hoops");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_password("hoops"));
        assert_ne!(digest, hash_password("Hoops"));
    }

    #[test]
    fn profile_update_keeps_unset_fields() {
        let now = Utc::now();
        let mut profile = PlayerProfile::empty("p1".into(), "u1".into(), now);
        profile.apply(
            ProfileUpdate {
                height_cm: Some(190.0),
                ..Default::default()
            },
            now,
        );
        profile.apply(
            ProfileUpdate {
                preferred_position: Some(Position::Center),
                ..Default::default()
            },
            now,
        );

        assert_eq!(profile.height_cm, Some(190.0));
        assert_eq!(profile.preferred_position, Some(Position::Center));
        assert_eq!(profile.age, None);
    }

    #[test]
    fn roles_round_trip_through_snake_case() {
        let json = serde_json::to_string(&Role::AssistantCoach).unwrap();
        assert_eq!(json, "\"assistant_coach\"");
        assert_eq!("assistant_coach".parse::<Role>().unwrap(), Role::AssistantCoach);
    }
}
