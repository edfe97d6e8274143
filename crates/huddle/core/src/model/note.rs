use serde::{Deserialize, Serialize};

use crate::collection::impl_entity;
use crate::ids::{NoteId, ReadStatusId, TeamId, UserId};
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
pub enum NoteType {
    #[default]
    General,
    Coaching,
    Medical,
    Message,
    Announcement,
}

/// Directed message from one user to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub author_id: UserId,
    pub recipient_id: UserId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub content: String,
    pub note_type: NoteType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(Note, Notes);

impl Note {
    /// True for notes exchanged between `a` and `b` in either direction.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.author_id == a && &self.recipient_id == b)
            || (&self.author_id == b && &self.recipient_id == a)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewNote {
    pub author_id: UserId,
    pub recipient_id: UserId,
    pub team_id: Option<TeamId>,
    pub content: String,
    pub note_type: NoteType,
}

/// Marks a note as read by one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReadStatus {
    pub id: ReadStatusId,
    pub note_id: NoteId,
    pub user_id: UserId,
    pub read_at: Timestamp,
}

impl_entity!(MessageReadStatus, MessageReadStatus);
