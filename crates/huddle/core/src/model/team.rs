use serde::{Deserialize, Serialize};

use crate::collection::impl_entity;
use crate::ids::{MembershipId, TeamId, UserId};
use crate::model::user::{Position, Role};
use crate::time::Timestamp;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub home_venue: Option<String>,
    #[serde(default)]
    pub training_venue: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub created_by: UserId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_entity!(Team, Teams);

#[derive(Clone, Debug, Default)]
pub struct NewTeam {
    pub name: String,
    pub league: Option<String>,
    pub home_venue: Option<String>,
    pub training_venue: Option<String>,
    pub season: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub league: Option<String>,
    pub home_venue: Option<String>,
    pub training_venue: Option<String>,
    pub season: Option<String>,
    pub color: Option<String>,
}

impl Team {
    pub fn apply(&mut self, update: TeamUpdate, now: Timestamp) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if update.league.is_some() {
            self.league = update.league;
        }
        if update.home_venue.is_some() {
            self.home_venue = update.home_venue;
        }
        if update.training_venue.is_some() {
            self.training_venue = update.training_venue;
        }
        if update.season.is_some() {
            self.season = update.season;
        }
        if update.color.is_some() {
            self.color = update.color;
        }
        self.updated_at = now;
    }
}

/// Join record between a team and a user.
///
/// Archived memberships (`is_active == false`) are kept for history and do
/// not block the same user from joining again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub id: MembershipId,
    pub team_id: TeamId,
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub jersey_number: Option<u8>,
    #[serde(default)]
    pub position: Option<Position>,
    pub is_active: bool,
    pub joined_at: Timestamp,
    #[serde(default)]
    pub left_at: Option<Timestamp>,
}

impl_entity!(TeamMembership, TeamMemberships);

impl TeamMembership {
    pub fn is_active_for(&self, team_id: &TeamId, user_id: &UserId) -> bool {
        self.is_active && &self.team_id == team_id && &self.user_id == user_id
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewMembership {
    pub role: Role,
    pub jersey_number: Option<u8>,
    pub position: Option<Position>,
}

#[derive(Clone, Debug, Default)]
pub struct MembershipUpdate {
    pub role: Option<Role>,
    pub jersey_number: Option<u8>,
    pub position: Option<Position>,
}
