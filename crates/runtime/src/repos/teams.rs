use huddle_core::{
    MembershipUpdate, NewMembership, NewTeam, Team, TeamId, TeamMembership, TeamUpdate, User,
    UserId,
};

use super::{Ctx, require};
use crate::error::{HuddleError, Result};

/// One active member joined with their account.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterEntry {
    pub membership: TeamMembership,
    pub user: User,
}

/// Teams and team memberships.
pub struct TeamsRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> TeamsRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn create_team(&self, new: NewTeam, created_by: &UserId) -> Result<Team> {
        require("name", &new.name)?;

        let now = self.ctx.now();
        let team = Team {
            id: self.ctx.next_id()?,
            name: new.name.trim().to_owned(),
            league: new.league,
            home_venue: new.home_venue,
            training_venue: new.training_venue,
            season: new.season,
            color: new.color,
            created_by: created_by.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tracing::info!("Created team '{}'", team.name);
        Ok(self.ctx.table::<Team>().insert(team)?)
    }

    pub fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>> {
        Ok(self.ctx.table::<Team>().get(id.as_str())?)
    }

    /// Active teams only.
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        Ok(self.ctx.table::<Team>().find(|t| t.is_active)?)
    }

    pub fn update_team(&self, id: &TeamId, update: TeamUpdate) -> Result<Team> {
        if let Some(name) = &update.name {
            require("name", name)?;
        }

        let now = self.ctx.now();
        self.ctx
            .table::<Team>()
            .update(id.as_str(), |team| team.apply(update, now))?
            .ok_or_else(|| HuddleError::not_found("team", id))
    }

    pub fn archive_team(&self, id: &TeamId) -> Result<Team> {
        let now = self.ctx.now();
        self.ctx
            .table::<Team>()
            .update(id.as_str(), |team| {
                team.is_active = false;
                team.updated_at = now;
            })?
            .ok_or_else(|| HuddleError::not_found("team", id))
    }

    /// Fails with `DuplicateMembership` while an active membership exists.
    pub fn add_member(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
        new: NewMembership,
    ) -> Result<TeamMembership> {
        let table = self.ctx.table::<TeamMembership>();
        let mut memberships = table.load()?;
        ensure_not_member(&memberships, team_id, user_id)?;

        let membership = TeamMembership {
            id: self.ctx.next_id()?,
            team_id: team_id.clone(),
            user_id: user_id.clone(),
            role: new.role,
            jersey_number: new.jersey_number,
            position: new.position,
            is_active: true,
            joined_at: self.ctx.now(),
            left_at: None,
        };
        memberships.push(membership.clone());
        table.save(&memberships)?;

        tracing::info!("User '{}' joined team '{}' as {}", user_id, team_id, membership.role);
        Ok(membership)
    }

    /// Whether `user_id` currently belongs to `team_id`.
    pub fn is_member(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool> {
        Ok(self.active_membership(team_id, user_id)?.is_some())
    }

    pub fn update_member(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
        update: MembershipUpdate,
    ) -> Result<TeamMembership> {
        let id = self.require_membership(team_id, user_id)?;
        self.ctx
            .table::<TeamMembership>()
            .update(id.as_str(), |m| {
                if let Some(role) = update.role {
                    m.role = role;
                }
                if update.jersey_number.is_some() {
                    m.jersey_number = update.jersey_number;
                }
                if update.position.is_some() {
                    m.position = update.position;
                }
            })?
            .ok_or_else(|| HuddleError::not_found("membership", &id))
    }

    /// Ends the active membership. The record stays for history.
    pub fn archive_member(&self, team_id: &TeamId, user_id: &UserId) -> Result<TeamMembership> {
        let id = self.require_membership(team_id, user_id)?;
        let now = self.ctx.now();
        self.ctx
            .table::<TeamMembership>()
            .update(id.as_str(), |m| {
                m.is_active = false;
                m.left_at = Some(now);
            })?
            .ok_or_else(|| HuddleError::not_found("membership", &id))
    }

    /// Active memberships of a team.
    pub fn list_members_for_team(&self, team_id: &TeamId) -> Result<Vec<TeamMembership>> {
        Ok(self
            .ctx
            .table::<TeamMembership>()
            .find(|m| m.is_active && &m.team_id == team_id)?)
    }

    /// Active teams the user actively belongs to.
    pub fn list_teams_for_user(&self, user_id: &UserId) -> Result<Vec<Team>> {
        let team_ids: Vec<TeamId> = self
            .ctx
            .table::<TeamMembership>()
            .find(|m| m.is_active && &m.user_id == user_id)?
            .into_iter()
            .map(|m| m.team_id)
            .collect();

        Ok(self
            .ctx
            .table::<Team>()
            .find(|t| t.is_active && team_ids.contains(&t.id))?)
    }

    /// Active members joined with their user records, by jersey number.
    pub fn roster_for_team(&self, team_id: &TeamId) -> Result<Vec<RosterEntry>> {
        let users = self.ctx.table::<User>().load()?;
        let mut roster: Vec<RosterEntry> = self
            .list_members_for_team(team_id)?
            .into_iter()
            .filter_map(|membership| {
                let user = users.iter().find(|u| u.id == membership.user_id)?.clone();
                Some(RosterEntry { membership, user })
            })
            .collect();

        roster.sort_by_key(|entry| {
            let jersey = entry.membership.jersey_number;
            (jersey.is_none(), jersey)
        });
        Ok(roster)
    }

    fn active_membership(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<Option<TeamMembership>> {
        Ok(self
            .ctx
            .table::<TeamMembership>()
            .find_one(|m| m.is_active_for(team_id, user_id))?)
    }

    fn require_membership(&self, team_id: &TeamId, user_id: &UserId) -> Result<String> {
        self.active_membership(team_id, user_id)?
            .map(|m| m.id.as_str().to_owned())
            .ok_or_else(|| HuddleError::not_found("membership", format!("{team_id}/{user_id}")))
    }
}

fn ensure_not_member(
    memberships: &[TeamMembership],
    team_id: &TeamId,
    user_id: &UserId,
) -> Result<()> {
    if memberships.iter().any(|m| m.is_active_for(team_id, user_id)) {
        return Err(HuddleError::DuplicateMembership {
            team_id: team_id.clone(),
            user_id: user_id.clone(),
        });
    }
    Ok(())
}
