use huddle_core::{
    Invitation, InvitationId, InvitationStatus, NewInvitation, NewMembership, TeamId,
    TeamMembership, UserId,
};

use super::{Ctx, TeamsRepo, expiry, generate_code, normalize_code, require};
use crate::error::{HuddleError, Result};

/// Single-use, emailed invitations to join a team.
pub struct InvitationsRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> InvitationsRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn create_invitation(
        &self,
        new: NewInvitation,
        invited_by: &UserId,
    ) -> Result<Invitation> {
        require("email", &new.email)?;
        if new.team_id.is_empty() {
            return Err(HuddleError::validation("team_id", "must not be empty"));
        }
        if new.valid_for <= chrono::Duration::zero() {
            return Err(HuddleError::validation("valid_for", "must be positive"));
        }

        let now = self.ctx.now();
        let expires_at = expiry(now, new.valid_for)?;

        let table = self.ctx.table::<Invitation>();
        let mut invitations = table.load()?;
        let taken: Vec<&str> = invitations.iter().map(|i| i.code.as_str()).collect();
        let code = generate_code(&taken);

        let invitation = Invitation {
            id: self.ctx.next_id()?,
            code,
            team_id: new.team_id,
            email: new.email.trim().to_owned(),
            role: new.role,
            status: InvitationStatus::Pending,
            invited_by: invited_by.clone(),
            expires_at,
            accepted_by: None,
            accepted_at: None,
            created_at: now,
        };
        invitations.push(invitation.clone());
        table.save(&invitations)?;

        Ok(invitation)
    }

    pub fn get_invitation_by_code(&self, code: &str) -> Result<Option<Invitation>> {
        let code = normalize_code(code);
        Ok(self
            .ctx
            .table::<Invitation>()
            .find_one(|i| i.code == code)?)
    }

    pub fn list_invitations_for_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>> {
        Ok(self
            .ctx
            .table::<Invitation>()
            .find(|i| &i.team_id == team_id)?)
    }

    /// Join the invitation's team. The invitation is spent on success.
    pub fn accept_invitation(&self, code: &str, user_id: &UserId) -> Result<TeamMembership> {
        let invalid = || HuddleError::InvalidOrExpiredKey {
            code: code.trim().to_owned(),
        };

        let now = self.ctx.now();
        let invitation = self
            .get_invitation_by_code(code)?
            .filter(|i| i.is_usable(now))
            .ok_or_else(invalid)?;

        let teams = TeamsRepo::new(self.ctx);
        if teams.is_member(&invitation.team_id, user_id)? {
            return Err(HuddleError::DuplicateMembership {
                team_id: invitation.team_id,
                user_id: user_id.clone(),
            });
        }

        self.ctx
            .table::<Invitation>()
            .update(invitation.id.as_str(), |i| i.accept(user_id.clone(), now))?
            .ok_or_else(invalid)?;

        teams.add_member(
            &invitation.team_id,
            user_id,
            NewMembership {
                role: invitation.role,
                ..NewMembership::default()
            },
        )
    }

    /// Withdraw a pending invitation.
    pub fn revoke_invitation(&self, id: &InvitationId) -> Result<Invitation> {
        let table = self.ctx.table::<Invitation>();
        let invitation = table
            .get(id.as_str())?
            .ok_or_else(|| HuddleError::not_found("invitation", id))?;

        match invitation.status {
            InvitationStatus::Pending => {}
            InvitationStatus::Accepted | InvitationStatus::Revoked => {
                return Err(HuddleError::StateConflict(format!(
                    "invitation '{id}' is already {}",
                    invitation.status
                )));
            }
        }

        table
            .update(id.as_str(), |i| i.status = InvitationStatus::Revoked)?
            .ok_or_else(|| HuddleError::not_found("invitation", id))
    }
}
