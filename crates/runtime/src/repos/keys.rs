use huddle_core::{
    NewMembership, NewRegistrationKey, RegistrationKey, RegistrationKeyId, TeamId, TeamMembership,
    UserId,
};

use super::{Ctx, TeamsRepo, expiry, generate_code, normalize_code};
use crate::error::{HuddleError, Result};

/// Shareable registration codes that add users to a team.
///
/// Validation and redemption are separate reads of the key collection, so
/// two sessions redeeming the last use at the same moment can both succeed.
pub struct KeysRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> KeysRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn create_key(
        &self,
        new: NewRegistrationKey,
        created_by: &UserId,
    ) -> Result<RegistrationKey> {
        if new.team_id.is_empty() {
            return Err(HuddleError::validation("team_id", "must not be empty"));
        }
        if new.max_uses == 0 {
            return Err(HuddleError::validation("max_uses", "must be at least 1"));
        }
        if new.valid_for <= chrono::Duration::zero() {
            return Err(HuddleError::validation("valid_for", "must be positive"));
        }

        let now = self.ctx.now();
        let expires_at = expiry(now, new.valid_for)?;

        let table = self.ctx.table::<RegistrationKey>();
        let mut keys = table.load()?;
        let taken: Vec<&str> = keys.iter().map(|k| k.code.as_str()).collect();
        let code = generate_code(&taken);

        let key = RegistrationKey {
            id: self.ctx.next_id()?,
            code,
            team_id: new.team_id,
            role: new.role,
            max_uses: new.max_uses,
            uses_remaining: new.max_uses,
            expires_at,
            is_active: true,
            created_by: created_by.clone(),
            created_at: now,
        };
        keys.push(key.clone());
        table.save(&keys)?;

        tracing::info!("Issued registration key for team '{}'", key.team_id);
        Ok(key)
    }

    pub fn get_key_by_code(&self, code: &str) -> Result<Option<RegistrationKey>> {
        let code = normalize_code(code);
        Ok(self
            .ctx
            .table::<RegistrationKey>()
            .find_one(|k| k.code == code)?)
    }

    /// True when the code exists and can still be redeemed. Never mutates.
    pub fn validate_key(&self, code: &str) -> Result<bool> {
        let now = self.ctx.now();
        Ok(self
            .get_key_by_code(code)?
            .is_some_and(|key| key.is_usable(now)))
    }

    pub fn list_keys_for_team(&self, team_id: &TeamId) -> Result<Vec<RegistrationKey>> {
        Ok(self
            .ctx
            .table::<RegistrationKey>()
            .find(|k| &k.team_id == team_id)?)
    }

    pub fn deactivate_key(&self, id: &RegistrationKeyId) -> Result<RegistrationKey> {
        self.ctx
            .table::<RegistrationKey>()
            .update(id.as_str(), |key| key.is_active = false)?
            .ok_or_else(|| HuddleError::not_found("registration key", id))
    }

    /// Spend one use of `code` to make `user_id` a member of its team.
    ///
    /// An existing active membership is rejected before the key is touched.
    pub fn redeem_key(&self, code: &str, user_id: &UserId) -> Result<TeamMembership> {
        let invalid = || HuddleError::InvalidOrExpiredKey {
            code: code.trim().to_owned(),
        };

        let now = self.ctx.now();
        let key = self
            .get_key_by_code(code)?
            .filter(|key| key.is_usable(now))
            .ok_or_else(invalid)?;

        let teams = TeamsRepo::new(self.ctx);
        if teams.is_member(&key.team_id, user_id)? {
            return Err(HuddleError::DuplicateMembership {
                team_id: key.team_id,
                user_id: user_id.clone(),
            });
        }

        self.ctx
            .table::<RegistrationKey>()
            .update(key.id.as_str(), RegistrationKey::consume_use)?
            .ok_or_else(invalid)?;

        teams.add_member(
            &key.team_id,
            user_id,
            NewMembership {
                role: key.role,
                ..NewMembership::default()
            },
        )
    }
}
