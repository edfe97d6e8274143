use huddle_core::{PlayerProfile, ProfileUpdate, UserId};

use super::Ctx;
use crate::error::{HuddleError, Result};

/// Player profiles, at most one per user.
pub struct ProfilesRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> ProfilesRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn get_profile_by_user(&self, user_id: &UserId) -> Result<Option<PlayerProfile>> {
        Ok(self
            .ctx
            .table::<PlayerProfile>()
            .find_one(|p| &p.user_id == user_id)?)
    }

    /// Create the user's profile or update the existing one.
    pub fn upsert_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<PlayerProfile> {
        if user_id.is_empty() {
            return Err(HuddleError::validation("user_id", "must not be empty"));
        }

        let table = self.ctx.table::<PlayerProfile>();
        let now = self.ctx.now();
        let mut profiles = table.load()?;

        let profile = match profiles.iter_mut().find(|p| &p.user_id == user_id) {
            Some(existing) => {
                existing.apply(update, now);
                existing.clone()
            }
            None => {
                let mut profile = PlayerProfile::empty(self.ctx.next_id()?, user_id.clone(), now);
                profile.apply(update, now);
                profiles.push(profile.clone());
                profile
            }
        };

        table.save(&profiles)?;
        Ok(profile)
    }

    /// Profile for `user_id`, created empty when missing.
    pub(crate) fn ensure_profile(&self, user_id: &UserId) -> Result<PlayerProfile> {
        match self.get_profile_by_user(user_id)? {
            Some(profile) => Ok(profile),
            None => {
                let profile =
                    PlayerProfile::empty(self.ctx.next_id()?, user_id.clone(), self.ctx.now());
                Ok(self.ctx.table::<PlayerProfile>().insert(profile)?)
            }
        }
    }
}
