use huddle_core::{NewUser, Role, User, UserId, UserUpdate, hash_password};

use super::{Ctx, ProfilesRepo, require};
use crate::error::{HuddleError, Result};

/// Accounts. Users are deactivated, never deleted.
pub struct UsersRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> UsersRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    /// Register an account. Players also get an empty profile.
    pub fn create_user(&self, new: NewUser) -> Result<User> {
        require("username", &new.username)?;
        require("email", &new.email)?;
        require("password", &new.password)?;

        let username = new.username.trim().to_owned();
        if self.get_user_by_username(&username)?.is_some() {
            return Err(HuddleError::validation(
                "username",
                format!("'{username}' is already taken"),
            ));
        }

        let now = self.ctx.now();
        let user = User {
            id: self.ctx.next_id()?,
            username,
            email: new.email.trim().to_owned(),
            password_hash: hash_password(&new.password),
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let user = self.ctx.table::<User>().insert(user)?;

        if user.role == Role::Player {
            ProfilesRepo::new(self.ctx).ensure_profile(&user.id)?;
        }

        tracing::info!("Created user '{}' ({})", user.username, user.role);
        Ok(user)
    }

    pub fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.ctx.table::<User>().get(id.as_str())?)
    }

    /// Case-insensitive lookup.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.trim();
        Ok(self
            .ctx
            .table::<User>()
            .find_one(|u| u.username.eq_ignore_ascii_case(username))?)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim();
        Ok(self
            .ctx
            .table::<User>()
            .find_one(|u| u.email.eq_ignore_ascii_case(email))?)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.ctx.table::<User>().load()?)
    }

    pub fn update_user(&self, id: &UserId, update: UserUpdate) -> Result<User> {
        if let Some(email) = &update.email {
            require("email", email)?;
        }
        if let Some(password) = &update.password {
            require("password", password)?;
        }

        let now = self.ctx.now();
        self.ctx
            .table::<User>()
            .update(id.as_str(), |user| {
                if let Some(email) = update.email {
                    user.email = email.trim().to_owned();
                }
                if let Some(password) = update.password {
                    user.password_hash = hash_password(&password);
                }
                if let Some(role) = update.role {
                    user.role = role;
                }
                user.updated_at = now;
            })?
            .ok_or_else(|| HuddleError::not_found("user", id))
    }

    pub fn deactivate_user(&self, id: &UserId) -> Result<User> {
        let now = self.ctx.now();
        self.ctx
            .table::<User>()
            .update(id.as_str(), |user| {
                user.is_active = false;
                user.updated_at = now;
            })?
            .ok_or_else(|| HuddleError::not_found("user", id))
    }

    /// Active user with matching credentials, if any.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        Ok(self
            .get_user_by_username(username)?
            .filter(|user| user.is_active && user.verify_password(password)))
    }
}
