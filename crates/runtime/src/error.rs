//! Errors raised by repositories and the `Huddle` handle.

use huddle_core::{TeamId, TransitionError, UserId};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum HuddleError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("user '{user_id}' already has an active membership in team '{team_id}'")]
    DuplicateMembership { team_id: TeamId, user_id: UserId },

    #[error("code '{code}' is invalid, expired or used up")]
    InvalidOrExpiredKey { code: String },

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HuddleError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        HuddleError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        HuddleError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<TransitionError> for HuddleError {
    fn from(error: TransitionError) -> Self {
        HuddleError::StateConflict(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HuddleError>;
