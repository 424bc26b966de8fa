use thiserror::Error;
use uuid::Uuid;

use crate::{error::HttpError, models::matchmodel::MatchStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("You cannot request a skill swap with yourself")]
    SelfRequest,

    #[error("You cannot review yourself")]
    SelfReview,

    #[error("{0} not found")]
    UserNotFound(&'static str),

    #[error("Target user does not offer this skill")]
    SkillNotOffered,

    #[error("A pending skill swap request already exists")]
    DuplicatePendingRequest,

    #[error("Match {0} not found")]
    MatchNotFound(Uuid),

    #[error("User {0} is not a participant of match {1}")]
    NotParticipant(String, Uuid),

    #[error("Invalid status transition from {0} to {1}")]
    InvalidTransition(MatchStatus, MatchStatus),

    #[error("You can only start calls for accepted matches")]
    CallNotAllowed,

    #[error("Call {0} not found for this match")]
    CallNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Push delivery error: {0}")]
    Push(String),
}

impl ServiceError {
    /// Maps a unique-index violation on insert to a domain error, keeping any
    /// other database failure as is.
    pub fn on_unique_violation(err: sqlx::Error, mapped: ServiceError) -> ServiceError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => mapped,
            _ => ServiceError::Database(err),
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::SelfRequest
            | ServiceError::SelfReview
            | ServiceError::SkillNotOffered
            | ServiceError::DuplicatePendingRequest
            | ServiceError::InvalidTransition(_, _)
            | ServiceError::CallNotAllowed
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::UserNotFound(_)
            | ServiceError::MatchNotFound(_)
            | ServiceError::CallNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::NotParticipant(_, _) => {
                HttpError::forbidden("You are not a participant of this match")
            }

            ServiceError::Database(_) | ServiceError::Push(_) => {
                tracing::error!("request failed: {}", error);
                HttpError::server_error(crate::error::ErrorMessage::ServerError.to_string())
            }
        }
    }
}
