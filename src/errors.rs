use axum::http::StatusCode;
use thiserror::Error;

/// Failures surfaced to the caller with a human-readable message. Storage
/// faults are never represented here: reads fall back to defaults and
/// writes are best-effort (see storage.rs).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("an account with email {0} already exists")]
    DuplicateUser(String),
    #[error("no account found for that email")]
    UserNotFound,
    #[error("incorrect password")]
    InvalidCredentials,
    #[error("no user logged in")]
    NoSessionActive,
    #[error("category \"{0}\" already exists")]
    DuplicateCategory(String),
    #[error("category not found")]
    CategoryNotFound,
    #[error("habit not found")]
    HabitNotFound,
    #[error("{0}")]
    InvalidDuration(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let status = match err {
            DomainError::DuplicateUser(_) | DomainError::DuplicateCategory(_) => {
                StatusCode::CONFLICT
            }
            DomainError::UserNotFound
            | DomainError::InvalidCredentials
            | DomainError::NoSessionActive => StatusCode::UNAUTHORIZED,
            DomainError::CategoryNotFound | DomainError::HabitNotFound => StatusCode::NOT_FOUND,
            DomainError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
