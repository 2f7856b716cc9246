use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Requester is already a member of this team")]
    AlreadyMember,

    #[error("A join request for this posting already exists")]
    DuplicateRequest,

    #[error("Team is already at its target size")]
    CapacityExceeded,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code returned alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::BadRequest(_) | Error::Json(_) => "bad_request",
            Error::Validation(_) => "validation",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::InvalidState(_) => "invalid_state",
            Error::AlreadyMember => "already_member",
            Error::DuplicateRequest => "duplicate_request",
            Error::CapacityExceeded => "capacity_exceeded",
            Error::Conflict(_) => "conflict",
            Error::Database(_) | Error::Anyhow(_) | Error::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Json(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidState(_)
            | Error::AlreadyMember
            | Error::DuplicateRequest
            | Error::CapacityExceeded
            | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Config(_) | Error::Database(_) | Error::Anyhow(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match &self {
            Error::Database(err) => {
                tracing::error!(error = ?err, "storage failure");
                "An unexpected error occurred".to_string()
            }
            Error::Anyhow(err) => {
                tracing::error!(error = ?err, "unhandled error");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "error": error_message, "code": self.code() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
