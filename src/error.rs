use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("This action cannot be performed on your own account")]
    SelfActionForbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Anonymous invite lookup failed. Never says whether the token existed.
    #[error("Invite not found or expired")]
    NotFoundOrExpired,

    #[error("Invalid or expired invite")]
    InvalidOrExpiredInvite,

    #[error("Invite has already been used")]
    AlreadyUsed,

    #[error("An account with this email already exists")]
    IdentityAlreadyExists,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Stable machine-readable kind, used by clients to pick a localized message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::Unauthorized => "unauthorized",
            AppError::SelfActionForbidden => "self_action_forbidden",
            AppError::Validation(_) => "validation_error",
            AppError::NotFoundOrExpired => "not_found_or_expired",
            AppError::InvalidOrExpiredInvite => "invalid_or_expired_invite",
            AppError::AlreadyUsed => "already_used",
            AppError::IdentityAlreadyExists => "identity_already_exists",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "persistence_error",
            AppError::Internal(_) => "internal_error",
            AppError::Mail(_) => "mail_error",
            AppError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
            AppError::SelfActionForbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Validation(ref msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::NotFoundOrExpired => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidOrExpiredInvite => (StatusCode::GONE, self.to_string()),
            AppError::AlreadyUsed => (StatusCode::CONFLICT, self.to_string()),
            AppError::IdentityAlreadyExists => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong, please try again".to_string())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Mail(ref msg) => {
                tracing::error!("Mail error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Email could not be sent".to_string())
            }
            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "File could not be stored".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// True when the error is a UNIQUE constraint violation reported by the store.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
