use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::clients::oauth::OAuthError;
use crate::services::{AcronymError, AuthError, PictureError, ResetError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code and client-facing message. Server-side failures are logged
    /// here and replaced by a generic message.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();
        let body = ErrorBody {
            error: error_message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::AccountUnavailable(msg) => Self::Forbidden(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AcronymError> for ApiError {
    fn from(err: AcronymError) -> Self {
        match err {
            AcronymError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            AcronymError::Validation(msg) => Self::ValidationError(msg),
            AcronymError::UnknownOwner => {
                Self::ValidationError("Owning user does not exist".to_string())
            }
            AcronymError::Database(msg) => Self::DatabaseError(msg),
            AcronymError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::NotFound("User not found".to_string()),
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::PasswordMismatch => Self::ValidationError(err.to_string()),
            ResetError::Validation(msg) => Self::ValidationError(msg),
            ResetError::UserNotFound => Self::NotFound("User not found".to_string()),
            ResetError::Mail(e) => Self::ExternalApiError {
                service: "Email".to_string(),
                message: e.to_string(),
            },
            ResetError::Database(msg) => Self::DatabaseError(msg),
            ResetError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<PictureError> for ApiError {
    fn from(err: PictureError) -> Self {
        match err {
            PictureError::UserNotFound => Self::NotFound("User not found".to_string()),
            PictureError::NoPicture => Self::NotFound("Profile picture not found".to_string()),
            PictureError::Validation(msg) => Self::ValidationError(msg),
            PictureError::Io(e) => Self::InternalError(e.to_string()),
            PictureError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Unauthorized => Self::Unauthorized(err.to_string()),
            OAuthError::Upstream(message) => Self::ExternalApiError {
                service: "OAuth provider".to_string(),
                message,
            },
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        let cases = [
            (ApiError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(AuthError::AccountUnavailable("deleted".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::from(AcronymError::acronym(7)), StatusCode::NOT_FOUND),
            (ApiError::from(AcronymError::UnknownOwner), StatusCode::BAD_REQUEST),
            (
                ApiError::from(UserError::Validation("taken".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(ResetError::PasswordMismatch), StatusCode::BAD_REQUEST),
            (ApiError::from(OAuthError::Upstream("500".to_string())), StatusCode::BAD_GATEWAY),
            (ApiError::forbidden("Admin role required"), StatusCode::FORBIDDEN),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_and_message().0, expected, "{error}");
        }
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let (status, message) = ApiError::internal("secret detail").status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_not_found_message() {
        let (_, message) = ApiError::from(AcronymError::acronym(7)).status_and_message();
        assert_eq!(message, "Acronym 7 not found");
    }
}
