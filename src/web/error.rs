use axum::response::{IntoResponse, Response};

use super::views;
use crate::api::ApiError;
use crate::clients::oauth::OAuthError;
use crate::services::{AcronymError, AuthError, PictureError, ResetError, UserError};

/// Error returned by HTML handlers. Carries the same taxonomy as the JSON
/// API but renders an error page instead of a JSON body.
#[derive(Debug)]
pub struct WebError(pub ApiError);

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        (status, views::error(status.as_u16(), &message)).into_response()
    }
}

macro_rules! via_api_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for WebError {
                fn from(err: $source) -> Self {
                    Self(ApiError::from(err))
                }
            }
        )+
    };
}

via_api_error!(
    anyhow::Error,
    AuthError,
    AcronymError,
    UserError,
    ResetError,
    PictureError,
    OAuthError,
);

impl From<ApiError> for WebError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<tower_sessions::session::Error> for WebError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(ApiError::internal(format!("Session error: {err}")))
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self(ApiError::validation(format!("Invalid upload: {err}")))
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_renders_status_from_taxonomy() {
        let response = WebError::from(AcronymError::acronym(7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = WebError(ApiError::forbidden("nope")).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
