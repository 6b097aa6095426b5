//! Browser session keys and helpers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::error::{WebError, WebResult};
use crate::api::{ApiError, AppState, observability};
use crate::db::generate_token;
use crate::models::user::Actor;

pub const USER_ID: &str = "user_id";
pub const CSRF_TOKEN: &str = "csrf_token";
pub const RESET_PASSWORD_USER: &str = "reset_password_user";
pub const OAUTH_STATE: &str = "oauth_state";

/// Persist the authenticated user. The session id is cycled first so a
/// pre-login id can't be reused.
pub async fn log_in(session: &Session, actor: &Actor) -> WebResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, actor.id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> WebResult<()> {
    session.flush().await?;
    Ok(())
}

/// Mint a fresh form token and store it, replacing any previous one.
pub async fn mint_csrf(session: &Session) -> WebResult<String> {
    let token = generate_token(16);
    session.insert(CSRF_TOKEN, &token).await?;
    Ok(token)
}

/// Single-use check: the stored token is removed whether or not it matches.
pub async fn check_csrf(session: &Session, submitted: Option<&str>) -> WebResult<()> {
    let expected: Option<String> = session.remove(CSRF_TOKEN).await?;
    match (expected, submitted) {
        (Some(expected), Some(submitted)) if !expected.is_empty() && expected == submitted => {
            Ok(())
        }
        _ => Err(WebError(ApiError::validation("Invalid CSRF token"))),
    }
}

pub async fn begin_oauth(session: &Session) -> WebResult<String> {
    let state = generate_token(16);
    session.insert(OAUTH_STATE, &state).await?;
    Ok(state)
}

pub async fn finish_oauth(session: &Session, returned: Option<&str>) -> WebResult<()> {
    let expected: Option<String> = session.remove(OAUTH_STATE).await?;
    match (expected, returned) {
        (Some(expected), Some(returned)) if expected == returned => Ok(()),
        _ => Err(WebError(ApiError::validation("OAuth state mismatch"))),
    }
}

pub async fn remember_reset_user(session: &Session, user_id: Uuid) -> WebResult<()> {
    session.insert(RESET_PASSWORD_USER, user_id).await?;
    Ok(())
}

pub async fn reset_user(session: &Session) -> WebResult<Option<Uuid>> {
    Ok(session.get(RESET_PASSWORD_USER).await?)
}

pub async fn forget_reset_user(session: &Session) -> WebResult<()> {
    let _: Option<Uuid> = session.remove(RESET_PASSWORD_USER).await?;
    Ok(())
}

/// Resolves the session's `user_id` into an [`Actor`] extension.
///
/// A stale id (user deleted since login) is dropped from the session and the
/// request continues anonymously.
pub async fn session_auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    if let Some(user_id) = session.get::<Uuid>(USER_ID).await? {
        match state.auth_service().resolve_user(user_id).await? {
            Some(actor) => {
                observability::record_actor(&request, &actor);
                request.extensions_mut().insert(actor);
            }
            None => {
                let _: Option<Uuid> = session.remove(USER_ID).await?;
            }
        }
    }

    Ok(next.run(request).await)
}

/// Route guard for pages that need a logged-in user.
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<Actor>().is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}
