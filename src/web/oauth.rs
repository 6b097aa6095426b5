//! Third-party login: `/login-google`, `/login-github` and their callbacks.

use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::error::{WebError, WebResult};
use super::session;
use crate::api::{ApiError, AppState};
use crate::clients::oauth::{OAuthError, OAuthProvider};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// Stores a fresh `state` value and sends the browser to the provider.
pub async fn begin(provider: Arc<dyn OAuthProvider>, session: Session) -> WebResult<Redirect> {
    let state = session::begin_oauth(&session).await?;
    Ok(Redirect::to(&provider.authorize_url(&state)))
}

pub async fn callback(
    provider: Arc<dyn OAuthProvider>,
    state: Arc<AppState>,
    session: Session,
    query: CallbackQuery,
) -> WebResult<Response> {
    session::finish_oauth(&session, query.state.as_deref()).await?;

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| WebError(ApiError::validation("Missing authorization code")))?;

    let identity = match provider.authenticate(&code).await {
        Ok(identity) => identity,
        Err(OAuthError::Unauthorized) => {
            tracing::warn!(provider = provider.name(), "Provider rejected the login, restarting");
            return Ok(Redirect::to(provider.login_path()).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let actor = state.auth_service().federated_login(&identity).await?;
    session::log_in(&session, &actor).await?;
    tracing::info!(provider = provider.name(), user_id = %actor.id, "OAuth login");

    Ok(Redirect::to("/").into_response())
}
