use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::error::{WebError, WebResult};
use super::pages::page_context;
use super::session;
use super::views;
use crate::api::{ApiError, AppState, MaybeUser};
use crate::services::{ResetError, ResetRequestOutcome};

#[derive(Debug, Deserialize)]
pub struct ForgottenForm {
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    password: String,
    confirm_password: String,
}

/// GET /forgottenPassword
pub async fn forgotten_page(user: MaybeUser, headers: HeaderMap) -> Html<String> {
    views::forgotten_password(page_context(&user, &headers))
}

/// POST /forgottenPassword
pub async fn forgotten(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Form(form): Form<ForgottenForm>,
) -> WebResult<Html<String>> {
    let outcome = state.password_reset().request_reset(form.email.trim()).await?;

    let title = match outcome {
        ResetRequestOutcome::EmailSent => "Password Reset Email Sent",
        ResetRequestOutcome::UnknownEmail => "Could not find user with that email.",
    };
    Ok(views::forgotten_password_confirmed(
        page_context(&user, &headers),
        title,
    ))
}

/// GET /resetPassword?token=
///
/// Following the emailed link consumes the token; the user it belonged to is
/// remembered in the session until the new password is submitted.
pub async fn reset_page(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    session: Session,
    Query(query): Query<ResetQuery>,
) -> WebResult<Response> {
    let Some(token) = query.token.filter(|t| !t.is_empty()) else {
        return Ok(views::reset_password(page_context(&user, &headers), true).into_response());
    };

    let Some(user_id) = state.password_reset().consume(&token).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    session::remember_reset_user(&session, user_id).await?;
    Ok(views::reset_password(page_context(&user, &headers), false).into_response())
}

/// POST /resetPassword
pub async fn reset(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    session: Session,
    Form(form): Form<ResetForm>,
) -> WebResult<Response> {
    let user_id = session::reset_user(&session)
        .await?
        .ok_or_else(|| WebError(ApiError::validation("No password reset in progress")))?;

    match state
        .password_reset()
        .complete(user_id, &form.password, &form.confirm_password)
        .await
    {
        Ok(()) => {
            session::forget_reset_user(&session).await?;
            tracing::info!(%user_id, "Password reset completed");
            Ok(Redirect::to("/login").into_response())
        }
        Err(ResetError::PasswordMismatch | ResetError::Validation(_)) => {
            Ok(views::reset_password(page_context(&user, &headers), true).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
