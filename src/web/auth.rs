use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_sessions::Session;

use super::error::{WebError, WebResult};
use super::pages::page_context;
use super::session;
use super::views;
use crate::api::validation::{Registration, validate_registration};
use crate::api::{ApiError, AppState, MaybeUser};
use crate::models::user::NewUser;
use crate::services::{AuthError, UserError};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    name: String,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    #[serde(default)]
    twitter_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    message: Option<String>,
}

fn oauth_links(state: &AppState) -> Vec<(&'static str, &'static str)> {
    let integrations = &state.shared.integrations;
    let mut links = Vec::new();
    if let Some(google) = &integrations.google {
        links.push((google.login_path(), "Sign in with Google"));
    }
    if let Some(github) = &integrations.github {
        links.push((github.login_path(), "Sign in with GitHub"));
    }
    links
}

/// GET /login
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Html<String> {
    views::login(
        page_context(&user, &headers),
        query.contains_key("error"),
        &oauth_links(&state),
    )
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> WebResult<Redirect> {
    match state
        .auth_service()
        .verify_credentials(&form.username, &form.password)
        .await
    {
        Ok(actor) => {
            session::log_in(&session, &actor).await?;
            tracing::info!(user_id = %actor.id, "Web login");
            Ok(Redirect::to("/"))
        }
        Err(AuthError::InvalidCredentials) => Ok(Redirect::to("/login?error")),
        Err(e) => Err(e.into()),
    }
}

/// POST /logout
pub async fn logout(session: Session) -> WebResult<Redirect> {
    session::log_out(&session).await?;
    Ok(Redirect::to("/"))
}

/// GET /register
pub async fn register_page(
    user: MaybeUser,
    headers: HeaderMap,
    Query(query): Query<RegisterQuery>,
) -> Html<String> {
    views::register(page_context(&user, &headers), query.message.as_deref())
}

fn register_failed(message: &str) -> Response {
    Redirect::to(&format!(
        "/register?message={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> WebResult<Response> {
    let registration = Registration {
        name: &form.name,
        username: &form.username,
        password: &form.password,
        confirm_password: &form.confirm_password,
        email: &form.email,
    };
    if let Err(e) = validate_registration(&registration) {
        return Ok(register_failed(&e.status_and_message().1));
    }

    let mut input = NewUser::standard(form.name, form.username, form.password, form.email);
    input.twitter_url = form
        .twitter_url
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let created = match state.user_service().create(input).await {
        Ok(user) => user,
        Err(UserError::Validation(message)) => return Ok(register_failed(&message)),
        Err(e) => return Err(e.into()),
    };

    let actor = state
        .auth_service()
        .resolve_user(created.id)
        .await?
        .ok_or_else(|| WebError(ApiError::internal("Registered user vanished")))?;

    session::log_in(&session, &actor).await?;
    Ok(Redirect::to("/").into_response())
}
