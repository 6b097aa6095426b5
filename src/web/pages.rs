use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::WebResult;
use super::views::{self, PageContext};
use crate::api::{AppState, MaybeUser};

const COOKIES_ACCEPTED: &str = "cookies-accepted";

/// Navigation state for a page, derived from the actor and request cookies.
pub(super) fn page_context<'a>(user: &'a MaybeUser, headers: &HeaderMap) -> PageContext<'a> {
    PageContext {
        actor: user.0.as_ref(),
        show_cookie_message: !has_cookie(headers, COOKIES_ACCEPTED),
    }
}

fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(key, _)| key == name)
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    #[serde(rename = "cookies-accepted")]
    cookies_accepted: Option<String>,
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> WebResult<Response> {
    if query.cookies_accepted.is_some() {
        let cookie = HeaderValue::from_static(
            "cookies-accepted=true; Path=/; Max-Age=31536000; SameSite=Lax",
        );
        return Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response());
    }

    let acronyms = state.acronym_service().list().await?;
    Ok(views::index(page_context(&user, &headers), &acronyms).into_response())
}

/// GET /acronyms/{id}
pub async fn acronym(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let service = state.acronym_service();
    let (acronym, owner, categories) =
        futures::try_join!(service.get(id), service.owner(id), service.categories(id))?;

    Ok(views::acronym(
        page_context(&user, &headers),
        &acronym,
        &owner,
        &categories,
    ))
}

/// GET /users
pub async fn all_users(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
) -> WebResult<Html<String>> {
    let users = state.user_service().list().await?;
    Ok(views::all_users(page_context(&user, &headers), &users))
}

/// GET /users/{id}
pub async fn user(
    State(state): State<Arc<AppState>>,
    actor: MaybeUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> WebResult<Html<String>> {
    let service = state.user_service();
    let (user, acronyms) = futures::try_join!(service.find(id), service.acronyms(id))?;
    Ok(views::user(page_context(&actor, &headers), &user, &acronyms))
}

/// GET /categories
pub async fn all_categories(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
) -> WebResult<Html<String>> {
    let categories = state.acronym_service().list_categories().await?;
    Ok(views::all_categories(
        page_context(&user, &headers),
        &categories,
    ))
}

/// GET /categories/{id}
pub async fn category(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let service = state.acronym_service();
    let (category, acronyms) =
        futures::try_join!(service.get_category(id), service.category_acronyms(id))?;
    Ok(views::category(
        page_context(&user, &headers),
        &category,
        &acronyms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!has_cookie(&headers, COOKIES_ACCEPTED));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("til.sid=abc; cookies-accepted=true"),
        );
        assert!(has_cookie(&headers, COOKIES_ACCEPTED));
        assert!(!has_cookie(&headers, "cookies"));
    }
}
