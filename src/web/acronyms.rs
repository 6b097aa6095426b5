use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::error::WebResult;
use super::pages::page_context;
use super::views::PageContext;
use super::session;
use super::views::{self, AcronymFields};
use crate::api::{AppState, CurrentUser, MaybeUser};
use crate::models::acronym::AcronymInput;
use crate::services::AcronymError;

#[derive(Debug, Deserialize)]
pub struct AcronymForm {
    short: String,
    long: String,
    #[serde(default)]
    categories: String,
    csrf_token: Option<String>,
}

impl AcronymForm {
    fn input(&self) -> AcronymInput {
        AcronymInput {
            short: self.short.clone(),
            long: self.long.clone(),
        }
    }

    /// Category names from the comma-separated field, blanks dropped.
    fn category_names(&self) -> Vec<String> {
        split_categories(&self.categories)
    }

    fn fields(&self) -> AcronymFields<'_> {
        AcronymFields {
            short: &self.short,
            long: &self.long,
            categories: self.categories.clone(),
        }
    }
}

/// Shows the submitted form again with the error and a fresh CSRF token.
async fn rerender(
    session: &Session,
    ctx: PageContext<'_>,
    editing: Option<i32>,
    form: &AcronymForm,
    error: &str,
) -> WebResult<Response> {
    let token = session::mint_csrf(session).await?;
    Ok(views::acronym_form(ctx, editing, &form.fields(), Some(error), &token).into_response())
}

fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// GET /acronyms/create
pub async fn create_page(
    user: MaybeUser,
    headers: HeaderMap,
    session: Session,
) -> WebResult<Html<String>> {
    let token = session::mint_csrf(&session).await?;
    Ok(views::acronym_form(
        page_context(&user, &headers),
        None,
        &AcronymFields::default(),
        None,
        &token,
    ))
}

/// POST /acronyms/create
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    CurrentUser(actor): CurrentUser,
    headers: HeaderMap,
    session: Session,
    Form(form): Form<AcronymForm>,
) -> WebResult<Response> {
    session::check_csrf(&session, form.csrf_token.as_deref()).await?;

    let service = state.acronym_service();
    let acronym = match service.create(&actor, form.input()).await {
        Ok(acronym) => acronym,
        Err(AcronymError::Validation(msg)) => {
            return rerender(&session, page_context(&user, &headers), None, &form, &msg).await;
        }
        Err(e) => return Err(e.into()),
    };
    for name in form.category_names() {
        service.attach_by_name(acronym.id, &name).await?;
    }

    Ok(Redirect::to(&format!("/acronyms/{}", acronym.id)).into_response())
}

/// GET /acronyms/{id}/edit
pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let service = state.acronym_service();
    let (acronym, categories) = futures::try_join!(service.get(id), service.categories(id))?;
    let token = session::mint_csrf(&session).await?;

    Ok(views::acronym_form(
        page_context(&user, &headers),
        Some(acronym.id),
        &AcronymFields::from_acronym(&acronym, &categories),
        None,
        &token,
    ))
}

/// POST /acronyms/{id}/edit
pub async fn edit(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    CurrentUser(actor): CurrentUser,
    headers: HeaderMap,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<AcronymForm>,
) -> WebResult<Response> {
    session::check_csrf(&session, form.csrf_token.as_deref()).await?;

    match state
        .acronym_service()
        .update_with_categories(&actor, id, form.input(), &form.category_names())
        .await
    {
        Ok(acronym) => Ok(Redirect::to(&format!("/acronyms/{}", acronym.id)).into_response()),
        Err(AcronymError::Validation(msg)) => {
            rerender(&session, page_context(&user, &headers), Some(id), &form, &msg).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /acronyms/{id}/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> WebResult<Redirect> {
    state.acronym_service().delete(id).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_categories() {
        assert_eq!(
            split_categories(" Learning, Fun ,,  "),
            vec!["Learning".to_string(), "Fun".to_string()]
        );
        assert!(split_categories("").is_empty());
    }
}
