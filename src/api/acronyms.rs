use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_search_term;
use super::{ApiError, AppState, SearchQuery};
use crate::models::acronym::{Acronym, AcronymInput, AcronymWithUser, Category};
use crate::models::user::PublicUser;

/// GET /api/acronyms
pub async fn list_acronyms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.acronym_service().list().await?))
}

/// GET /api/acronyms/{id}
pub async fn get_acronym(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Acronym>, ApiError> {
    Ok(Json(state.acronym_service().get(id).await?))
}

/// GET /api/acronyms/search?term=
pub async fn search_acronyms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    let term = validate_search_term(query.term.as_deref())?;
    Ok(Json(state.acronym_service().search(term).await?))
}

/// GET /api/acronyms/first
pub async fn first_acronym(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Acronym>, ApiError> {
    Ok(Json(state.acronym_service().first().await?))
}

/// GET /api/acronyms/sorted
pub async fn sorted_acronyms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.acronym_service().sorted().await?))
}

/// GET /api/acronyms/mostRecent
pub async fn most_recent_acronyms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.acronym_service().most_recent().await?))
}

/// GET /api/acronyms/users
pub async fn acronyms_with_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AcronymWithUser>>, ApiError> {
    Ok(Json(state.acronym_service().with_users().await?))
}

/// GET /api/acronyms/raw
pub async fn raw_acronyms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.acronym_service().raw().await?))
}

/// GET /api/acronyms/{id}/user
pub async fn acronym_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(state.acronym_service().owner(id).await?))
}

/// GET /api/acronyms/{id}/categories
pub async fn acronym_categories(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.acronym_service().categories(id).await?))
}

/// POST /api/acronyms
pub async fn create_acronym(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<AcronymInput>,
) -> Result<(StatusCode, Json<Acronym>), ApiError> {
    let acronym = state.acronym_service().create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(acronym)))
}

/// PUT /api/acronyms/{id}
/// Replaces the fields and hands ownership to the caller
pub async fn update_acronym(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<AcronymInput>,
) -> Result<Json<Acronym>, ApiError> {
    Ok(Json(
        state.acronym_service().update(&actor, id, input).await?,
    ))
}

/// DELETE /api/acronyms/{id}
pub async fn delete_acronym(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.acronym_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/acronyms/{id}/categories/{category_id}
pub async fn attach_category(
    State(state): State<Arc<AppState>>,
    Path((id, category_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state.acronym_service().attach(id, category_id).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /api/acronyms/{id}/categories/{category_id}
pub async fn detach_category(
    State(state): State<Arc<AppState>>,
    Path((id, category_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state.acronym_service().detach(id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
