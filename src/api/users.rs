use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::models::acronym::Acronym;
use crate::models::user::{NewUser, PublicUser, PublicUserV2, UserWithAcronyms};

/// POST /api/users
/// Role is never taken from the body; API-created accounts are standard users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = state.user_service().create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    Ok(Json(state.user_service().list().await?))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(state.user_service().get(id).await?))
}

/// GET /api/v2/users/{id}
pub async fn get_user_v2(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUserV2>, ApiError> {
    Ok(Json(state.user_service().get_v2(id).await?))
}

/// GET /api/users/{id}/acronyms
pub async fn user_acronyms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.user_service().acronyms(id).await?))
}

/// GET /api/users/acronyms
pub async fn users_with_acronyms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserWithAcronyms>>, ApiError> {
    Ok(Json(state.user_service().with_acronyms().await?))
}

/// DELETE /api/users/{id}
pub async fn soft_delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.user_service().soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/restore
pub async fn restore_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.user_service().restore(id).await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/users/{id}/force
pub async fn force_delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.user_service().force_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
