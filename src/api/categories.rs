use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, AppState, CategoryRequest};
use crate::models::acronym::{Acronym, Category};

/// POST /api/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.acronym_service().create_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.acronym_service().list_categories().await?))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.acronym_service().get_category(id).await?))
}

/// GET /api/categories/{id}/acronyms
pub async fn category_acronyms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.acronym_service().category_acronyms(id).await?))
}
