use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{WebError, WebResult};
use super::pages::page_context;
use super::views;
use crate::api::{ApiError, AppState, CurrentUser, MaybeUser};
use crate::models::user::Actor;

const PICTURE_FIELD: &str = "picture";

fn ensure_self(actor: &Actor, user_id: Uuid) -> WebResult<()> {
    if actor.id == user_id {
        Ok(())
    } else {
        Err(WebError(ApiError::forbidden(
            "You can only change your own profile picture",
        )))
    }
}

/// GET /users/{id}/addProfilePicture
pub async fn upload_page(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> WebResult<Html<String>> {
    if let Some(actor) = &user.0 {
        ensure_self(actor, id)?;
    }
    let target = state.user_service().find(id).await?;
    Ok(views::add_profile_picture(
        page_context(&user, &headers),
        &target,
    ))
}

/// POST /users/{id}/addProfilePicture
pub async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> WebResult<Redirect> {
    ensure_self(&actor, id)?;

    let mut picture = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PICTURE_FIELD) {
            picture = Some(field.bytes().await?);
            break;
        }
    }
    let picture =
        picture.ok_or_else(|| WebError(ApiError::validation("Missing picture upload")))?;

    state.profile_pictures().save(id, &picture).await?;
    Ok(Redirect::to(&format!("/users/{id}")))
}

/// GET /users/{id}/profilePicture
pub async fn picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> WebResult<Response> {
    let (filename, bytes) = state.profile_pictures().load(id).await?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
