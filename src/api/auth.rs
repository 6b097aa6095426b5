use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::convert::Infallible;
use std::sync::Arc;

use super::{ApiError, AppState, observability};
use crate::models::user::Actor;
use crate::services::AccessToken;

// ============================================================================
// Access levels
// ============================================================================

/// Authorization requirement attached to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Anonymous,
    Authenticated,
    Admin,
}

/// Single evaluation point for route access.
pub fn authorize(actor: Option<&Actor>, level: AccessLevel) -> Result<(), ApiError> {
    match (level, actor) {
        (AccessLevel::Anonymous, _) => Ok(()),
        (_, None) => Err(ApiError::unauthorized("Not authenticated")),
        (AccessLevel::Authenticated, Some(_)) => Ok(()),
        (AccessLevel::Admin, Some(actor)) if actor.is_admin() => Ok(()),
        (AccessLevel::Admin, Some(_)) => Err(ApiError::forbidden("Admin role required")),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` into an [`Actor`] extension.
///
/// No header means no credential and the request continues anonymously.
/// A token that does not resolve is rejected outright.
pub async fn token_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_bearer_token(&headers) {
        let actor = state
            .auth_service()
            .resolve_token(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid bearer token"))?;

        observability::record_actor(&request, &actor);
        request.extensions_mut().insert(actor);
    }

    Ok(next.run(request).await)
}

/// Route guard: `route_layer(from_fn_with_state(AccessLevel::Admin, require))`.
pub async fn require(
    State(level): State<AccessLevel>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(request.extensions().get::<Actor>(), level)?;
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Decodes `Authorization: Basic base64(username:password)`.
fn extract_basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

// ============================================================================
// Extractors
// ============================================================================

/// The authenticated actor. Rejects with 401 when the request carries none.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

/// The actor, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Actor>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Actor>().cloned()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/users/login
/// Basic-auth login, returns a freshly issued bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AccessToken>, ApiError> {
    let (username, password) = extract_basic_credentials(&headers)
        .ok_or_else(|| ApiError::unauthorized("Basic credentials required"))?;

    let token = state.auth_service().login(&username, &password).await?;
    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use axum::http::{HeaderValue, StatusCode};
    use uuid::Uuid;

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            username: "test".to_string(),
            role,
        }
    }

    fn status(result: Result<(), ApiError>) -> Option<StatusCode> {
        result.err().map(|e| e.status_and_message().0)
    }

    #[test]
    fn test_authorize_levels() {
        let standard = actor(Role::Standard);
        let admin = actor(Role::Admin);

        assert!(authorize(None, AccessLevel::Anonymous).is_ok());
        assert_eq!(
            status(authorize(None, AccessLevel::Authenticated)),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert!(authorize(Some(&standard), AccessLevel::Authenticated).is_ok());
        assert_eq!(
            status(authorize(Some(&standard), AccessLevel::Admin)),
            Some(StatusCode::FORBIDDEN)
        );
        assert_eq!(
            status(authorize(None, AccessLevel::Admin)),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert!(authorize(Some(&admin), AccessLevel::Admin).is_ok());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_extract_basic_credentials() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("admin:pass:word");
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        assert_eq!(
            extract_basic_credentials(&headers),
            Some(("admin".to_string(), "pass:word".to_string()))
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert_eq!(extract_basic_credentials(&headers), None);
    }
}
