use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{Instrument, Level, event, field, info_span};
use uuid::Uuid;

use crate::api::AppState;
use crate::entities::users::Role;
use crate::models::user::Actor;

const HTML_CSP: &str = "default-src 'self'; img-src 'self' data:; script-src 'none'; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'; base-uri 'self'";

/// Which part of the application a request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Api,
    Web,
    Metrics,
}

impl Surface {
    #[must_use]
    pub fn of(path: &str) -> Self {
        if path == "/api" || path.starts_with("/api/") {
            Self::Api
        } else if path == "/metrics" {
            Self::Metrics
        } else {
            Self::Web
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Web => "web",
            Self::Metrics => "metrics",
        }
    }
}

/// Caller role for a request, filled in by whichever auth layer resolves it.
#[derive(Debug, Clone, Default)]
pub struct CallerRole(Arc<OnceLock<Role>>);

impl CallerRole {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.0.get() {
            Some(Role::Admin) => "admin",
            Some(Role::Standard) => "standard",
            None => "anonymous",
        }
    }
}

/// Tags the current request with the resolved caller, for logs and metrics.
pub fn record_actor(request: &Request, actor: &Actor) {
    let span = tracing::Span::current();
    span.record("user_id", field::display(actor.id));
    span.record("role", field::debug(actor.role));
    if let Some(role) = request.extensions().get::<CallerRole>() {
        let _ = role.0.set(actor.role);
    }
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.prometheus_handle.as_ref() {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics recorder not installed").into_response(),
    }
}

/// Opens the request span and records request counts and latency per
/// surface, route and caller role.
pub async fn request_metrics_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let surface = Surface::of(req.uri().path());
    let method = req.method().to_string();
    // Route template, so ids in paths do not become label values.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let caller = CallerRole::default();
    req.extensions_mut().insert(caller.clone());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        surface = surface.as_str(),
        method = %method,
        path = %req.uri().path(),
        route = %route,
        user_id = field::Empty,
        role = field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = start.elapsed();

        metrics::counter!(
            "til_http_requests_total",
            "surface" => surface.as_str(),
            "method" => method,
            "route" => route.clone(),
            "status" => status.as_u16().to_string(),
            "role" => caller.label(),
        )
        .increment(1);
        metrics::histogram!(
            "til_http_request_duration_seconds",
            "surface" => surface.as_str(),
            "route" => route,
        )
        .record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            event!(Level::WARN, status = status.as_u16(), duration_ms, "Request failed");
        } else {
            event!(Level::INFO, status = status.as_u16(), duration_ms, "Request finished");
        }

        response
    }
    .instrument(span)
    .await
}

/// HTML pages get the content security policy; API responses are never cached.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let surface = Surface::of(req.uri().path());
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    match surface {
        Surface::Web => {
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
            headers.insert(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(HTML_CSP),
            );
        }
        Surface::Api | Surface::Metrics => {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_from_path() {
        assert_eq!(Surface::of("/api/acronyms/1"), Surface::Api);
        assert_eq!(Surface::of("/api"), Surface::Api);
        assert_eq!(Surface::of("/apiary"), Surface::Web);
        assert_eq!(Surface::of("/metrics"), Surface::Metrics);
        assert_eq!(Surface::of("/users/abc/profilePicture"), Surface::Web);
    }

    #[test]
    fn test_caller_role_label() {
        let caller = CallerRole::default();
        assert_eq!(caller.label(), "anonymous");

        let shared = caller.clone();
        let _ = shared.0.set(Role::Admin);
        assert_eq!(caller.label(), "admin");
    }
}
