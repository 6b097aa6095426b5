use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{Integrations, SharedState};

mod acronyms;
pub mod auth;
mod categories;
mod error;
pub mod observability;
mod system;
mod types;
mod users;
pub mod validation;

pub use auth::{AccessLevel, CurrentUser, MaybeUser, authorize};
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn acronym_service(&self) -> &Arc<dyn crate::services::AcronymService> {
        &self.shared.acronym_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn crate::services::UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn password_reset(&self) -> &Arc<dyn crate::services::PasswordResetService> {
        &self.shared.password_reset
    }

    #[must_use]
    pub fn profile_pictures(&self) -> &crate::services::ProfilePictureStore {
        &self.shared.profile_pictures
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Same as [`create_app_state_from_config`] with caller-supplied mail and OAuth clients.
pub async fn create_app_state_with_integrations(
    config: Config,
    integrations: Integrations,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_integrations(config, integrations).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Full application: JSON API under `/api`, the HTML site, and `/metrics`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = create_api_router(state.clone())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any));

    let mut app = Router::new()
        .nest("/api", api_router)
        .merge(crate::web::router(state.clone()));

    if state.config().observability.metrics_enabled {
        app = app.route("/metrics", get(observability::get_metrics));
    }

    app.with_state(state)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::request_metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/acronyms", get(acronyms::list_acronyms))
        .route("/acronyms/search", get(acronyms::search_acronyms))
        .route("/acronyms/first", get(acronyms::first_acronym))
        .route("/acronyms/sorted", get(acronyms::sorted_acronyms))
        .route("/acronyms/mostRecent", get(acronyms::most_recent_acronyms))
        .route("/acronyms/users", get(acronyms::acronyms_with_users))
        .route("/acronyms/raw", get(acronyms::raw_acronyms))
        .route("/acronyms/{id}", get(acronyms::get_acronym))
        .route("/acronyms/{id}/user", get(acronyms::acronym_owner))
        .route("/acronyms/{id}/categories", get(acronyms::acronym_categories))
        .route("/users", get(users::list_users))
        .route("/users/acronyms", get(users::users_with_acronyms))
        .route("/users/login", post(auth::login))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/acronyms", get(users::user_acronyms))
        .route("/v2/users/{id}", get(users::get_user_v2))
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category))
        .route("/categories/{id}/acronyms", get(categories::category_acronyms))
        .route("/health", get(system::health));

    let authenticated_routes = Router::new()
        .route("/acronyms", post(acronyms::create_acronym))
        .route(
            "/acronyms/{id}",
            put(acronyms::update_acronym).delete(acronyms::delete_acronym),
        )
        .route(
            "/acronyms/{id}/categories/{category_id}",
            post(acronyms::attach_category).delete(acronyms::detach_category),
        )
        .route("/users", post(users::create_user))
        .route("/categories", post(categories::create_category))
        .route_layer(middleware::from_fn_with_state(
            AccessLevel::Authenticated,
            auth::require,
        ));

    let admin_routes = Router::new()
        .route("/users/{id}", delete(users::soft_delete_user))
        .route("/users/{id}/restore", post(users::restore_user))
        .route("/users/{id}/force", delete(users::force_delete_user))
        .route_layer(middleware::from_fn_with_state(AccessLevel::Admin, auth::require));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state,
            auth::token_auth_middleware,
        ))
}
