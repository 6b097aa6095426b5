//! Server-rendered HTML site with cookie sessions.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Query, State},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, cookie::SameSite};

use crate::api::AppState;
use crate::clients::oauth::OAuthProvider;
use crate::config::OAuthProviderConfig;

mod acronyms;
mod auth;
mod error;
mod oauth;
mod pages;
mod password;
mod profile;
pub mod session;
mod views;

pub use error::{WebError, WebResult};

pub const SESSION_COOKIE: &str = "til.sid";

const MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let server = &state.config().server;
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/acronyms/{id}", get(pages::acronym))
        .route("/users", get(pages::all_users))
        .route("/users/{id}", get(pages::user))
        .route("/users/{id}/profilePicture", get(profile::picture))
        .route("/categories", get(pages::all_categories))
        .route("/categories/{id}", get(pages::category))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", get(auth::register_page).post(auth::register))
        .route(
            "/forgottenPassword",
            get(password::forgotten_page).post(password::forgotten),
        )
        .route(
            "/resetPassword",
            get(password::reset_page).post(password::reset),
        );

    let protected_routes = Router::new()
        .route(
            "/acronyms/create",
            get(acronyms::create_page).post(acronyms::create),
        )
        .route(
            "/acronyms/{id}/edit",
            get(acronyms::edit_page).post(acronyms::edit),
        )
        .route("/acronyms/{id}/delete", post(acronyms::delete))
        .route(
            "/users/{id}/addProfilePicture",
            get(profile::upload_page)
                .post(profile::upload)
                .layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES)),
        )
        .route_layer(middleware::from_fn(session::require_login));

    let integrations = &state.shared.integrations;
    let oauth = &state.config().oauth;
    let oauth_routes = [
        (integrations.google.clone(), &oauth.google),
        (integrations.github.clone(), &oauth.github),
    ]
    .into_iter()
    .filter_map(|(provider, config)| provider.map(|p| (p, config)))
    .fold(Router::new(), |router, (provider, config)| {
        router.merge(oauth_router(provider, config))
    });

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(oauth_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_auth_middleware,
        ))
        .layer(session_layer)
}

/// Login and callback routes for one provider. The callback is mounted at
/// the path of the configured callback URL, or `/oauth/<name>` when unset.
fn oauth_router(
    provider: Arc<dyn OAuthProvider>,
    config: &OAuthProviderConfig,
) -> Router<Arc<AppState>> {
    let callback_path = config
        .callback_path()
        .unwrap_or_else(|| format!("/oauth/{}", provider.name()));
    tracing::debug!(
        provider = provider.name(),
        callback = %callback_path,
        "Mounting OAuth routes"
    );

    let login = provider.clone();
    let callback = provider.clone();

    Router::new()
        .route(
            provider.login_path(),
            get(move |session: Session| oauth::begin(login.clone(), session)),
        )
        .route(
            &callback_path,
            get(
                move |State(state): State<Arc<AppState>>,
                      session: Session,
                      Query(query): Query<oauth::CallbackQuery>| {
                    oauth::callback(callback.clone(), state, session, query)
                },
            ),
        )
}
