//! Shared harness: a router over a fresh temporary SQLite file, a mailer
//! that records instead of sending, and a scripted OAuth provider.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use til::api::AppState;
use til::clients::mailer::{Email, MailError, Mailer};
use til::clients::oauth::{ExternalIdentity, OAuthError, OAuthProvider};
use til::config::Config;
use til::state::Integrations;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Codes understood by [`FakeOAuthProvider::exchange_code`].
pub const CODE_OK: &str = "good-code";
pub const CODE_REJECTED: &str = "rejected-code";
pub const CODE_BROKEN: &str = "broken-code";

pub struct FakeOAuthProvider {
    pub identity: ExternalIdentity,
}

#[async_trait]
impl OAuthProvider for FakeOAuthProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn login_path(&self) -> &'static str {
        "/login-github"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        match code {
            CODE_OK => Ok("provider-access-token".to_string()),
            CODE_REJECTED => Err(OAuthError::Unauthorized),
            _ => Err(OAuthError::Upstream("status=500".to_string())),
        }
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, OAuthError> {
        assert_eq!(access_token, "provider-access-token");
        Ok(self.identity.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn spawn_app() -> TestApp {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("til-test-{id}.db"));
    let pictures = std::env::temp_dir().join(format!("til-test-pictures-{id}"));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.storage.profile_pictures_path = pictures.display().to_string();
    config.server.secure_cookies = false;
    config.observability.metrics_enabled = false;

    let mailer = Arc::new(RecordingMailer::default());
    let integrations = Integrations {
        mailer: mailer.clone(),
        google: None,
        github: Some(Arc::new(FakeOAuthProvider {
            identity: ExternalIdentity {
                username: "octocat".to_string(),
                name: "The Octocat".to_string(),
                email: "octocat@github.test".to_string(),
            },
        }) as Arc<dyn OAuthProvider>),
    };

    let state = til::api::create_app_state_with_integrations(config, integrations, None)
        .await
        .expect("failed to create app state");
    let router = til::api::router(state.clone());

    TestApp {
        router,
        state,
        mailer,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Bearer token for `username`, via the Basic-auth login route.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/login")
                    .header(header::AUTHORIZATION, basic(username, password))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login as {username}");
        let body: Value = json(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn send_authed(&self, method: &str, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Creates a standard user through the API and returns its id.
    pub async fn create_user(&self, admin_token: &str, username: &str, password: &str) -> String {
        let response = self
            .send_json(
                "POST",
                "/api/users",
                Some(admin_token),
                &serde_json::json!({
                    "name": format!("User {username}"),
                    "username": username,
                    "password": password,
                    "email": format!("{username}@example.com"),
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = json(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates an acronym through the API and returns its id.
    pub async fn create_acronym(&self, token: &str, short: &str, long: &str) -> i64 {
        let response = self
            .send_json(
                "POST",
                "/api/acronyms",
                Some(token),
                &serde_json::json!({ "short": short, "long": long }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = json(response).await;
        body["id"].as_i64().unwrap()
    }
}

pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Browser-like client that carries the session cookie between requests.
pub struct Browser<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
}

impl<'a> Browser<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        Self { app, cookie: None }
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = self.app.send(builder.body(body).unwrap()).await;

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else { continue };
            if pair.starts_with("til.sid=") {
                self.cookie = Some(pair.to_string());
            }
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn post_multipart(
        &mut self,
        uri: &str,
        field: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Response<Body> {
        let boundary = "til-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                ),
            Body::from(body),
        )
        .await
    }

    /// Logs in through the HTML form.
    pub async fn login(&mut self, username: &str, password: &str) -> Response<Body> {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }
}

/// Pulls the hidden `csrf_token` value out of a rendered form.
pub fn csrf_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("form has a csrf token") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

/// Pulls the reset token out of a password reset email.
pub fn reset_token(email: &Email) -> String {
    let marker = "resetPassword?token=";
    let start = email.html.find(marker).expect("email has a reset link") + marker.len();
    let end = email.html[start..]
        .find(|c: char| !c.is_ascii_alphanumeric())
        .map_or(email.html.len(), |i| i + start);
    email.html[start..end].to_string()
}
