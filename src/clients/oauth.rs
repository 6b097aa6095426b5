//! Third-party identity providers.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider refused the credential; the browser should restart the flow.
    #[error("Provider rejected the credential")]
    Unauthorized,

    #[error("Provider error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// Profile data returned by a provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Field matched against the local `username` (email for Google, login for GitHub).
    pub username: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Short provider name, used in logs.
    fn name(&self) -> &'static str;

    /// Local route that starts the login flow with this provider.
    fn login_path(&self) -> &'static str;

    /// Provider authorization URL the browser is redirected to.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;

    /// Fetch the profile behind an access token.
    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, OAuthError>;

    async fn authenticate(&self, code: &str) -> Result<ExternalIdentity, OAuthError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_identity(&access_token).await
    }
}

/// Map a provider response status onto the OAuth error taxonomy.
pub(crate) async fn check_status(response: Response) -> Result<Response, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(OAuthError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OAuthError::Upstream(format!("status={status}, body={body}")))
}

/// Append query parameters to a fixed provider endpoint.
pub(crate) fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    match url::Url::parse_with_params(base, params) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_encodes_params() {
        let url = with_query(
            "https://example.com/auth",
            &[("scope", "profile email"), ("state", "a&b")],
        );
        assert_eq!(url, "https://example.com/auth?scope=profile+email&state=a%26b");
    }
}
