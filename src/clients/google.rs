use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::oauth::{AccessTokenResponse, ExternalIdentity, OAuthError, OAuthProvider, check_status, with_query};
use crate::config::OAuthProviderConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";
const SCOPE: &str = "profile email";

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    name: String,
}

pub struct GoogleProvider {
    client: Client,
    config: OAuthProviderConfig,
}

impl GoogleProvider {
    #[must_use]
    pub const fn new(client: Client, config: OAuthProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn login_path(&self) -> &'static str {
        "/login-google"
    }

    fn authorize_url(&self, state: &str) -> String {
        with_query(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("state", state),
            ],
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(TOKEN_URL).form(&params).send().await?;
        let token: AccessTokenResponse = check_status(response).await?.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, OAuthError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;
        let info: GoogleUserInfo = check_status(response).await?.json().await?;

        debug!(email = %info.email, "Fetched Google profile");

        Ok(ExternalIdentity {
            username: info.email.clone(),
            name: info.name,
            email: info.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_scope_and_state() {
        let provider = GoogleProvider::new(
            Client::new(),
            OAuthProviderConfig {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
                callback_url: "http://localhost:8080/oauth/google".to_string(),
            },
        );

        let url = provider.authorize_url("xyz");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("scope=profile+email"));
        assert!(url.contains("state=xyz"));
        assert!(!url.contains("secret"));
    }
}
