use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use super::oauth::{AccessTokenResponse, ExternalIdentity, OAuthError, OAuthProvider, check_status, with_query};
use crate::config::OAuthProviderConfig;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";
const SCOPE: &str = "user:email";

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// Prefer the primary verified address, then any verified one, then whatever comes first.
fn pick_email(emails: &[GitHubEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
        .or_else(|| emails.first())
        .map(|e| e.email.as_str())
}

pub struct GitHubProvider {
    client: Client,
    config: OAuthProviderConfig,
}

impl GitHubProvider {
    #[must_use]
    pub const fn new(client: Client, config: OAuthProviderConfig) -> Self {
        Self { client, config }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, OAuthError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn login_path(&self) -> &'static str {
        "/login-github"
    }

    fn authorize_url(&self, state: &str) -> String {
        with_query(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
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
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;
        let token: AccessTokenResponse = check_status(response).await?.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, OAuthError> {
        let (user, emails) = futures::try_join!(
            self.get::<GitHubUser>(USER_URL, access_token),
            self.get::<Vec<GitHubEmail>>(EMAILS_URL, access_token),
        )?;

        let email = pick_email(&emails)
            .ok_or_else(|| OAuthError::Upstream("GitHub account has no email address".to_string()))?
            .to_string();

        debug!(login = %user.login, "Fetched GitHub profile");

        Ok(ExternalIdentity {
            name: user.name.unwrap_or_else(|| user.login.clone()),
            username: user.login,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(address: &str, primary: bool, verified: bool) -> GitHubEmail {
        GitHubEmail {
            email: address.to_string(),
            primary,
            verified,
        }
    }

    #[test]
    fn test_pick_email_prefers_primary_verified() {
        let emails = vec![
            email("old@x.com", false, true),
            email("main@x.com", true, true),
        ];
        assert_eq!(pick_email(&emails), Some("main@x.com"));
    }

    #[test]
    fn test_pick_email_falls_back() {
        let emails = vec![email("a@x.com", false, false), email("b@x.com", false, true)];
        assert_eq!(pick_email(&emails), Some("b@x.com"));

        let unverified = vec![email("a@x.com", false, false)];
        assert_eq!(pick_email(&unverified), Some("a@x.com"));

        assert_eq!(pick_email(&[]), None);
    }

    #[test]
    fn test_authorize_url_requests_email_scope() {
        let provider = GitHubProvider::new(
            Client::new(),
            OAuthProviderConfig {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
                callback_url: "http://localhost:8080/oauth/github".to_string(),
            },
        );
        let url = provider.authorize_url("s1");
        assert!(url.contains("scope=user%3Aemail"));
        assert!(url.contains("state=s1"));
    }
}
