//! Outgoing email.
//!
//! Production mail goes through the `SendGrid` v3 API. When no API key is
//! configured, [`LogMailer`] records messages in the log instead.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

pub struct SendGridMailer {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridMailer {
    #[must_use]
    pub fn new(client: Client, config: &EmailConfig) -> Self {
        Self {
            client,
            api_key: config.sendgrid_api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html }],
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %email.to, "Email accepted by SendGrid");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "SendGrid rejected email");
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Mailer used when no transport is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Email transport not configured, message logged only");
        debug!(html = %email.html, "Undelivered email body");
        Ok(())
    }
}
