use async_trait::async_trait;
use serde::Serialize;

use super::OutboundError;
use crate::config::MailSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), OutboundError>;
}

/// Posts each email as JSON to a transactional mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    settings: MailSettings,
    from: String,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, settings: MailSettings, from: String) -> Self {
        Self { client, settings, from }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), OutboundError> {
        let message = RelayMessage {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutboundError::Rejected { status: status.as_u16(), body });
        }

        tracing::debug!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Used when no relay is configured: the email only reaches the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), OutboundError> {
        tracing::info!(to = %email.to, subject = %email.subject, body = %email.text, "email not sent (no relay configured)");
        Ok(())
    }
}
