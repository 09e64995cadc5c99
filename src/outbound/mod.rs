// Third-party collaborators (mail relay, file host). Each is a trait with an
// HTTP implementation and a log-only fallback chosen from the config.

pub mod file_store;
pub mod mailer;

pub use file_store::{FileStore, LogFileStore, UploadThingStore};
pub use mailer::{Email, HttpMailer, LogMailer, Mailer};

use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum OutboundError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Picks the HTTP mailer when a relay is configured, else the log-only one.
pub fn build_mailer(config: &AppConfig, client: reqwest::Client) -> Arc<dyn Mailer> {
    match &config.mail {
        Some(settings) => Arc::new(HttpMailer::new(client, settings.clone(), config.email_from.clone())),
        None => {
            tracing::warn!("EMAIL_API_URL not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}

pub fn build_file_store(config: &AppConfig, client: reqwest::Client) -> Arc<dyn FileStore> {
    match &config.uploadthing_secret {
        Some(secret) => Arc::new(UploadThingStore::new(client, secret.clone())),
        None => {
            tracing::warn!("UPLOADTHING_SECRET not set, file deletions will only be logged");
            Arc::new(LogFileStore)
        }
    }
}
