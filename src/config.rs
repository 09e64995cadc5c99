// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Every setting comes from the environment (a .env file is loaded first by
// main). The resulting AppConfig is built once at startup and shared through
// AppState; nothing else in the crate reads env vars.
//
// Optional collaborators:
//   - EMAIL_API_URL + EMAIL_API_KEY   -> HTTP mail relay, else log-only mailer
//   - UPLOADTHING_SECRET              -> file-store API, else log-only store
//
// ============================================================================

use std::env;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_EMAIL_FROM: &str = "IRC26 <no-reply@irc26.example>";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: String,
    pub port: u16,
    pub app_url: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub mail: Option<MailSettings>,
    pub email_from: String,
    pub uploadthing_secret: Option<String>,
    pub edit_token_ttl: Duration,
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mail = match (optional("EMAIL_API_URL"), optional("EMAIL_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(MailSettings { api_url, api_key }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_address: optional("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080)?,
            app_url: optional("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            mail,
            email_from: optional("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            uploadthing_secret: optional("UPLOADTHING_SECRET"),
            edit_token_ttl: Duration::days(parsed("EDIT_TOKEN_TTL_DAYS", 7)?),
            session_ttl: Duration::days(parsed("SESSION_TTL_DAYS", 30)?),
        })
    }

    /// True when `email` is the configured administrator address.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(email))
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
impl AppConfig {
    /// Config used by unit and route tests.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            app_url: DEFAULT_APP_URL.to_string(),
            admin_email: Some("admin@irc26.example".to_string()),
            admin_password: None,
            mail: None,
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            uploadthing_secret: None,
            edit_token_ttl: Duration::days(7),
            session_ttl: Duration::days(30),
        }
    }
}
