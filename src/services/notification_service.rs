// Outgoing emails. Sending is best effort: failures are logged and never
// reach the caller.

use crate::config::AppConfig;
use crate::outbound::{Email, Mailer};

pub struct NotificationService;

impl NotificationService {
    pub fn manage_url(config: &AppConfig, token: &str) -> String {
        format!("{}/manage?token={}", config.app_url.trim_end_matches('/'), token)
    }

    /// The magic link that opens the owner's manage page.
    pub async fn send_manage_link(mailer: &dyn Mailer, config: &AppConfig, to: &str, token: &str) {
        let url = Self::manage_url(config, token);
        let email = Email {
            to: to.to_string(),
            subject: "Manage your IRC26 pledges and confirmations".to_string(),
            html: format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Thanks for taking part in IRC26!</h2>\
                 <p>Use this link to view and edit everything you have sent us:</p>\
                 <p><a href=\"{url}\">Manage my entries</a></p>\
                 <p style=\"color: #666; font-size: 12px;\">The link is valid for {days} days.<br>{url}</p>\
                 </div>",
                days = config.edit_token_ttl.num_days(),
            ),
            text: format!(
                "Thanks for taking part in IRC26!\n\nManage your entries here: {url}\n\nThe link is valid for {} days.",
                config.edit_token_ttl.num_days()
            ),
        };

        Self::deliver(mailer, email).await;
    }

    pub async fn send_submission_received(
        mailer: &dyn Mailer,
        config: &AppConfig,
        to: &str,
        submission_id: i32,
        cache_name: &str,
    ) {
        let url = format!("{}/submission/{}/edit", config.app_url.trim_end_matches('/'), submission_id);
        let escaped_name = escape_html(cache_name);
        let email = Email {
            to: to.to_string(),
            subject: "Your IRC26 Submission Has Been Received".to_string(),
            html: format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Thank you for submitting {escaped_name} for IRC26!</h2>\
                 <p>Your submission has been received and recorded.</p>\
                 <p><a href=\"{url}\">Edit Your Submission</a></p>\
                 </div>"
            ),
            text: format!(
                "Thank you for submitting {cache_name} for IRC26!\n\nYou can edit your submission here: {url}"
            ),
        };

        Self::deliver(mailer, email).await;
    }

    async fn deliver(mailer: &dyn Mailer, email: Email) {
        let subject = email.subject.clone();
        if let Err(error) = mailer.send(email).await {
            tracing::warn!(%error, %subject, "email could not be sent");
        }
    }
}

/// User text placed inside an HTML body.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
