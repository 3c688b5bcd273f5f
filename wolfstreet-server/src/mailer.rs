//! Transactional e-mail delivery for calendar invites.

use serde::Serialize;
use tracing::{info, warn};
use wolfstreet_core::config::MailConfig;
use wolfstreet_core::{WolfStreetError, WolfStreetResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Base64-encoded file contents
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    config: MailConfig,
}

impl Mailer {
    pub fn new(http: reqwest::Client, config: MailConfig) -> Self {
        Mailer { http, config }
    }

    pub fn from_address(&self) -> &str {
        &self.config.from
    }

    pub async fn send(&self, mail: &OutgoingMail) -> WolfStreetResult<()> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Err(WolfStreetError::SetupRequired(
                "Invite e-mail is not configured (mail.endpoint)".into(),
            ));
        };

        let mut request = self.http.post(endpoint).json(mail);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(to = ?mail.to, error = %e, "mail API unreachable");
            WolfStreetError::Remote(format!("Mail API unreachable: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(to = ?mail.to, %status, "mail API rejected message");
            return Err(WolfStreetError::Remote(format!(
                "Mail API returned {status}: {body}"
            )));
        }

        info!(to = ?mail.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}
