//! Partner notification over the EmailJS REST relay.
//!
//! Notifications are best-effort. Missing settings disable the notifier
//! entirely; sends become logged no-ops and never block or fail the request
//! that triggered them.

use serde_json::json;

/// EmailJS send endpoint.
const EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Body used when the caller does not supply one.
pub const DEFAULT_NOTIFICATION_MESSAGE: &str = "A new memory has been posted!";

/// Credentials for the EmailJS template used for partner mail.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("relay rejected notification ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Fire-and-forget mail notifier.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    client: reqwest::Client,
    settings: Option<EmailSettings>,
}

impl EmailNotifier {
    #[must_use]
    pub fn new(settings: Option<EmailSettings>) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    /// Tell the partner a new memory exists.
    pub async fn memory_posted(
        &self,
        to_email: &str,
        from_name: &str,
        link: &str,
        message: Option<&str>,
    ) -> Result<(), NotifyError> {
        let Some(settings) = &self.settings else {
            tracing::warn!("EmailJS settings missing, notification not sent");
            return Ok(());
        };

        let body = json!({
            "service_id": settings.service_id,
            "template_id": settings.template_id,
            "user_id": settings.public_key,
            "template_params": {
                "to_email": to_email,
                "from_name": from_name,
                "link": link,
                "message": message.unwrap_or(DEFAULT_NOTIFICATION_MESSAGE),
            }
        });

        let response = self
            .client
            .post(EMAILJS_API_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::info!(to = %to_email, "partner notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_tracks_settings_presence() {
        assert!(!EmailNotifier::new(None).is_configured());
        assert!(
            EmailNotifier::new(Some(EmailSettings {
                service_id: "svc".to_string(),
                template_id: "tpl".to_string(),
                public_key: "key".to_string(),
            }))
            .is_configured()
        );
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_a_quiet_no_op() {
        let notifier = EmailNotifier::new(None);
        notifier
            .memory_posted("partner@example.com", "Alice", "https://example.test/m/1", None)
            .await
            .unwrap();
    }
}
