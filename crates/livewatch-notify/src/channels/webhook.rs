use crate::error::{NotifyError, Result};
use crate::{Notification, NotificationChannel};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

const MAX_BODY_LENGTH: usize = 512;

/// POSTs each notification as JSON to a fixed URL.
pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    /// Fails with [`NotifyError::Other`] unless `url` is an absolute
    /// `http`/`https` URL.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| NotifyError::Other(format!("invalid webhook url '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NotifyError::Other(format!(
                "webhook url '{url}' must use http or https"
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn render_body(notification: &Notification) -> serde_json::Value {
        serde_json::json!({
            "level": notification.level.to_string(),
            "content": notification.content,
            "duration_ms": notification.duration_ms,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let body = serde_json::to_string(&Self::render_body(notification))?;
        let resp = self
            .client
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match resp.text().await {
            Ok(text) => text.chars().take(MAX_BODY_LENGTH).collect(),
            Err(e) => format!("[Failed to read response body: {e}]"),
        };
        Err(NotifyError::Api {
            service: "webhook".to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}
