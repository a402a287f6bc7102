//! reqwest-backed webhook client.

use std::time::Duration;

use tracing::{debug, info};

use crate::{Notifier, NotifierConfig, NotifyError, NotifyPayload};

/// Posts payloads to a single configured webhook URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(config: &NotifierConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: config.url.trim().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// HEAD the webhook to confirm it exists before accepting traffic.
    pub async fn check(&self) -> Result<(), NotifyError> {
        let resp = self.client.head(&self.url).send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "webhook check");
        if status.as_u16() > 299 {
            return Err(NotifyError::Unreachable {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookClient {
    async fn post(&self, payload: &NotifyPayload) -> Result<(), NotifyError> {
        info!(username = %payload.username, "posting report to webhook");
        let resp = self.client.post(&self.url).json(payload).send().await?;
        let status = resp.status();
        if status.as_u16() > 299 {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(status = status.as_u16(), "webhook accepted report");
        Ok(())
    }
}
