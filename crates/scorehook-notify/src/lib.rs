//! Notification sink: payload shape, static endpoint configuration, and the
//! webhook transport.

mod payload;
pub use payload::{NotifierConfig, NotifyPayload};

#[cfg(feature = "http")]
pub mod webhook;

#[cfg(feature = "http")]
pub use webhook::WebhookClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to send scores to webhook ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Webhook url not reachable ({status})")]
    Unreachable { status: u16 },
}

/// Delivers a rendered report somewhere a human will see it.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, payload: &NotifyPayload) -> Result<(), NotifyError>;
}
