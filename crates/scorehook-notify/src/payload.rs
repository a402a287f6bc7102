use serde::{Deserialize, Serialize};

/// Body POSTed to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyPayload {
    pub content: String,
    pub username: String,
    pub avatar_url: String,
}

/// Endpoint settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub url: String,
    pub avatar_url: String,
    /// Prepended to the submitter name to form the message author.
    pub title_prefix: String,
}

impl NotifierConfig {
    /// Wrap a rendered report for delivery, attributed to `name`.
    pub fn payload(&self, content: String, name: &str) -> NotifyPayload {
        NotifyPayload {
            content,
            username: format!("{} - {}", self.title_prefix, name),
            avatar_url: self.avatar_url.clone(),
        }
    }
}
