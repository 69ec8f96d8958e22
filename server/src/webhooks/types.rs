//! Webhook Types

use thiserror::Error;

/// Default REST API base for the platform.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Webhook errors.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook call failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to serialize webhook payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid attachment: {0}")]
    Attachment(String),
}

impl WebhookError {
    /// HTTP status returned by the platform, if the call got that far.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
