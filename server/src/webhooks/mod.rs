//! Interaction Webhooks
//!
//! Out-of-band calls against the platform's interaction webhook: editing or
//! deleting the original response and sending follow-up messages. These are
//! how a handler finishes after a deferred response.

pub mod client;
pub mod types;

pub use client::WebhookClient;
pub use types::WebhookError;
