//! Connection Context
//!
//! Per-request value handed to every handler. Carries the resolved
//! interaction, a one-shot responder bound to this request, and the webhook
//! client for follow-up work.

use std::sync::{Arc, Mutex, PoisonError};

use hc_common::{
    CommandChoice, Interaction, InteractionCallbackData, InteractionResponse,
    InteractionResponseType, WebhookMessage,
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::webhooks::{WebhookClient, WebhookError};

/// Errors returned by the reply primitives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyError {
    /// A response was already sent for this request; nothing was written.
    #[error("A response was already sent for this interaction")]
    AlreadySent,
    /// The request is gone (client disconnected or dispatcher dropped).
    #[error("The interaction request is no longer waiting for a response")]
    Closed,
}

/// One-shot response slot shared by all clones of a context.
#[derive(Debug, Clone)]
pub struct Responder {
    slot: Arc<Mutex<Option<oneshot::Sender<InteractionResponse>>>>,
}

impl Responder {
    /// Create a responder and the receiver the dispatcher waits on.
    pub fn channel() -> (Self, oneshot::Receiver<InteractionResponse>) {
        let (tx, rx) = oneshot::channel();
        let responder = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (responder, rx)
    }

    /// Send the response. Only the first call has any effect.
    pub fn send(&self, response: InteractionResponse) -> Result<(), ReplyError> {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ReplyError::AlreadySent)?;

        sender.send(response).map_err(|_| ReplyError::Closed)
    }

    /// Whether a response has been sent (or the slot otherwise consumed).
    pub fn is_sent(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Context for a single interaction request.
///
/// Cheap to clone; clones share the responder, so the request still gets
/// exactly one response no matter which clone replies.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    interaction: Arc<Interaction>,
    responder: Responder,
    webhooks: WebhookClient,
}

impl ConnectionContext {
    /// Create a context and the receiver for its response.
    pub fn new(
        interaction: Interaction,
        webhooks: WebhookClient,
    ) -> (Self, oneshot::Receiver<InteractionResponse>) {
        let (responder, rx) = Responder::channel();
        let ctx = Self {
            interaction: Arc::new(interaction),
            responder,
            webhooks,
        };
        (ctx, rx)
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn webhooks(&self) -> &WebhookClient {
        &self.webhooks
    }

    /// Whether this request already has its response.
    pub fn has_replied(&self) -> bool {
        self.responder.is_sent()
    }

    /// Send a raw response for this request.
    pub fn send_response(&self, response: InteractionResponse) -> Result<(), ReplyError> {
        self.responder.send(response)
    }

    /// Reply with a message.
    pub fn reply(&self, data: InteractionCallbackData) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::with_data(
            InteractionResponseType::ChannelMessageWithSource,
            data,
        ))
    }

    /// Acknowledge now and reply later with [`Self::edit_reply`] or
    /// [`Self::follow_up`].
    pub fn defer_reply(&self) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::bare(
            InteractionResponseType::DeferredChannelMessageWithSource,
        ))
    }

    /// Acknowledge a component interaction and edit its message later.
    pub fn defer_update(&self) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::bare(
            InteractionResponseType::DeferredUpdateMessage,
        ))
    }

    /// Replace the message a component is attached to.
    pub fn update_message(&self, data: InteractionCallbackData) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::with_data(
            InteractionResponseType::UpdateMessage,
            data,
        ))
    }

    /// Answer an autocomplete interaction.
    pub fn autocomplete(&self, choices: Vec<CommandChoice>) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::with_data(
            InteractionResponseType::ApplicationCommandAutocompleteResult,
            InteractionCallbackData {
                choices,
                ..InteractionCallbackData::default()
            },
        ))
    }

    /// Open a modal. Build `data` with [`InteractionCallbackData::modal`].
    pub fn show_modal(&self, data: InteractionCallbackData) -> Result<(), ReplyError> {
        self.send_response(InteractionResponse::with_data(
            InteractionResponseType::Modal,
            data,
        ))
    }

    /// Edit the original response.
    pub async fn edit_reply(&self, message: WebhookMessage) -> Result<Value, WebhookError> {
        self.webhooks
            .edit_original(
                self.interaction.application_id,
                &self.interaction.token,
                message,
            )
            .await
    }

    /// Delete the original response.
    pub async fn delete_reply(&self) -> Result<(), WebhookError> {
        self.webhooks
            .delete_original(self.interaction.application_id, &self.interaction.token)
            .await
    }

    /// Send a follow-up message. Returns the created message.
    pub async fn follow_up(&self, message: WebhookMessage) -> Result<Value, WebhookError> {
        self.webhooks
            .follow_up(
                self.interaction.application_id,
                &self.interaction.token,
                message,
            )
            .await
    }
}
