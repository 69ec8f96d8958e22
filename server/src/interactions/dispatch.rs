//! Request Handler
//!
//! Per-request state machine:
//!
//! ```text
//! Received -> Authenticated -> Resolved -> Handshake   (ping: pong, no handlers)
//!                                       -> Dispatched  (handlers, first reply wins)
//! ```
//!
//! Handlers run on their own task so a handler can defer, keep working, and
//! finish through the webhook while the deferral is already on the wire.
//! The request is answered with 204 as soon as the chain returns without a
//! reply, even if a handler moved a context clone into another task; a reply
//! made after that fails with [`ReplyError::Closed`].
//!
//! [`ReplyError::Closed`]: super::context::ReplyError::Closed

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hc_common::{resolve, InteractionResponse, RawInteraction};
use hc_crypto::{verify_request, PublicKey};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn, Instrument, Span};

use super::context::ConnectionContext;
use super::encode::{encode, EncodeError};
use super::error::RequestError;
use super::handler::SharedHandler;
use crate::webhooks::WebhookClient;

/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Verifies, resolves and dispatches interaction requests.
#[derive(Clone)]
pub struct InteractionService {
    inner: Arc<Inner>,
}

struct Inner {
    public_key: PublicKey,
    handlers: Arc<[SharedHandler]>,
    webhooks: WebhookClient,
}

impl InteractionService {
    /// Build the service. The handler list is fixed from here on.
    pub fn new(
        public_key: PublicKey,
        handlers: Arc<[SharedHandler]>,
        webhooks: WebhookClient,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                public_key,
                handlers,
                webhooks,
            }),
        }
    }

    /// Handle one request from its headers and complete body.
    #[instrument(
        name = "interaction",
        skip_all,
        fields(interaction_id, kind)
    )]
    pub async fn handle(&self, headers: &HeaderMap, body: Bytes) -> Result<Response, RequestError> {
        let signature = header_str(headers, SIGNATURE_HEADER);
        let timestamp = header_str(headers, TIMESTAMP_HEADER);

        if !verify_request(
            timestamp.as_bytes(),
            &body,
            signature,
            &self.inner.public_key,
        ) {
            debug!("Rejected request with invalid signature");
            return Err(RequestError::Unauthorized);
        }

        let raw: RawInteraction = serde_json::from_slice(&body)?;
        let interaction = resolve(&raw);

        let span = Span::current();
        span.record("interaction_id", tracing::field::display(interaction.id));
        span.record("kind", tracing::field::display(interaction.kind));

        if interaction.is_ping() {
            debug!("Answering handshake");
            return respond(InteractionResponse::pong());
        }

        let (ctx, mut rx) = ConnectionContext::new(interaction, self.inner.webhooks.clone());
        let chain = spawn_handlers(Arc::clone(&self.inner.handlers), ctx);

        // Clones kept alive past the chain (e.g. moved into a spawned task)
        // do not hold the request open.
        let response = tokio::select! {
            biased;
            response = &mut rx => response.ok(),
            _ = chain => rx.try_recv().ok(),
        };

        match response {
            Some(response) => {
                info!(response_type = ?response.kind, "Sending interaction response");
                respond(response)
            }
            None => {
                warn!("No handler replied to interaction");
                Ok(StatusCode::NO_CONTENT.into_response())
            }
        }
    }
}

/// Run every handler in registration order on a separate task.
///
/// The chain is wrapped in a second task so a panicking handler is logged
/// instead of silently dropping the request's responder. The returned handle
/// completes when the chain has finished or panicked.
fn spawn_handlers(handlers: Arc<[SharedHandler]>, ctx: ConnectionContext) -> JoinHandle<()> {
    let span = Span::current();

    tokio::spawn(
        async move {
            let chain = tokio::spawn(
                async move {
                    for (index, handler) in handlers.iter().enumerate() {
                        if let Err(e) = handler.handle(ctx.clone()).await {
                            error!(handler = index, error = %e, "Interaction handler failed");
                        }
                    }
                }
                .in_current_span(),
            );

            if let Err(e) = chain.await {
                error!(error = %e, "Interaction handler panicked");
            }
        }
        .instrument(span),
    )
}

fn respond(response: InteractionResponse) -> Result<Response, RequestError> {
    let encoded = encode(response)?;
    let content_type =
        HeaderValue::from_str(&encoded.content_type).map_err(EncodeError::from)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        encoded.body,
    )
        .into_response())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// POST handler bound to the router.
pub async fn handle_interaction(
    State(service): State<InteractionService>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RequestError> {
    service.handle(&headers, body).await
}
