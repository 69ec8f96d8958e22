//! Connection
//!
//! Owns the handler registry and serves the interaction endpoint over one
//! of two transports. Handlers are registered before serving; the list is
//! frozen once [`Connection::serve`] (or a variant) takes the connection.

use std::future::{pending, Future};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use hc_crypto::{CryptoError, PublicKey};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::interactions::dispatch::handle_interaction;
use crate::interactions::{InteractionHandler, InteractionService, SharedHandler};
use crate::webhooks::{types::DEFAULT_API_BASE, WebhookClient, WebhookError};

/// Default request body cap (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// HTTP server implementation used to accept requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// `axum::serve` with graceful shutdown.
    #[default]
    Axum,
    /// Bare hyper connections driven by our own accept loop.
    Hyper,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown transport '{0}' (expected 'axum' or 'hyper')")]
pub struct ParseTransportError(String);

impl FromStr for Transport {
    type Err = ParseTransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axum" => Ok(Self::Axum),
            "hyper" => Ok(Self::Hyper),
            other => Err(ParseTransportError(other.to_string())),
        }
    }
}

/// Options for a [`Connection`].
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub transport: Transport,
    /// Hex-encoded Ed25519 application public key.
    pub public_key: String,
    /// Bot token for webhook calls. Empty disables the `Authorization` header.
    pub token: String,
    pub api_base: String,
    pub max_body_size: usize,
}

impl ConnectionOptions {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            transport: Transport::default(),
            public_key: public_key.into(),
            token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Invalid application public key: {0}")]
    InvalidPublicKey(#[from] CryptoError),
    #[error("Failed to build webhook client: {0}")]
    Client(#[from] WebhookError),
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// An interaction endpoint and its registered handlers.
pub struct Connection {
    transport: Transport,
    public_key: PublicKey,
    webhooks: WebhookClient,
    max_body_size: usize,
    handlers: Vec<SharedHandler>,
}

impl Connection {
    /// Validate the options and create a connection with no handlers.
    pub fn new(options: ConnectionOptions) -> Result<Self, ConnectionError> {
        let public_key = PublicKey::from_hex(&options.public_key)?;
        let webhooks = WebhookClient::new(&options.api_base, &options.token)?;

        Ok(Self {
            transport: options.transport,
            public_key,
            webhooks,
            max_body_size: options.max_body_size,
            handlers: Vec::new(),
        })
    }

    /// Append a handler. Handlers run in registration order.
    pub fn add_interaction_handler(&mut self, handler: impl InteractionHandler) -> &mut Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn webhooks(&self) -> &WebhookClient {
        &self.webhooks
    }

    /// Build the router serving this connection.
    ///
    /// `GET /health` answers liveness probes; every other path accepts
    /// interaction POSTs.
    pub fn router(&self) -> Router {
        let service = InteractionService::new(
            self.public_key,
            Arc::from(self.handlers.clone()),
            self.webhooks.clone(),
        );

        Router::new()
            .route("/health", get(health_check))
            .fallback_service(post(handle_interaction).with_state(service))
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(self.max_body_size))
    }

    /// Bind `address` and serve until the process exits.
    pub async fn connect(self, address: &str) -> Result<(), ConnectionError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ConnectionError::Bind {
                address: address.to_string(),
                source,
            })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until the process exits.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ConnectionError> {
        self.serve_with_shutdown(listener, pending()).await
    }

    /// Serve until `signal` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ConnectionError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            info!(
                address = %addr,
                transport = ?self.transport,
                handlers = self.handlers.len(),
                "Interaction endpoint listening"
            );
        }

        match self.transport {
            Transport::Axum => axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
                .map_err(ConnectionError::Serve),
            Transport::Hyper => serve_hyper(listener, router, signal).await,
        }
    }
}

/// Accept loop for [`Transport::Hyper`]. Stops accepting when `signal`
/// resolves; connections already accepted run to completion.
async fn serve_hyper<F>(listener: TcpListener, router: Router, signal: F) -> Result<(), ConnectionError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let mut signal = std::pin::pin!(signal);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) if is_connection_error(&e) => {
                    debug!(error = %e, "Dropped connection during accept");
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    return Err(ConnectionError::Serve(e));
                }
            },
            () = &mut signal => {
                info!("Shutting down interaction endpoint");
                return Ok(());
            }
        };

        let service = TowerToHyperService::new(router.clone());
        tokio::spawn(async move {
            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!(peer = %peer, error = %e, "Connection closed with error");
            }
        });
    }
}

/// Per-connection accept errors that do not affect the listener.
fn is_connection_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::ConnectionContext;

    const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn transport_parses_case_insensitively() {
        assert_eq!("axum".parse::<Transport>(), Ok(Transport::Axum));
        assert_eq!(" Hyper ".parse::<Transport>(), Ok(Transport::Hyper));
        assert!("fasthttp".parse::<Transport>().is_err());
        assert_eq!(Transport::default(), Transport::Axum);
    }

    #[test]
    fn invalid_public_key_is_rejected() {
        let result = Connection::new(ConnectionOptions::new("not-hex"));
        assert!(matches!(result, Err(ConnectionError::InvalidPublicKey(_))));

        let result = Connection::new(ConnectionOptions::new("abcd"));
        assert!(matches!(result, Err(ConnectionError::InvalidPublicKey(_))));
    }

    #[test]
    fn handlers_are_counted_in_order() {
        let mut connection = Connection::new(
            ConnectionOptions::new(PUBLIC_KEY).with_transport(Transport::Hyper),
        )
        .unwrap();
        connection
            .add_interaction_handler(|_ctx: ConnectionContext| async { anyhow::Ok(()) })
            .add_interaction_handler(|_ctx: ConnectionContext| async { anyhow::Ok(()) });

        assert_eq!(connection.handlers.len(), 2);
        assert_eq!(connection.transport(), Transport::Hyper);
        assert_eq!(connection.webhooks().api_base(), DEFAULT_API_BASE);
    }

    #[tokio::test]
    async fn connect_reports_bind_failures() {
        let connection = Connection::new(ConnectionOptions::new(PUBLIC_KEY)).unwrap();
        let err = connection.connect("not an address").await.unwrap_err();
        assert!(matches!(err, ConnectionError::Bind { .. }));
    }
}
