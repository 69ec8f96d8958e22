//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building signed interaction requests and sending
//! them through the full axum router, plus utilities for reading JSON and
//! multipart response bodies.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] when a test needs a real socket, and
//! [`spawn_webhook_capture()`] for a fake platform API that records webhook
//! calls made by handlers.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, State};
use axum::http::{self, header, HeaderMap, Method, Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use httpcord_server::interactions::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use httpcord_server::{Connection, ConnectionOptions};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Timestamp used for every signed request.
pub const TIMESTAMP: &str = "1700000000";

// ============================================================================
// Signing
// ============================================================================

/// Fresh application keypair.
pub fn signing_key() -> SigningKey {
    SigningKey::generate(&mut rand::thread_rng())
}

/// Hex public key for a signing key.
pub fn public_key_hex(key: &SigningKey) -> String {
    hex::encode(key.verifying_key().as_bytes())
}

/// Hex signature over `timestamp ‖ body`.
pub fn sign(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(key.sign(&message).to_bytes())
}

// ============================================================================
// TestApp
// ============================================================================

/// Router for a configured [`Connection`] plus the key that signs requests.
pub struct TestApp {
    pub router: Router,
    pub key: SigningKey,
}

impl TestApp {
    /// Build an app; `configure` registers handlers on the connection.
    pub fn new(configure: impl FnOnce(&mut Connection)) -> Self {
        Self::with_options(|options| options, configure)
    }

    /// Build an app whose webhook client talks to `api_base`.
    pub fn with_api_base(api_base: &str, configure: impl FnOnce(&mut Connection)) -> Self {
        let api_base = api_base.to_string();
        Self::with_options(move |options| options.with_api_base(api_base), configure)
    }

    /// Build an app with adjusted connection options.
    pub fn with_options(
        options: impl FnOnce(ConnectionOptions) -> ConnectionOptions,
        configure: impl FnOnce(&mut Connection),
    ) -> Self {
        let key = signing_key();
        let options = options(ConnectionOptions::new(public_key_hex(&key)));
        let mut connection = Connection::new(options).expect("Failed to create connection");
        configure(&mut connection);

        Self {
            router: connection.router(),
            key,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// POST `body` to `/` with a valid signature.
    pub fn signed_request(&self, body: &Value) -> Request<Body> {
        let body = serde_json::to_vec(body).expect("Failed to serialize body");
        self.signed_raw(body)
    }

    /// POST raw bytes to `/` with a valid signature.
    pub fn signed_raw(&self, body: Vec<u8>) -> Request<Body> {
        let signature = sign(&self.key, TIMESTAMP, &body);
        Self::request(Method::POST, "/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .header(TIMESTAMP_HEADER, TIMESTAMP)
            .body(Body::from(body))
            .expect("Failed to build request")
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Sign and send an interaction body.
    pub async fn send(&self, body: Value) -> Response<Body> {
        let request = self.signed_request(&body);
        self.oneshot(request).await
    }
}

// ============================================================================
// Interaction bodies
// ============================================================================

pub fn ping() -> Value {
    json!({ "type": 1, "id": "100", "application_id": "200", "token": "tok", "version": 1 })
}

pub fn command(name: &str) -> Value {
    json!({
        "type": 2,
        "id": "101",
        "application_id": "200",
        "token": "command-token",
        "version": 1,
        "data": { "id": "300", "name": name, "type": 1 },
        "member": { "user": { "id": "400", "username": "alice" }, "roles": [] }
    })
}

pub fn component(custom_id: &str) -> Value {
    json!({
        "type": 3,
        "id": "102",
        "application_id": "200",
        "token": "component-token",
        "version": 1,
        "data": { "custom_id": custom_id, "component_type": 2 },
        "user": { "id": "401", "username": "bob" }
    })
}

// ============================================================================
// Test Servers
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub url: String,
    _handle: JoinHandle<()>,
}

/// Serve `router` on `127.0.0.1:0`.
///
/// # Example
///
/// ```ignore
/// let server = spawn_test_server(app.router.clone()).await;
///
/// let client = reqwest::Client::new();
/// let resp = client.get(format!("{}/health", server.url)).send().await?;
/// ```
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}

/// Webhook call recorded by [`spawn_webhook_capture()`].
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedCall {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Captured body is not JSON")
    }
}

/// Fake platform API. Every call is forwarded on the returned channel;
/// DELETE answers 204 and everything else echoes a message object.
pub async fn spawn_webhook_capture() -> (TestServer, mpsc::UnboundedReceiver<CapturedCall>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new().fallback(capture).with_state(tx);
    (spawn_test_server(router).await, rx)
}

async fn capture(
    State(tx): State<mpsc::UnboundedSender<CapturedCall>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let is_delete = method == Method::DELETE;
    let _ = tx.send(CapturedCall {
        method,
        uri,
        headers,
        body,
    });

    if is_delete {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(json!({ "id": "900", "content": "captured" })).into_response()
    }
}

/// Wait for the next captured call.
pub async fn next_call(rx: &mut mpsc::UnboundedReceiver<CapturedCall>) -> CapturedCall {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timed out waiting for webhook call")
        .expect("Capture server closed")
}

// ============================================================================
// Body helpers
// ============================================================================

pub async fn body_to_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes()
}

pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = body_to_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// One decoded multipart part.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Decode a `multipart/form-data` body with axum's own extractor.
pub async fn parse_multipart(content_type: &str, body: Bytes) -> Vec<Part> {
    let request = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("Failed to build multipart request");

    let mut multipart = Multipart::from_request(request, &())
        .await
        .expect("Body is not multipart/form-data");

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("Invalid multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("Failed to read multipart field");
        parts.push(Part {
            name,
            filename,
            content_type,
            data,
        });
    }
    parts
}

/// Split a response into its content type and decoded multipart parts.
pub async fn response_parts(response: Response<Body>) -> Vec<Part> {
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type: {content_type}"
    );
    let body = body_to_bytes(response).await;
    parse_multipart(&content_type, body).await
}
