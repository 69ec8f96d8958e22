//! Request Errors

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::encode::EncodeError;

/// Reasons a single interaction request fails.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Missing or invalid signature.
    #[error("Invalid request signature")]
    Unauthorized,
    /// Authenticated body that is not a JSON object.
    #[error("Malformed interaction payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    /// The handlers' response could not be encoded.
    #[error("Failed to encode interaction response: {0}")]
    Encode(#[from] EncodeError),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            )
                .into_response(),
            Self::MalformedPayload(e) => {
                tracing::error!(error = %e, "Rejecting malformed interaction payload");
                close_connection(StatusCode::BAD_REQUEST)
            }
            Self::Encode(e) => {
                tracing::error!(error = %e, "Failed to encode interaction response");
                close_connection(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Empty response that asks the transport to drop the connection.
fn close_connection(status: StatusCode) -> Response {
    (
        status,
        [(header::CONNECTION, HeaderValue::from_static("close"))],
    )
        .into_response()
}
