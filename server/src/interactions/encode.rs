//! Response Encoder
//!
//! Chooses between the two wire formats for an [`InteractionResponse`]:
//!
//! - plain JSON, for everything without files
//! - `multipart/form-data`, for message replies and message updates that
//!   carry files: one `files[<id>]` part per file followed by a
//!   `payload_json` field with the full response

use bytes::Bytes;
use hc_common::{attachment_id, File, InteractionResponse};
use thiserror::Error;

use super::multipart::{MultipartError, MultipartWriter};

/// Field holding the JSON response in a multipart body.
pub const PAYLOAD_JSON_FIELD: &str = "payload_json";

/// Errors raised while encoding a response. Always fatal for the request.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to build multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Invalid content type: {0}")]
    ContentType(#[from] axum::http::header::InvalidHeaderValue),
}

/// Fully encoded response body.
#[derive(Debug, Clone)]
pub struct EncodedResponse {
    /// Value for the `Content-Type` header.
    pub content_type: String,
    pub body: Bytes,
}

impl EncodedResponse {
    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with("multipart/form-data")
    }
}

/// Encode a response for the wire.
pub fn encode(response: InteractionResponse) -> Result<EncodedResponse, EncodeError> {
    if response.needs_multipart() {
        encode_multipart(response)
    } else {
        encode_json(&response)
    }
}

fn encode_json(response: &InteractionResponse) -> Result<EncodedResponse, EncodeError> {
    Ok(EncodedResponse {
        content_type: mime_json(),
        body: serde_json::to_vec(response)?.into(),
    })
}

/// The attachments list is rebuilt from the files, so it always has one
/// entry per file with ids `1..=N` in file order. It is complete before
/// `payload_json` is serialized.
fn encode_multipart(mut response: InteractionResponse) -> Result<EncodedResponse, EncodeError> {
    let mut writer = MultipartWriter::new();

    if let Some(data) = response.data.as_mut() {
        let files = std::mem::take(&mut data.files);
        data.attachments.clear();

        for (index, file) in files.iter().enumerate() {
            let id = attachment_id(index);
            writer.write_file(
                &format!("files[{id}]"),
                &file.name,
                &content_type_for(file),
                &file.data,
            )?;
            data.attachments.push(file.attachment(id));
        }
    }

    let field = writer.create_field(PAYLOAD_JSON_FIELD)?;
    serde_json::to_writer(field, &response)?;

    Ok(EncodedResponse {
        content_type: writer.form_data_content_type(),
        body: writer.finish(),
    })
}

/// Declared content type, or a guess from the file extension.
pub fn content_type_for(file: &File) -> String {
    file.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    })
}

fn mime_json() -> String {
    mime_guess::mime::APPLICATION_JSON.essence_str().to_string()
}
