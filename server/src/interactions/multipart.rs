//! Multipart Form Writer
//!
//! Builds a `multipart/form-data` body in memory. The whole body is assembled
//! before anything is handed to the transport, so a failed part never leaks a
//! partial response.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while writing a form.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MultipartError {
    /// A field name or filename would break the part headers.
    #[error("Invalid characters in multipart header value: {0:?}")]
    InvalidHeaderValue(String),
}

/// In-memory `multipart/form-data` writer.
#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: BytesMut,
    has_parts: bool,
}

impl MultipartWriter {
    /// Create a writer with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(Uuid::new_v4().simple().to_string())
    }

    /// Create a writer with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: BytesMut::new(),
            has_parts: false,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header of the whole body.
    pub fn form_data_content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Write a file part.
    pub fn write_file(
        &mut self,
        field: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), MultipartError> {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape(field)?,
            escape(filename)?
        );
        self.begin_part(&disposition, Some(content_type))?;
        self.buf.put_slice(data);
        Ok(())
    }

    /// Start a plain form field and return a writer for its value.
    pub fn create_field(&mut self, name: &str) -> Result<impl io::Write + '_, MultipartError> {
        let disposition = format!("form-data; name=\"{}\"", escape(name)?);
        self.begin_part(&disposition, None)?;
        Ok((&mut self.buf).writer())
    }

    /// Write the closing boundary and return the body.
    pub fn finish(mut self) -> Bytes {
        if self.has_parts {
            self.buf.put_slice(b"\r\n");
        }
        self.buf.put_slice(b"--");
        self.buf.put_slice(self.boundary.as_bytes());
        self.buf.put_slice(b"--\r\n");
        self.buf.freeze()
    }

    fn begin_part(
        &mut self,
        disposition: &str,
        content_type: Option<&str>,
    ) -> Result<(), MultipartError> {
        if let Some(ct) = content_type {
            check_header_value(ct)?;
        }

        if self.has_parts {
            self.buf.put_slice(b"\r\n");
        }
        self.has_parts = true;

        self.buf.put_slice(b"--");
        self.buf.put_slice(self.boundary.as_bytes());
        self.buf.put_slice(b"\r\nContent-Disposition: ");
        self.buf.put_slice(disposition.as_bytes());
        if let Some(ct) = content_type {
            self.buf.put_slice(b"\r\nContent-Type: ");
            self.buf.put_slice(ct.as_bytes());
        }
        self.buf.put_slice(b"\r\n\r\n");
        Ok(())
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn check_header_value(value: &str) -> Result<(), MultipartError> {
    if value.chars().any(char::is_control) {
        return Err(MultipartError::InvalidHeaderValue(value.to_string()));
    }
    Ok(())
}

/// Backslash-escape `\` and `"` for a quoted header parameter.
fn escape(value: &str) -> Result<String, MultipartError> {
    check_header_value(value)?;
    Ok(value.replace('\\', "\\\\").replace('"', "\\\""))
}
