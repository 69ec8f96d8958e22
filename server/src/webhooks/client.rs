//! Interaction Webhook Client
//!
//! Thin `reqwest` wrapper around the three webhook endpoints an interaction
//! token unlocks. Messages with files are sent as multipart with the same
//! `files[<id>]` + `payload_json` layout the endpoint uses for responses.

use std::sync::Arc;
use std::time::Duration;

use hc_common::{attachment_id, Snowflake, WebhookMessage};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use super::types::WebhookError;
use crate::interactions::encode::{content_type_for, PAYLOAD_JSON_FIELD};

/// Request timeout for webhook calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the interaction webhook endpoints.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    api_base: Arc<str>,
    token: Option<Arc<str>>,
}

impl WebhookClient {
    /// Create a client for the given API base. An empty token sends no
    /// `Authorization` header (interaction tokens authorize on their own).
    pub fn new(api_base: &str, token: &str) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("httpcord (", env!("CARGO_PKG_VERSION"), ")"))
            .build()?;

        Ok(Self {
            http,
            api_base: Arc::from(api_base.trim_end_matches('/')),
            token: (!token.is_empty()).then(|| Arc::from(token)),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// PATCH `/webhooks/{application_id}/{token}/messages/@original`
    #[instrument(skip(self, interaction_token, message))]
    pub async fn edit_original(
        &self,
        application_id: Snowflake,
        interaction_token: &str,
        message: WebhookMessage,
    ) -> Result<Value, WebhookError> {
        let url = self.url(application_id, interaction_token, "/messages/@original");
        let request = self.with_message(self.request(Method::PATCH, &url), message)?;
        self.execute(request).await
    }

    /// DELETE `/webhooks/{application_id}/{token}/messages/@original`
    #[instrument(skip(self, interaction_token))]
    pub async fn delete_original(
        &self,
        application_id: Snowflake,
        interaction_token: &str,
    ) -> Result<(), WebhookError> {
        let url = self.url(application_id, interaction_token, "/messages/@original");
        self.execute(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    /// POST `/webhooks/{application_id}/{token}?wait=true`
    ///
    /// Returns the created message.
    #[instrument(skip(self, interaction_token, message))]
    pub async fn follow_up(
        &self,
        application_id: Snowflake,
        interaction_token: &str,
        message: WebhookMessage,
    ) -> Result<Value, WebhookError> {
        let url = self.url(application_id, interaction_token, "?wait=true");
        let request = self.with_message(self.request(Method::POST, &url), message)?;
        self.execute(request).await
    }

    fn url(&self, application_id: Snowflake, interaction_token: &str, suffix: &str) -> String {
        format!(
            "{}/webhooks/{application_id}/{interaction_token}{suffix}",
            self.api_base
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bot {token}")),
            None => request,
        }
    }

    fn with_message(
        &self,
        request: RequestBuilder,
        mut message: WebhookMessage,
    ) -> Result<RequestBuilder, WebhookError> {
        if message.files.is_empty() {
            return Ok(request.json(&message));
        }

        let files = std::mem::take(&mut message.files);
        message.attachments.clear();

        let mut form = Form::new();
        for (index, file) in files.iter().enumerate() {
            let id = attachment_id(index);
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.name.clone())
                .mime_str(&content_type_for(file))
                .map_err(|e| WebhookError::Attachment(format!("{}: {e}", file.name)))?;
            form = form.part(format!("files[{id}]"), part);
            message.attachments.push(file.attachment(id));
        }

        let payload = serde_json::to_string(&message)?;
        form = form.text(PAYLOAD_JSON_FIELD, payload);

        Ok(request.multipart(form))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, WebhookError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), "Webhook call succeeded");

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_include_application_and_token() {
        let client = WebhookClient::new("https://example.test/api/", "").unwrap();
        assert_eq!(client.api_base(), "https://example.test/api");
        assert_eq!(
            client.url(Snowflake(7), "tok", "/messages/@original"),
            "https://example.test/api/webhooks/7/tok/messages/@original"
        );
    }

    #[test]
    fn empty_token_means_no_authorization() {
        let client = WebhookClient::new("https://example.test", "").unwrap();
        assert!(client.token.is_none());

        let client = WebhookClient::new("https://example.test", "secret").unwrap();
        let request = client
            .request(Method::GET, "https://example.test/x")
            .build()
            .unwrap();
        assert_eq!(request.headers()["Authorization"], "Bot secret");
    }
}
