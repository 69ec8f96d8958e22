//! Interaction Responses
//!
//! Outbound payloads. Binary [`File`]s ride alongside the JSON and are never
//! serialized into it; the encoder turns each one into an [`Attachment`]
//! reference before the payload is written.

use bitflags::bitflags;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::locale::Dictionary;
use super::snowflake::Snowflake;

/// Response kind discriminant (the `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum InteractionResponseType {
    /// Handshake acknowledgement.
    Pong = 1,
    /// Reply with a message.
    ChannelMessageWithSource = 4,
    /// Acknowledge now, send the message later through the webhook.
    DeferredChannelMessageWithSource = 5,
    /// Acknowledge a component interaction, edit the message later.
    DeferredUpdateMessage = 6,
    /// Edit the message the component was attached to.
    UpdateMessage = 7,
    /// Autocomplete suggestions.
    ApplicationCommandAutocompleteResult = 8,
    /// Open a modal.
    Modal = 9,
}

impl InteractionResponseType {
    /// Whether the response creates or replaces message content, i.e. can
    /// carry files.
    #[must_use]
    pub const fn carries_message(self) -> bool {
        matches!(self, Self::ChannelMessageWithSource | Self::UpdateMessage)
    }
}

impl From<InteractionResponseType> for u8 {
    fn from(kind: InteractionResponseType) -> Self {
        kind as Self
    }
}

impl TryFrom<u8> for InteractionResponseType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Pong),
            4 => Ok(Self::ChannelMessageWithSource),
            5 => Ok(Self::DeferredChannelMessageWithSource),
            6 => Ok(Self::DeferredUpdateMessage),
            7 => Ok(Self::UpdateMessage),
            8 => Ok(Self::ApplicationCommandAutocompleteResult),
            9 => Ok(Self::Modal),
            other => Err(format!("unknown interaction response type {other}")),
        }
    }
}

bitflags! {
    /// Message flags settable from an interaction response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u64 {
        const SUPPRESS_EMBEDS = 1 << 2;
        const EPHEMERAL = 1 << 6;
        const SUPPRESS_NOTIFICATIONS = 1 << 12;
    }
}

impl Serialize for MessageFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for MessageFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

/// Binary file sent with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File name shown to users.
    pub name: String,
    /// MIME type; guessed from the name when absent.
    pub content_type: Option<String>,
    /// Alt text.
    pub description: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl File {
    /// Create a file from a name and its contents.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            description: None,
            data: data.into(),
        }
    }

    /// Declare the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the alt text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// JSON-side reference to this file under the given attachment id.
    pub fn attachment(&self, id: Snowflake) -> Attachment {
        Attachment {
            id,
            filename: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Reference from the JSON payload to a multipart file part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Attachment id for the file at `index` (ids start at 1).
#[must_use]
pub const fn attachment_id(index: usize) -> Snowflake {
    Snowflake(index as u64 + 1)
}

/// Which mentions in the content actually notify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMentions {
    /// Mention kinds to parse: `roles`, `users`, `everyone`.
    #[serde(default)]
    pub parse: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<Snowflake>,
    #[serde(default)]
    pub replied_user: bool,
}

impl AllowedMentions {
    /// Suppress every mention.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Rich embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// Autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Dictionary>,
    pub value: Value,
}

/// Data of a callback response.
///
/// Covers message responses, autocomplete results (`choices`) and modals
/// (`custom_id`, `title`, `components`). Empty fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionCallbackData {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<MessageFlags>,
    /// Component rows, passed through as JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip)]
    pub files: Vec<File>,
}

impl InteractionCallbackData {
    /// Plain text message.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Modal form.
    pub fn modal(custom_id: impl Into<String>, title: impl Into<String>, components: Vec<Value>) -> Self {
        Self {
            custom_id: Some(custom_id.into()),
            title: Some(title.into()),
            components,
            ..Self::default()
        }
    }

    /// Add an embed.
    #[must_use]
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }

    /// Only show the message to the invoking user.
    #[must_use]
    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or_default() | MessageFlags::EPHEMERAL);
        self
    }
}

/// Response to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionCallbackData>,
}

impl InteractionResponse {
    /// Handshake acknowledgement.
    #[must_use]
    pub const fn pong() -> Self {
        Self {
            kind: InteractionResponseType::Pong,
            data: None,
        }
    }

    /// Response of the given kind with no data.
    #[must_use]
    pub const fn bare(kind: InteractionResponseType) -> Self {
        Self { kind, data: None }
    }

    /// Response of the given kind carrying data.
    #[must_use]
    pub const fn with_data(kind: InteractionResponseType, data: InteractionCallbackData) -> Self {
        Self {
            kind,
            data: Some(data),
        }
    }

    /// Files carried by the response, if any.
    pub fn files(&self) -> &[File] {
        self.data
            .as_ref()
            .map(|d| d.files.as_slice())
            .unwrap_or_default()
    }

    /// Whether the response must be sent as multipart: a message-carrying
    /// kind with at least one file.
    #[must_use]
    pub fn needs_multipart(&self) -> bool {
        self.kind.carries_message() && !self.files().is_empty()
    }
}

/// Message body for the out-of-band webhook calls (edit original response,
/// follow-up message).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<MessageFlags>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip)]
    pub files: Vec<File>,
}

impl WebhookMessage {
    /// Plain text message.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }
}

impl From<InteractionCallbackData> for WebhookMessage {
    fn from(data: InteractionCallbackData) -> Self {
        Self {
            content: data.content,
            embeds: data.embeds,
            allowed_mentions: data.allowed_mentions,
            flags: data.flags,
            components: data.components,
            attachments: data.attachments,
            files: data.files,
        }
    }
}
