//! Interactions
//!
//! [`RawInteraction`] mirrors the JSON body exactly as received and is
//! deliberately loose: every field is optional and nested objects stay as
//! [`serde_json::Value`]. [`resolve`] projects it into a typed [`Interaction`]
//! without ever failing, since the body has been authenticated but its schema
//! has not been validated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::locale::Locale;
use super::snowflake::Snowflake;
use super::user::{Member, User};

/// Interaction kind discriminant (the `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionType {
    /// Liveness handshake sent when the endpoint is registered.
    Ping,
    /// Slash, user or message command.
    ApplicationCommand,
    /// Button press or select menu choice.
    MessageComponent,
    /// Partial command input awaiting suggestions.
    Autocomplete,
    /// Modal form submission.
    ModalSubmit,
    /// Missing, non-numeric, or unrecognized discriminant.
    Unknown(u64),
}

impl InteractionType {
    /// Numeric wire value.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::Autocomplete => 4,
            Self::ModalSubmit => 5,
            Self::Unknown(code) => code,
        }
    }

    /// Map a raw `type` value. Anything that is not a known integer is
    /// `Unknown`, with `0` standing in for non-integers.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        value.as_u64().map_or(Self::Unknown(0), Self::from)
    }
}

impl From<u64> for InteractionType {
    fn from(code: u64) -> Self {
        match code {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl Serialize for InteractionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.code())
    }
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ping => f.write_str("ping"),
            Self::ApplicationCommand => f.write_str("application_command"),
            Self::MessageComponent => f.write_str("message_component"),
            Self::Autocomplete => f.write_str("autocomplete"),
            Self::ModalSubmit => f.write_str("modal_submit"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Interaction body as received over HTTP.
///
/// Fields stay untyped so a value of the wrong JSON type never rejects the
/// whole body; [`resolve`] drops what it cannot interpret.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInteraction {
    pub id: Option<Value>,
    pub application_id: Option<Value>,
    #[serde(rename = "type", default)]
    pub kind: Value,
    pub data: Option<Value>,
    pub guild_id: Option<Value>,
    pub channel_id: Option<Value>,
    pub member: Option<Value>,
    pub user: Option<Value>,
    pub token: Option<Value>,
    #[serde(default)]
    pub version: Value,
    pub message: Option<Value>,
    pub app_permissions: Option<Value>,
    pub locale: Option<Value>,
    pub guild_locale: Option<Value>,
}

/// Option passed to a command, as sent by the platform.
///
/// Values are left as JSON; interpreting them is up to the handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub focused: bool,
}

/// Payload of command and autocomplete interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub id: Snowflake,
    pub name: String,
    /// Command kind: 1 chat input, 2 user, 3 message.
    #[serde(rename = "type", default = "default_command_kind")]
    pub kind: u8,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<Snowflake>,
}

const fn default_command_kind() -> u8 {
    1
}

/// Payload of component interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: u8,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Payload of modal submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSubmitData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<Value>,
}

/// Type-specific interaction payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    ApplicationCommand(CommandData),
    Autocomplete(CommandData),
    MessageComponent(ComponentData),
    ModalSubmit(ModalSubmitData),
    /// No payload, or a payload that does not fit the interaction type.
    None,
}

/// Resolved interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub kind: InteractionType,
    pub data: InteractionData,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub member: Option<Member>,
    pub user: Option<User>,
    /// Continuation token for responding and for follow-up webhooks.
    pub token: String,
    pub version: u8,
    /// Message the component was attached to, untouched.
    pub message: Option<Value>,
    pub app_permissions: Option<String>,
    pub locale: Option<Locale>,
    pub guild_locale: Option<Locale>,
}

impl Interaction {
    /// Whether this is the registration handshake.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.kind == InteractionType::Ping
    }

    /// User that triggered the interaction: the member's user in guilds,
    /// the plain user in DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Invoked command name, for command and autocomplete interactions.
    pub fn command_name(&self) -> Option<&str> {
        match &self.data {
            InteractionData::ApplicationCommand(data) | InteractionData::Autocomplete(data) => {
                Some(&data.name)
            }
            _ => None,
        }
    }

    /// Custom ID of the component or modal.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.data {
            InteractionData::MessageComponent(data) => Some(&data.custom_id),
            InteractionData::ModalSubmit(data) => Some(&data.custom_id),
            _ => None,
        }
    }
}

fn project<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    value.and_then(|v| T::deserialize(v).ok())
}

/// Resolve a raw interaction into its typed form.
///
/// Total: unknown discriminants become [`InteractionType::Unknown`] and
/// sub-objects that do not match their expected shape are dropped.
pub fn resolve(raw: &RawInteraction) -> Interaction {
    let kind = InteractionType::from_value(&raw.kind);
    let data = raw.data.as_ref();

    let data = match kind {
        InteractionType::ApplicationCommand => {
            project(data).map_or(InteractionData::None, InteractionData::ApplicationCommand)
        }
        InteractionType::Autocomplete => {
            project(data).map_or(InteractionData::None, InteractionData::Autocomplete)
        }
        InteractionType::MessageComponent => {
            project(data).map_or(InteractionData::None, InteractionData::MessageComponent)
        }
        InteractionType::ModalSubmit => {
            project(data).map_or(InteractionData::None, InteractionData::ModalSubmit)
        }
        InteractionType::Ping | InteractionType::Unknown(_) => InteractionData::None,
    };

    Interaction {
        id: project(raw.id.as_ref()).unwrap_or_default(),
        application_id: project(raw.application_id.as_ref()).unwrap_or_default(),
        kind,
        data,
        guild_id: project(raw.guild_id.as_ref()),
        channel_id: project(raw.channel_id.as_ref()),
        member: project(raw.member.as_ref()),
        user: project(raw.user.as_ref()),
        token: project(raw.token.as_ref()).unwrap_or_default(),
        version: raw
            .version
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(1),
        message: raw.message.clone(),
        app_permissions: project(raw.app_permissions.as_ref()),
        locale: project(raw.locale.as_ref()),
        guild_locale: project(raw.guild_locale.as_ref()),
    }
}

impl From<&RawInteraction> for Interaction {
    fn from(raw: &RawInteraction) -> Self {
        resolve(raw)
    }
}
