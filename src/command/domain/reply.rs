//! Abstract reply payloads and handler return values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field title.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field may sit beside its neighbours.
    #[serde(default)]
    pub inline: bool,
}

/// Rich embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Title line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accent colour as `0xRRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// Fields in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// Footer text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Embed {
    /// Creates an empty embed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the accent colour.
    #[must_use]
    pub const fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Sets the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// File attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to users.
    pub filename: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// Everything a reply may carry. Transports map this onto the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Plain text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Embeds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    /// Attached files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<Attachment>,
    /// Message components, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    /// Sticker ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sticker_ids: Vec<String>,
    /// Visible only to the invoking user (interactions only).
    #[serde(default)]
    pub ephemeral: bool,
}

impl ReplyPayload {
    /// Creates a text-only payload.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Creates a payload with a single embed.
    #[must_use]
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    /// Marks the payload as ephemeral.
    #[must_use]
    pub const fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

/// What a handler returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Nothing to send.
    #[default]
    Void,
    /// Plain text reply.
    Text(String),
    /// Full reply payload, sent verbatim.
    Reply(ReplyPayload),
    /// Single embed reply.
    Embed(Embed),
}

impl ReplyOutcome {
    /// Converts the outcome into a payload; `None` for [`Self::Void`].
    #[must_use]
    pub fn into_payload(self) -> Option<ReplyPayload> {
        match self {
            Self::Void => None,
            Self::Text(text) => Some(ReplyPayload::text(text)),
            Self::Reply(payload) => Some(payload),
            Self::Embed(embed) => Some(ReplyPayload::embed(embed)),
        }
    }

    /// Returns `true` for [`Self::Void`].
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }
}

impl From<()> for ReplyOutcome {
    fn from((): ()) -> Self {
        Self::Void
    }
}

impl From<String> for ReplyOutcome {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ReplyOutcome {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<ReplyPayload> for ReplyOutcome {
    fn from(payload: ReplyPayload) -> Self {
        Self::Reply(payload)
    }
}

impl From<Embed> for ReplyOutcome {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}
