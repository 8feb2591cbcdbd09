//! Lazily-resolvable references to platform entities.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ChannelId, EntityId, GuildId};

/// Kind of entity an [`ObjectReference`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A guild member or user.
    User,
    /// A guild role.
    Role,
    /// A guild channel.
    Channel,
    /// Either a user or a role.
    Mentionable,
}

impl ObjectKind {
    /// Returns the lowercase kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Channel => "channel",
            Self::Mentionable => "mentionable",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a user, role or channel, resolved only when a handler asks.
///
/// Identity is the raw id with mention brackets and sigils stripped, so
/// `<@!42>`, `<@42>` and `42` all refer to the same user.
///
/// # Examples
///
/// ```
/// use switchboard::command::domain::{ObjectKind, ObjectReference};
///
/// let reference = ObjectReference::parse(ObjectKind::Role, "<@&1234>").expect("mention");
/// assert_eq!(reference.id().as_str(), "1234");
/// assert!(ObjectReference::parse(ObjectKind::User, "bob").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    id: EntityId,
    kind: ObjectKind,
}

impl ObjectReference {
    /// Parses a mention or bare id into a reference.
    ///
    /// Returns `None` when the normalized id is empty or not numeric.
    #[must_use]
    pub fn parse(kind: ObjectKind, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(trimmed);
        let id = inner.trim_start_matches(['@', '!', '&', '#']);

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            id: EntityId::new(id),
            kind,
        })
    }

    /// Returns the normalized entity id.
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    /// Returns the referenced entity kind.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }
}

/// What a context-menu command was invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A right-clicked message.
    Message,
    /// A right-clicked user.
    User,
}

impl TargetKind {
    /// Returns the platform application-command type code.
    #[must_use]
    pub const fn command_type_code(self) -> u8 {
        match self {
            Self::User => 2,
            Self::Message => 3,
        }
    }
}

/// The right-click target of a context-menu invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetReference {
    id: EntityId,
    kind: TargetKind,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
}

impl TargetReference {
    /// Creates a target reference from the originating invocation.
    #[must_use]
    pub const fn new(
        id: EntityId,
        kind: TargetKind,
        guild_id: Option<GuildId>,
        channel_id: ChannelId,
    ) -> Self {
        Self {
            id,
            kind,
            guild_id,
            channel_id,
        }
    }

    /// Returns the target entity id.
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    /// Returns whether the target is a message or a user.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Returns the guild the menu was opened in, if any.
    #[must_use]
    pub const fn guild_id(&self) -> Option<&GuildId> {
        self.guild_id.as_ref()
    }

    /// Returns the channel the menu was opened in.
    #[must_use]
    pub const fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }
}
