//! Inbound gateway events and outbound lifecycle events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChannelId, GuildId, InvocationContext, Permissions, UserId};

/// A plain chat message delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Message id.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: ChannelId,
    /// Guild, or `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Author.
    pub author: UserId,
    /// Raw message text.
    pub content: String,
    /// Author's permissions in the channel, when in a guild.
    #[serde(default)]
    pub member_permissions: Option<Permissions>,
}

impl TextMessage {
    /// Creates a direct message with no permissions.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        channel_id: ChannelId,
        author: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id,
            guild_id: None,
            author,
            content: content.into(),
            member_permissions: None,
        }
    }

    /// Places the message in a guild.
    #[must_use]
    pub fn in_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Sets the author's permissions.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.member_permissions = Some(permissions);
        self
    }

    /// Builds the invocation context for this message.
    #[must_use]
    pub fn context(&self) -> InvocationContext {
        InvocationContext::text(self.id.clone(), self.channel_id.clone(), self.author.clone())
            .in_guild(self.guild_id.clone())
            .with_permissions(self.member_permissions)
    }
}

/// Kind of structured interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A slash command.
    Command,
    /// A context-menu action.
    ContextMenu,
}

/// Kind of an interaction option node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Selects a subcommand; nested options are its parameters.
    SubCommand,
    /// Selects a group; nested options hold one subcommand.
    SubCommandGroup,
    /// A parameter value.
    Value,
}

/// One option of a structured interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    /// Option name.
    pub name: String,
    /// Option kind.
    pub kind: OptionKind,
    /// Raw value for [`OptionKind::Value`] options.
    #[serde(default)]
    pub value: Option<Value>,
    /// Nested options for subcommands and groups.
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

impl InteractionOption {
    /// Creates a parameter value option.
    #[must_use]
    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::Value,
            value: Some(value.into()),
            options: Vec::new(),
        }
    }

    /// Creates a subcommand option wrapping its parameters.
    #[must_use]
    pub fn subcommand(name: impl Into<String>, options: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::SubCommand,
            value: None,
            options,
        }
    }

    /// Creates a group option wrapping one subcommand option.
    #[must_use]
    pub fn group(name: impl Into<String>, subcommand: Self) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::SubCommandGroup,
            value: None,
            options: vec![subcommand],
        }
    }
}

/// A structured platform interaction delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction id.
    pub id: String,
    /// Token used for follow-up replies.
    pub token: String,
    /// Slash command or context menu.
    pub kind: InteractionKind,
    /// Top-level command name.
    pub command_name: String,
    /// Options tree.
    #[serde(default)]
    pub options: Vec<InteractionOption>,
    /// Right-clicked entity for context menus.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Guild, or `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Channel.
    pub channel_id: ChannelId,
    /// Invoking user.
    pub user: UserId,
    /// Invoking member's permissions, when in a guild.
    #[serde(default)]
    pub member_permissions: Option<Permissions>,
}

impl Interaction {
    /// Creates a slash-command interaction outside any guild.
    #[must_use]
    pub fn command(
        id: impl Into<String>,
        token: impl Into<String>,
        command_name: impl Into<String>,
        channel_id: ChannelId,
        user: UserId,
    ) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            kind: InteractionKind::Command,
            command_name: command_name.into(),
            options: Vec::new(),
            target_id: None,
            guild_id: None,
            channel_id,
            user,
            member_permissions: None,
        }
    }

    /// Creates a context-menu interaction outside any guild.
    #[must_use]
    pub fn context_menu(
        id: impl Into<String>,
        token: impl Into<String>,
        command_name: impl Into<String>,
        target_id: impl Into<String>,
        channel_id: ChannelId,
        user: UserId,
    ) -> Self {
        Self {
            kind: InteractionKind::ContextMenu,
            target_id: Some(target_id.into()),
            ..Self::command(id, token, command_name, channel_id, user)
        }
    }

    /// Appends a top-level option.
    #[must_use]
    pub fn with_option(mut self, option: InteractionOption) -> Self {
        self.options.push(option);
        self
    }

    /// Places the interaction in a guild.
    #[must_use]
    pub fn in_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Sets the member's permissions.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.member_permissions = Some(permissions);
        self
    }

    /// Builds the invocation context for this interaction.
    #[must_use]
    pub fn context(&self) -> InvocationContext {
        InvocationContext::interaction(
            self.id.clone(),
            self.token.clone(),
            self.channel_id.clone(),
            self.user.clone(),
        )
        .in_guild(self.guild_id.clone())
        .with_permissions(self.member_permissions)
    }
}

/// Events emitted to the [`LifecycleSink`](crate::command::ports::LifecycleSink).
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The registry was locked and dispatch is live.
    Ready {
        /// Number of registered chat commands.
        chat_commands: usize,
        /// Number of registered context-menu commands.
        context_menus: usize,
    },
    /// A text message that did not address a command.
    Message(TextMessage),
    /// A command resolved and is about to run.
    Command {
        /// Qualified command name.
        name: String,
        /// Invoking user.
        user: UserId,
        /// Guild, if any.
        guild_id: Option<GuildId>,
    },
    /// Dispatch failed.
    Error {
        /// Qualified command name, when resolution got that far.
        command: Option<String>,
        /// Rendered error.
        message: String,
    },
}
