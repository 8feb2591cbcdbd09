//! Invocation context and the canonical invocation produced by resolution.

use std::sync::Arc;

use super::{
    AccessPolicy, ChannelId, ChatCommand, CommandName, CommandPath, CommandType,
    ContextMenuCommand, GuildId, Handler, ParameterSchema, Parameters, PermissionRule,
    Permissions, SubCommand, TargetReference, UserId,
};

/// Which input channel produced an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationSource {
    /// A prefixed text message.
    Text {
        /// Id of the triggering message.
        message_id: String,
    },
    /// A structured platform interaction.
    Interaction {
        /// Interaction id.
        id: String,
        /// Interaction token used for follow-up replies.
        token: String,
    },
}

/// Where replies to an invocation are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Reply in a channel, referencing the triggering message.
    Message {
        /// Channel to post into.
        channel_id: ChannelId,
        /// Message being replied to.
        message_id: String,
    },
    /// Reply through the interaction's response endpoint.
    Interaction {
        /// Interaction id.
        id: String,
        /// Interaction token.
        token: String,
    },
}

/// Who invoked a command, where, and with which permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    user_id: UserId,
    member_permissions: Option<Permissions>,
    source: InvocationSource,
}

impl InvocationContext {
    /// Creates a context for a text message outside any guild.
    #[must_use]
    pub fn text(message_id: impl Into<String>, channel_id: ChannelId, user_id: UserId) -> Self {
        Self {
            guild_id: None,
            channel_id,
            user_id,
            member_permissions: None,
            source: InvocationSource::Text {
                message_id: message_id.into(),
            },
        }
    }

    /// Creates a context for an interaction outside any guild.
    #[must_use]
    pub fn interaction(
        id: impl Into<String>,
        token: impl Into<String>,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Self {
        Self {
            guild_id: None,
            channel_id,
            user_id,
            member_permissions: None,
            source: InvocationSource::Interaction {
                id: id.into(),
                token: token.into(),
            },
        }
    }

    /// Sets the guild the invocation happened in.
    #[must_use]
    pub fn in_guild(mut self, guild_id: Option<GuildId>) -> Self {
        self.guild_id = guild_id;
        self
    }

    /// Sets the member's permission set.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: Option<Permissions>) -> Self {
        self.member_permissions = permissions;
        self
    }

    /// Returns the guild, or `None` for direct messages.
    #[must_use]
    pub const fn guild_id(&self) -> Option<&GuildId> {
        self.guild_id.as_ref()
    }

    /// Returns the channel.
    #[must_use]
    pub const fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the invoking user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the member's permission set, when known.
    #[must_use]
    pub const fn member_permissions(&self) -> Option<Permissions> {
        self.member_permissions
    }

    /// Returns the input channel.
    #[must_use]
    pub const fn source(&self) -> &InvocationSource {
        &self.source
    }

    /// Returns `true` for structured interactions.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self.source, InvocationSource::Interaction { .. })
    }

    /// Returns where replies should go.
    #[must_use]
    pub fn reply_target(&self) -> ReplyTarget {
        match &self.source {
            InvocationSource::Text { message_id } => ReplyTarget::Message {
                channel_id: self.channel_id.clone(),
                message_id: message_id.clone(),
            },
            InvocationSource::Interaction { id, token } => ReplyTarget::Interaction {
                id: id.clone(),
                token: token.clone(),
            },
        }
    }
}

/// A registered command resolved down to the node that will run.
#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    /// A chat command, optionally narrowed to a subcommand.
    Chat {
        /// Root command.
        command: Arc<ChatCommand>,
        /// Subcommand path, or `None` for the root itself.
        path: Option<CommandPath>,
    },
    /// A context-menu command.
    ContextMenu(Arc<ContextMenuCommand>),
}

impl ResolvedCommand {
    /// Returns the root command name.
    #[must_use]
    pub fn root_name(&self) -> &CommandName {
        match self {
            Self::Chat { command, .. } => command.name(),
            Self::ContextMenu(command) => command.name(),
        }
    }

    /// Returns the space-separated path, e.g. `admin roles add`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Chat {
                command,
                path: Some(path),
            } => {
                let mut segments = vec![command.name().as_str()];
                if let Some(group) = path.group() {
                    segments.push(group.as_str());
                }
                segments.push(path.sub().as_str());
                segments.join(" ")
            }
            Self::Chat { command, path: None } => command.name().to_string(),
            Self::ContextMenu(command) => command.name().to_string(),
        }
    }

    /// Returns the registry namespace.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::Chat { .. } => CommandType::Chat,
            Self::ContextMenu(_) => CommandType::ContextMenu,
        }
    }

    /// Returns the resolved subcommand, if the path selects one.
    #[must_use]
    pub fn subcommand(&self) -> Option<&SubCommand> {
        match self {
            Self::Chat {
                command,
                path: Some(path),
            } => command.find_subcommand(path),
            Self::Chat { path: None, .. } | Self::ContextMenu(_) => None,
        }
    }

    /// Returns the parameter schemas of the node that will run.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSchema] {
        match (self, self.subcommand()) {
            (_, Some(sub)) => sub.parameters(),
            (Self::Chat { command, .. }, None) => command.parameters(),
            (Self::ContextMenu(_), None) => &[],
        }
    }

    /// Returns the handler of the node that will run.
    #[must_use]
    pub fn handler(&self) -> Option<&Handler> {
        match self {
            Self::Chat { path: Some(_), .. } => self.subcommand().and_then(SubCommand::handler),
            Self::Chat { command, path: None } => command.handler(),
            Self::ContextMenu(command) => command.handler(),
        }
    }

    /// Returns the root access policy.
    #[must_use]
    pub fn access(&self) -> &AccessPolicy {
        match self {
            Self::Chat { command, .. } => command.access(),
            Self::ContextMenu(command) => command.access(),
        }
    }

    /// Returns the subcommand's own rule, checked after the root policy.
    #[must_use]
    pub fn leaf_rule(&self) -> Option<&PermissionRule> {
        self.subcommand().map(SubCommand::rule)
    }

    /// Returns the root's announce-success override.
    #[must_use]
    pub fn announce_success_override(&self) -> Option<bool> {
        match self {
            Self::Chat { command, .. } => command.announce_success_override(),
            Self::ContextMenu(command) => command.announce_success_override(),
        }
    }
}

/// Normalized form of a text or structured invocation.
#[derive(Debug, Clone)]
pub struct CanonicalInvocation {
    command: ResolvedCommand,
    parameters: Parameters,
    target: Option<TargetReference>,
    context: InvocationContext,
}

impl CanonicalInvocation {
    /// Creates a canonical invocation.
    #[must_use]
    pub const fn new(
        command: ResolvedCommand,
        parameters: Parameters,
        target: Option<TargetReference>,
        context: InvocationContext,
    ) -> Self {
        Self {
            command,
            parameters,
            target,
            context,
        }
    }

    /// Returns the resolved command.
    #[must_use]
    pub const fn command(&self) -> &ResolvedCommand {
        &self.command
    }

    /// Returns the bound parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the context-menu target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&TargetReference> {
        self.target.as_ref()
    }

    /// Returns the invocation context.
    #[must_use]
    pub const fn context(&self) -> &InvocationContext {
        &self.context
    }
}
