//! Command tree nodes.
//!
//! The tree is a closed sum type: top-level chat and context-menu commands,
//! plus subcommands and subcommand groups that only ever appear as
//! children. Children are attached through `append`, which enforces name
//! uniqueness and nesting rules and sets each child's parent exactly once.

use std::fmt;
use std::sync::Arc;

use super::{
    AccessPolicy, CommandName, DefinitionError, Description, GuildId, ParameterSchema,
    PermissionRule, TargetKind, validate_parameter_list,
};
use crate::command::ports::CommandHandler;

/// Shared handle to a command handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn CommandHandler>);

impl Handler {
    /// Wraps a handler implementation.
    pub fn new(handler: impl CommandHandler + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Returns the wrapped handler.
    #[must_use]
    pub fn as_handler(&self) -> &dyn CommandHandler {
        self.0.as_ref()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Registry namespace of a top-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Chat commands (text and slash).
    Chat,
    /// Context-menu commands.
    ContextMenu,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => f.write_str("chat"),
            Self::ContextMenu => f.write_str("context_menu"),
        }
    }
}

/// Kind of node a child's parent back-reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// A top-level chat command.
    Command,
    /// A subcommand group.
    Group,
}

/// Back-reference from a child node to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    kind: ParentKind,
    name: CommandName,
}

impl ParentRef {
    /// Returns the parent's kind.
    #[must_use]
    pub const fn kind(&self) -> ParentKind {
        self.kind
    }

    /// Returns the parent's name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }
}

/// Leaf command nested under a chat command or a group.
#[derive(Debug, Clone)]
pub struct SubCommand {
    name: CommandName,
    description: Description,
    parameters: Vec<ParameterSchema>,
    rule: PermissionRule,
    parent: Option<ParentRef>,
    handler: Option<Handler>,
}

impl SubCommand {
    /// Creates a subcommand.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: CommandName::new(name)?,
            description: Description::new(description)?,
            parameters: Vec::new(),
            rule: PermissionRule::none(),
            parent: None,
            handler: None,
        })
    }

    /// Appends a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for duplicate names, target parameters or
    /// a required parameter following an optional one.
    pub fn with_parameter(mut self, parameter: ParameterSchema) -> Result<Self, DefinitionError> {
        self.parameters.push(parameter);
        validate_parameter_list(&self.name, &self.parameters)?;
        Ok(self)
    }

    /// Sets the subcommand's own permission rule.
    #[must_use]
    pub fn with_permission(mut self, rule: PermissionRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the parameter schema list.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// Returns the subcommand's own permission rule.
    #[must_use]
    pub const fn rule(&self) -> &PermissionRule {
        &self.rule
    }

    /// Returns the parent back-reference, once attached.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// Returns the handler, if set.
    #[must_use]
    pub const fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    fn assign_parent(&mut self, parent: ParentRef) -> Result<(), DefinitionError> {
        assign_once(&mut self.parent, &self.name, parent)
    }
}

/// Named group of subcommands. Groups never contain groups.
#[derive(Debug, Clone)]
pub struct SubCommandGroup {
    name: CommandName,
    description: Description,
    children: Vec<SubCommand>,
    parent: Option<ParentRef>,
}

impl SubCommandGroup {
    /// Creates an empty group.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: CommandName::new(name)?,
            description: Description::new(description)?,
            children: Vec::new(),
            parent: None,
        })
    }

    /// Appends a child, consuming and returning the group.
    ///
    /// # Errors
    ///
    /// See [`Self::append`].
    pub fn with_child(mut self, child: impl Into<CommandNode>) -> Result<Self, DefinitionError> {
        self.append(child)?;
        Ok(self)
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::NestedGroup`] for groups,
    /// [`DefinitionError::TopLevelAsChild`] for top-level commands,
    /// [`DefinitionError::DuplicateChild`] on a name clash, or
    /// [`DefinitionError::ParentAlreadyAssigned`] when the subcommand is
    /// already attached elsewhere.
    pub fn append(&mut self, child: impl Into<CommandNode>) -> Result<(), DefinitionError> {
        match child.into() {
            CommandNode::Sub(mut sub) => {
                if self.find(sub.name().as_str()).is_some() {
                    return Err(DefinitionError::DuplicateChild {
                        parent: self.name.to_string(),
                        child: sub.name.to_string(),
                    });
                }
                sub.assign_parent(ParentRef {
                    kind: ParentKind::Group,
                    name: self.name.clone(),
                })?;
                self.children.push(sub);
                Ok(())
            }
            CommandNode::Group(group) => Err(DefinitionError::NestedGroup {
                parent: self.name.to_string(),
                child: group.name.to_string(),
            }),
            other @ (CommandNode::Chat(_) | CommandNode::ContextMenu(_)) => {
                Err(DefinitionError::TopLevelAsChild {
                    parent: self.name.to_string(),
                    child: other.name().to_string(),
                })
            }
        }
    }

    /// Finds a child subcommand by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SubCommand> {
        self.children.iter().find(|sub| sub.name.matches(name))
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the child subcommands in insertion order.
    #[must_use]
    pub fn children(&self) -> &[SubCommand] {
        &self.children
    }

    /// Returns the parent back-reference, once attached.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn assign_parent(&mut self, parent: ParentRef) -> Result<(), DefinitionError> {
        assign_once(&mut self.parent, &self.name, parent)
    }
}

/// Direct child of a chat command.
#[derive(Debug, Clone)]
pub enum ChildNode {
    /// A subcommand.
    Sub(SubCommand),
    /// A subcommand group.
    Group(SubCommandGroup),
}

impl ChildNode {
    /// Returns the child's name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        match self {
            Self::Sub(sub) => &sub.name,
            Self::Group(group) => &group.name,
        }
    }
}

/// Top-level chat command, invocable by text prefix and as a slash command.
#[derive(Debug, Clone)]
pub struct ChatCommand {
    name: CommandName,
    aliases: Vec<CommandName>,
    description: Description,
    usage: Option<String>,
    hidden: bool,
    slash: bool,
    access: AccessPolicy,
    parameters: Vec<ParameterSchema>,
    children: Vec<ChildNode>,
    handler: Option<Handler>,
    announce_success: Option<bool>,
}

impl ChatCommand {
    /// Creates a chat command registerable as a slash command.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: CommandName::new(name)?,
            aliases: Vec::new(),
            description: Description::new(description)?,
            usage: None,
            hidden: false,
            slash: true,
            access: AccessPolicy::default(),
            parameters: Vec::new(),
            children: Vec::new(),
            handler: None,
            announce_success: None,
        })
    }

    /// Adds a text alias. Aliases equal to the name or an existing alias
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the alias is not a valid name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Result<Self, DefinitionError> {
        let alias = CommandName::new(alias)?;
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        Ok(self)
    }

    /// Appends a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for duplicate names, target parameters or
    /// a required parameter following an optional one.
    pub fn with_parameter(mut self, parameter: ParameterSchema) -> Result<Self, DefinitionError> {
        self.parameters.push(parameter);
        validate_parameter_list(&self.name, &self.parameters)?;
        Ok(self)
    }

    /// Appends a child, consuming and returning the command.
    ///
    /// # Errors
    ///
    /// See [`Self::append`].
    pub fn with_child(mut self, child: impl Into<CommandNode>) -> Result<Self, DefinitionError> {
        self.append(child)?;
        Ok(self)
    }

    /// Sets the usage line shown in help output.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Hides the command from help listings.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Excludes the command from slash publication.
    #[must_use]
    pub const fn text_only(mut self) -> Self {
        self.slash = false;
        self
    }

    /// Restricts the command to the given guilds.
    #[must_use]
    pub fn with_guilds(mut self, guilds: impl IntoIterator<Item = GuildId>) -> Self {
        self.access = self.access.with_guilds(guilds);
        self
    }

    /// Sets whether the command may run in direct messages.
    #[must_use]
    pub fn allow_dm(mut self, allowed: bool) -> Self {
        self.access = self.access.with_dm_allowed(allowed);
        self
    }

    /// Sets the permission rule.
    #[must_use]
    pub fn with_permission(mut self, rule: PermissionRule) -> Self {
        self.access = self.access.with_rule(rule);
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    /// Overrides the configured announce-success default.
    #[must_use]
    pub const fn announce_success(mut self, announce: bool) -> Self {
        self.announce_success = Some(announce);
        self
    }

    /// Appends a subcommand or group.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::TopLevelAsChild`] for top-level commands,
    /// [`DefinitionError::DuplicateChild`] on a name clash, or
    /// [`DefinitionError::ParentAlreadyAssigned`] when the child is already
    /// attached elsewhere.
    pub fn append(&mut self, child: impl Into<CommandNode>) -> Result<(), DefinitionError> {
        let parent = ParentRef {
            kind: ParentKind::Command,
            name: self.name.clone(),
        };
        let child = match child.into() {
            CommandNode::Sub(mut sub) => {
                sub.assign_parent(parent)?;
                ChildNode::Sub(sub)
            }
            CommandNode::Group(mut group) => {
                group.assign_parent(parent)?;
                ChildNode::Group(group)
            }
            other @ (CommandNode::Chat(_) | CommandNode::ContextMenu(_)) => {
                return Err(DefinitionError::TopLevelAsChild {
                    parent: self.name.to_string(),
                    child: other.name().to_string(),
                });
            }
        };

        if self.find_child(child.name().as_str()).is_some() {
            return Err(DefinitionError::DuplicateChild {
                parent: self.name.to_string(),
                child: child.name().to_string(),
            });
        }
        self.children.push(child);
        Ok(())
    }

    /// Finds a direct child by name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&ChildNode> {
        self.children.iter().find(|child| child.name().matches(name))
    }

    /// Finds the subcommand addressed by `path`.
    #[must_use]
    pub fn find_subcommand(&self, path: &CommandPath) -> Option<&SubCommand> {
        match (path.group(), self.find_child(path.sub().as_str())) {
            (None, Some(ChildNode::Sub(sub))) => Some(sub),
            (Some(group), _) => match self.find_child(group.as_str()) {
                Some(ChildNode::Group(found)) => found.find(path.sub().as_str()),
                _ => None,
            },
            (None, _) => None,
        }
    }

    /// Returns `true` when `candidate` equals the name or an alias.
    #[must_use]
    pub fn answers_to(&self, candidate: &str) -> bool {
        self.name.matches(candidate) || self.aliases.iter().any(|alias| alias.matches(candidate))
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the aliases.
    #[must_use]
    pub fn aliases(&self) -> &[CommandName] {
        &self.aliases
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the usage line, if set.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Returns `true` when hidden from help listings.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns `true` when the command is published as a slash command.
    #[must_use]
    pub const fn is_slash(&self) -> bool {
        self.slash
    }

    /// Returns the access policy.
    #[must_use]
    pub const fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Returns the root parameter schema list.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// Returns the children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[ChildNode] {
        &self.children
    }

    /// Returns the root handler, if set.
    #[must_use]
    pub const fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns the announce-success override, if set.
    #[must_use]
    pub const fn announce_success_override(&self) -> Option<bool> {
        self.announce_success
    }

    pub(crate) fn retain_aliases(&mut self, mut keep: impl FnMut(&CommandName) -> bool) {
        self.aliases.retain(|alias| keep(alias));
    }
}

/// Context-menu command invoked on a message or user.
#[derive(Debug, Clone)]
pub struct ContextMenuCommand {
    name: CommandName,
    target: TargetKind,
    access: AccessPolicy,
    handler: Option<Handler>,
    announce_success: Option<bool>,
}

impl ContextMenuCommand {
    /// Creates a context-menu command.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name is empty or too long.
    pub fn new(name: impl Into<String>, target: TargetKind) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: CommandName::context_menu(name)?,
            target,
            access: AccessPolicy::default(),
            handler: None,
            announce_success: None,
        })
    }

    /// Restricts the command to the given guilds.
    #[must_use]
    pub fn with_guilds(mut self, guilds: impl IntoIterator<Item = GuildId>) -> Self {
        self.access = self.access.with_guilds(guilds);
        self
    }

    /// Sets whether the command may run in direct messages.
    #[must_use]
    pub fn allow_dm(mut self, allowed: bool) -> Self {
        self.access = self.access.with_dm_allowed(allowed);
        self
    }

    /// Sets the permission rule.
    #[must_use]
    pub fn with_permission(mut self, rule: PermissionRule) -> Self {
        self.access = self.access.with_rule(rule);
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    /// Overrides the configured announce-success default.
    #[must_use]
    pub const fn announce_success(mut self, announce: bool) -> Self {
        self.announce_success = Some(announce);
        self
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the target kind.
    #[must_use]
    pub const fn target(&self) -> TargetKind {
        self.target
    }

    /// Returns the access policy.
    #[must_use]
    pub const fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Returns the handler, if set.
    #[must_use]
    pub const fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns the announce-success override, if set.
    #[must_use]
    pub const fn announce_success_override(&self) -> Option<bool> {
        self.announce_success
    }
}

/// Any node of the command tree.
#[derive(Debug, Clone)]
pub enum CommandNode {
    /// Top-level chat command.
    Chat(ChatCommand),
    /// Top-level context-menu command.
    ContextMenu(ContextMenuCommand),
    /// Subcommand.
    Sub(SubCommand),
    /// Subcommand group.
    Group(SubCommandGroup),
}

impl CommandNode {
    /// Returns the node's name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        match self {
            Self::Chat(command) => &command.name,
            Self::ContextMenu(command) => &command.name,
            Self::Sub(sub) => &sub.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Returns the registry namespace for top-level variants.
    #[must_use]
    pub const fn command_type(&self) -> Option<CommandType> {
        match self {
            Self::Chat(_) => Some(CommandType::Chat),
            Self::ContextMenu(_) => Some(CommandType::ContextMenu),
            Self::Sub(_) | Self::Group(_) => None,
        }
    }
}

impl From<ChatCommand> for CommandNode {
    fn from(command: ChatCommand) -> Self {
        Self::Chat(command)
    }
}

impl From<ContextMenuCommand> for CommandNode {
    fn from(command: ContextMenuCommand) -> Self {
        Self::ContextMenu(command)
    }
}

impl From<SubCommand> for CommandNode {
    fn from(sub: SubCommand) -> Self {
        Self::Sub(sub)
    }
}

impl From<SubCommandGroup> for CommandNode {
    fn from(group: SubCommandGroup) -> Self {
        Self::Group(group)
    }
}

/// Location of a subcommand beneath its root chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPath {
    group: Option<CommandName>,
    sub: CommandName,
}

impl CommandPath {
    /// Path to a subcommand directly under the root.
    #[must_use]
    pub const fn direct(sub: CommandName) -> Self {
        Self { group: None, sub }
    }

    /// Path to a subcommand inside a group.
    #[must_use]
    pub const fn grouped(group: CommandName, sub: CommandName) -> Self {
        Self {
            group: Some(group),
            sub,
        }
    }

    /// Returns the group segment, if any.
    #[must_use]
    pub const fn group(&self) -> Option<&CommandName> {
        self.group.as_ref()
    }

    /// Returns the subcommand segment.
    #[must_use]
    pub const fn sub(&self) -> &CommandName {
        &self.sub
    }
}

fn assign_once(
    slot: &mut Option<ParentRef>,
    node: &CommandName,
    parent: ParentRef,
) -> Result<(), DefinitionError> {
    if let Some(existing) = slot {
        return Err(DefinitionError::ParentAlreadyAssigned {
            node: node.to_string(),
            parent: existing.name.to_string(),
        });
    }
    *slot = Some(parent);
    Ok(())
}
