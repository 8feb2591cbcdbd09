//! Platform command-description schema.
//!
//! These are the JSON shapes pushed through the
//! [`CommandPublisher`](crate::command::ports::CommandPublisher) port.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    AccessDefaults, AccessPolicy, ChatCommand, ChildNode, ContextMenuCommand, GuildId,
    ParameterSchema, SubCommand, SubCommandGroup,
};

/// Application-command type code for chat-input (slash) commands.
pub const CHAT_INPUT_TYPE: u8 = 1;

/// Option type code for a subcommand.
pub const SUB_COMMAND_OPTION_TYPE: u8 = 1;

/// Option type code for a subcommand group.
pub const SUB_COMMAND_GROUP_OPTION_TYPE: u8 = 2;

/// One fixed choice of a string option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDescription {
    /// Label shown to users.
    pub name: String,
    /// Value delivered back in the interaction.
    pub value: String,
}

/// An option: a parameter, a subcommand or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescription {
    /// Option name.
    pub name: String,
    /// Option type code.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Option description.
    pub description: String,
    /// Whether the option must be supplied.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Fixed choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceDescription>,
    /// Nested options for subcommands and groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDescription>,
}

impl OptionDescription {
    fn from_parameter(parameter: &ParameterSchema) -> Self {
        Self {
            name: parameter.name().to_string(),
            kind: parameter.parameter_type().type_code(),
            description: parameter.description().to_string(),
            required: !parameter.is_optional(),
            choices: parameter
                .choices()
                .iter()
                .map(|choice| ChoiceDescription {
                    name: choice.clone(),
                    value: choice.clone(),
                })
                .collect(),
            options: Vec::new(),
        }
    }

    fn from_subcommand(sub: &SubCommand) -> Self {
        Self {
            name: sub.name().to_string(),
            kind: SUB_COMMAND_OPTION_TYPE,
            description: sub.description().to_string(),
            required: false,
            choices: Vec::new(),
            options: sub.parameters().iter().map(Self::from_parameter).collect(),
        }
    }

    fn from_group(group: &SubCommandGroup) -> Self {
        Self {
            name: group.name().to_string(),
            kind: SUB_COMMAND_GROUP_OPTION_TYPE,
            description: group.description().to_string(),
            required: false,
            choices: Vec::new(),
            options: group.children().iter().map(Self::from_subcommand).collect(),
        }
    }
}

/// A top-level command as the platform expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescription {
    /// Command name.
    pub name: String,
    /// Application-command type code.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Description (empty for context menus).
    pub description: String,
    /// Parameters, or subcommands and groups when the command has children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDescription>,
    /// Whether the command is offered in direct messages.
    pub dm_permission: bool,
    /// Required permission bits as a decimal string.
    pub default_member_permissions: Option<String>,
}

impl CommandDescription {
    /// Exports a chat command.
    ///
    /// When the command has children only the children are exported; the
    /// platform forbids mixing subcommands with plain parameters.
    #[must_use]
    pub fn from_chat(command: &ChatCommand, defaults: AccessDefaults) -> Self {
        let options = if command.children().is_empty() {
            command
                .parameters()
                .iter()
                .map(OptionDescription::from_parameter)
                .collect()
        } else {
            command
                .children()
                .iter()
                .map(|child| match child {
                    ChildNode::Sub(sub) => OptionDescription::from_subcommand(sub),
                    ChildNode::Group(group) => OptionDescription::from_group(group),
                })
                .collect()
        };

        Self {
            name: command.name().to_string(),
            kind: CHAT_INPUT_TYPE,
            description: command.description().to_string(),
            options,
            dm_permission: dm_permission(command.access(), defaults),
            default_member_permissions: default_member_permissions(command.access()),
        }
    }

    /// Exports a context-menu command.
    #[must_use]
    pub fn from_context_menu(command: &ContextMenuCommand, defaults: AccessDefaults) -> Self {
        Self {
            name: command.name().to_string(),
            kind: command.target().command_type_code(),
            description: String::new(),
            options: Vec::new(),
            dm_permission: dm_permission(command.access(), defaults),
            default_member_permissions: default_member_permissions(command.access()),
        }
    }
}

/// Where a batch of commands is published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PublishScope {
    /// Available everywhere.
    Global,
    /// Available in one guild.
    Guild(GuildId),
}

impl PublishScope {
    /// Returns the scopes a command with this policy is published to.
    #[must_use]
    pub fn for_policy(access: &AccessPolicy) -> Vec<Self> {
        if access.guilds().is_empty() {
            vec![Self::Global]
        } else {
            access.guilds().iter().cloned().map(Self::Guild).collect()
        }
    }
}

impl fmt::Display for PublishScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(guild) => write!(f, "guild {guild}"),
        }
    }
}

fn dm_permission(access: &AccessPolicy, defaults: AccessDefaults) -> bool {
    access.dm_allowed().unwrap_or(defaults.dm_allowed)
}

fn default_member_permissions(access: &AccessPolicy) -> Option<String> {
    access
        .rule()
        .required_permissions()
        .map(|required| required.bits().to_string())
}
