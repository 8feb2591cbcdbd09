//! Normalizes text messages and interactions into canonical invocations.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use super::{CommandRegistry, DispatchError, DispatchResult};
use crate::command::config::DispatchConfig;
use crate::command::domain::{
    CanonicalInvocation, ChatCommand, ChildNode, CommandName, CommandPath, DefinitionError,
    EntityId, Interaction, InteractionKind, InteractionOption, OptionKind, ParameterError,
    Parameters, PrefixScope, PrefixTable, ResolvedCommand, TargetReference, TextMessage,
};

/// Name reported when a context-menu interaction carries no target.
const TARGET_PARAMETER: &str = "target";

/// Resolves raw input against the registry.
#[derive(Debug)]
pub struct DispatchResolver {
    registry: Arc<CommandRegistry>,
    prefixes: RwLock<PrefixTable>,
    parameter_separator: String,
    command_separator: String,
}

impl DispatchResolver {
    /// Creates a resolver from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when a configured prefix is invalid.
    pub fn new(
        registry: Arc<CommandRegistry>,
        config: &DispatchConfig,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            registry,
            prefixes: RwLock::new(config.prefix_table()?),
            parameter_separator: config.parameter_separator.clone(),
            command_separator: config.command_separator.clone(),
        })
    }

    /// Changes a prefix at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPrefix`]; the table is unchanged.
    pub fn set_prefix(&self, scope: PrefixScope, prefix: &str) -> Result<(), DefinitionError> {
        self.prefixes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(scope, prefix)
    }

    /// Returns the prefix in effect for a message's guild.
    #[must_use]
    pub fn prefix_for(&self, message: &TextMessage) -> String {
        self.prefixes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .prefix_for(message.guild_id.as_ref())
            .to_owned()
    }

    /// Resolves a text message.
    ///
    /// Returns `Ok(None)` for non-command text: no prefix, or nothing but
    /// the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CommandNotFound`] when the name matches no
    /// command or alias, or [`DispatchError::Parameter`] when arguments do
    /// not bind.
    pub fn resolve_message(
        &self,
        message: &TextMessage,
    ) -> DispatchResult<Option<CanonicalInvocation>> {
        let prefix = self.prefix_for(message);
        let Some(body) = message.content.strip_prefix(prefix.as_str()) else {
            return Ok(None);
        };
        let body = body.trim_start();
        if body.is_empty() {
            return Ok(None);
        }

        let (head, arguments) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        let mut segments = head.split(self.command_separator.as_str());
        let candidate = segments.next().unwrap_or(head).to_lowercase();

        let command = self
            .registry
            .chat_command(&candidate)
            .ok_or_else(|| DispatchError::CommandNotFound(candidate.clone()))?;
        let path = text_path(&command, segments.filter(|segment| !segment.is_empty()));
        let resolved = ResolvedCommand::Chat { command, path };
        debug!(command = %resolved.qualified_name(), "resolved text command");

        let mut pieces: Vec<&str> = arguments
            .split(self.parameter_separator.as_str())
            .map(str::trim)
            .collect();
        if matches!(pieces.as_slice(), [only] if only.is_empty()) {
            pieces.clear();
        }

        let parameters = Parameters::bind_positional(resolved.parameters(), &pieces)
            .map_err(|source| parameter_error(&resolved, source))?;
        Ok(Some(CanonicalInvocation::new(
            resolved,
            parameters,
            None,
            message.context(),
        )))
    }

    /// Resolves a structured interaction.
    ///
    /// Top-level names match exactly; aliases are text-only.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CommandNotFound`] when the command or the
    /// selected subcommand does not exist, or [`DispatchError::Parameter`]
    /// when options do not bind or a context menu lacks its target.
    pub fn resolve_interaction(
        &self,
        interaction: &Interaction,
    ) -> DispatchResult<CanonicalInvocation> {
        match interaction.kind {
            InteractionKind::Command => self.resolve_slash(interaction),
            InteractionKind::ContextMenu => self.resolve_context_menu(interaction),
        }
    }

    fn resolve_slash(&self, interaction: &Interaction) -> DispatchResult<CanonicalInvocation> {
        let command = self
            .registry
            .chat_command_exact(&interaction.command_name)
            .ok_or_else(|| DispatchError::CommandNotFound(interaction.command_name.clone()))?;

        let (path, leaf_options) = interaction_path(&interaction.options);
        let path = path
            .map(|segments| {
                let found = segments
                    .to_path()
                    .filter(|candidate| command.find_subcommand(candidate).is_some());
                found.ok_or_else(|| {
                    DispatchError::CommandNotFound(format!(
                        "{} {}",
                        command.name(),
                        segments.display()
                    ))
                })
            })
            .transpose()?;

        let resolved = ResolvedCommand::Chat { command, path };
        debug!(command = %resolved.qualified_name(), "resolved slash command");

        let parameters = Parameters::bind_named(resolved.parameters(), |name| {
            leaf_options
                .iter()
                .find(|option| option.kind == OptionKind::Value && option.name == name)
                .and_then(|option| option.value.as_ref())
        })
        .map_err(|source| parameter_error(&resolved, source))?;

        Ok(CanonicalInvocation::new(
            resolved,
            parameters,
            None,
            interaction.context(),
        ))
    }

    fn resolve_context_menu(
        &self,
        interaction: &Interaction,
    ) -> DispatchResult<CanonicalInvocation> {
        let command = self
            .registry
            .context_menu(&interaction.command_name)
            .ok_or_else(|| DispatchError::CommandNotFound(interaction.command_name.clone()))?;
        let resolved = ResolvedCommand::ContextMenu(Arc::clone(&command));

        let target_id = interaction.target_id.as_ref().ok_or_else(|| {
            parameter_error(
                &resolved,
                ParameterError::Missing {
                    parameter: TARGET_PARAMETER.to_owned(),
                },
            )
        })?;
        let target = TargetReference::new(
            EntityId::new(target_id.clone()),
            command.target(),
            interaction.guild_id.clone(),
            interaction.channel_id.clone(),
        );
        debug!(command = %command.name(), target = %target.id(), "resolved context-menu command");

        Ok(CanonicalInvocation::new(
            resolved,
            Parameters::default(),
            Some(target),
            interaction.context(),
        ))
    }
}

/// Selects a subcommand from `name/group/sub` text segments.
///
/// Unresolvable segments fall back to the root command.
fn text_path<'a>(
    command: &ChatCommand,
    mut segments: impl Iterator<Item = &'a str>,
) -> Option<CommandPath> {
    let first = segments.next()?;
    let path = match command.find_child(first) {
        Some(ChildNode::Sub(sub)) => Some(CommandPath::direct(sub.name().clone())),
        Some(ChildNode::Group(group)) => segments
            .next()
            .and_then(|second| group.find(second))
            .map(|sub| CommandPath::grouped(group.name().clone(), sub.name().clone())),
        None => None,
    };
    if path.is_none() {
        debug!(command = %command.name(), segment = first, "unresolved subcommand path; using root");
    }
    path
}

/// Raw group and subcommand names from an interaction's options tree.
struct OptionPath<'a> {
    group: Option<&'a str>,
    sub: &'a str,
}

impl OptionPath<'_> {
    fn to_path(&self) -> Option<CommandPath> {
        let sub = CommandName::new(self.sub).ok()?;
        match self.group {
            Some(group) => Some(CommandPath::grouped(CommandName::new(group).ok()?, sub)),
            None => Some(CommandPath::direct(sub)),
        }
    }

    fn display(&self) -> String {
        self.group
            .map_or_else(|| self.sub.to_owned(), |group| format!("{group} {}", self.sub))
    }
}

/// Walks at most two levels of subcommand options.
///
/// Returns the selected path, if any, and the options holding parameter
/// values for the leaf.
fn interaction_path(
    options: &[InteractionOption],
) -> (Option<OptionPath<'_>>, &[InteractionOption]) {
    match options.first() {
        Some(group) if group.kind == OptionKind::SubCommandGroup => {
            match group.options.first() {
                Some(sub) if sub.kind == OptionKind::SubCommand => (
                    Some(OptionPath {
                        group: Some(group.name.as_str()),
                        sub: sub.name.as_str(),
                    }),
                    sub.options.as_slice(),
                ),
                _ => (
                    Some(OptionPath {
                        group: Some(group.name.as_str()),
                        sub: "",
                    }),
                    &[],
                ),
            }
        }
        Some(sub) if sub.kind == OptionKind::SubCommand => (
            Some(OptionPath {
                group: None,
                sub: sub.name.as_str(),
            }),
            sub.options.as_slice(),
        ),
        _ => (None, options),
    }
}

fn parameter_error(resolved: &ResolvedCommand, source: ParameterError) -> DispatchError {
    DispatchError::Parameter {
        command: resolved.qualified_name(),
        source,
    }
}
