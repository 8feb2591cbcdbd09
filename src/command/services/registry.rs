//! Command registry with a setup phase and a run phase.
//!
//! During setup, commands are added and children appended. [`start`]
//! engages the run-lock; from then on every mutation is rejected and the
//! registry is only read.
//!
//! [`start`]: CommandRegistry::start

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::domain::{
    ChatCommand, CommandName, CommandNode, CommandType, ContextMenuCommand, DefinitionError,
};

/// Errors returned by registry mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has been started.
    #[error("registry is locked; cannot {operation} after start")]
    Locked {
        /// Rejected operation.
        operation: &'static str,
    },

    /// The name is already taken by a name or alias in the namespace.
    #[error("a {namespace} command named '{name}' is already registered")]
    DuplicateName {
        /// Namespace the collision happened in.
        namespace: CommandType,
        /// Colliding name.
        name: String,
    },

    /// A subcommand or group was registered at top level.
    #[error("'{0}' is not a top-level command")]
    NotTopLevel(String),

    /// The parent passed to `append` is not a registered chat command.
    #[error("no chat command named '{0}' is registered")]
    UnknownParent(String),

    /// The tree rejected the child.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Result type for registry mutations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A registered top-level command.
#[derive(Debug, Clone)]
pub enum RegisteredCommand {
    /// A chat command.
    Chat(Arc<ChatCommand>),
    /// A context-menu command.
    ContextMenu(Arc<ContextMenuCommand>),
}

impl RegisteredCommand {
    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &CommandName {
        match self {
            Self::Chat(command) => command.name(),
            Self::ContextMenu(command) => command.name(),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::Chat(_) => CommandType::Chat,
            Self::ContextMenu(_) => CommandType::ContextMenu,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    chat: Vec<Arc<ChatCommand>>,
    menus: Vec<Arc<ContextMenuCommand>>,
}

impl RegistryState {
    fn chat_name_taken(&self, candidate: &str) -> bool {
        self.chat.iter().any(|command| command.answers_to(candidate))
    }
}

/// In-memory registry of top-level commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    state: RwLock<RegistryState>,
    running: AtomicBool,
}

impl CommandRegistry {
    /// Creates an empty registry in the setup phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level command.
    ///
    /// Aliases that collide with an existing name or alias are dropped with
    /// a warning; the command still registers.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Locked`] after [`Self::start`],
    /// [`RegistryError::NotTopLevel`] for subcommands and groups, or
    /// [`RegistryError::DuplicateName`] when the name is taken.
    pub fn add(&self, node: impl Into<CommandNode>) -> RegistryResult<RegisteredCommand> {
        let mut state = self.write();
        self.ensure_setup("add")?;

        match node.into() {
            CommandNode::Chat(mut command) => {
                if state.chat_name_taken(command.name().as_str()) {
                    return Err(RegistryError::DuplicateName {
                        namespace: CommandType::Chat,
                        name: command.name().to_string(),
                    });
                }

                let command_name = command.name().clone();
                command.retain_aliases(|alias| {
                    let taken = state.chat_name_taken(alias.as_str());
                    if taken {
                        warn!(command = %command_name, %alias, "alias collides with an existing command; dropped");
                    }
                    !taken
                });

                info!(command = %command.name(), aliases = command.aliases().len(), "registered chat command");
                let command = Arc::new(command);
                state.chat.push(Arc::clone(&command));
                Ok(RegisteredCommand::Chat(command))
            }
            CommandNode::ContextMenu(command) => {
                if state
                    .menus
                    .iter()
                    .any(|existing| existing.name() == command.name())
                {
                    return Err(RegistryError::DuplicateName {
                        namespace: CommandType::ContextMenu,
                        name: command.name().to_string(),
                    });
                }

                info!(command = %command.name(), "registered context-menu command");
                let command = Arc::new(command);
                state.menus.push(Arc::clone(&command));
                Ok(RegisteredCommand::ContextMenu(command))
            }
            other @ (CommandNode::Sub(_) | CommandNode::Group(_)) => {
                Err(RegistryError::NotTopLevel(other.name().to_string()))
            }
        }
    }

    /// Attaches a subcommand or group to a registered chat command.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Locked`] after [`Self::start`],
    /// [`RegistryError::UnknownParent`] when `parent` is not registered, or
    /// [`RegistryError::Definition`] when the tree rejects the child.
    pub fn append(&self, parent: &str, child: impl Into<CommandNode>) -> RegistryResult<()> {
        let mut state = self.write();
        self.ensure_setup("append")?;

        let entry = state
            .chat
            .iter_mut()
            .find(|command| command.name().matches(parent))
            .ok_or_else(|| RegistryError::UnknownParent(parent.to_owned()))?;

        let child = child.into();
        debug!(parent, child = %child.name(), "appending child command");
        Arc::make_mut(entry).append(child)?;
        Ok(())
    }

    /// Engages the run-lock. Idempotent.
    pub fn start(&self) {
        let state = self.write();
        if !self.running.swap(true, Ordering::SeqCst) {
            info!(
                chat_commands = state.chat.len(),
                context_menus = state.menus.len(),
                "command registry started"
            );
        }
    }

    /// Returns `true` once [`Self::start`] has been called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Looks up a command by exact name first, then by alias.
    ///
    /// With `command_type` set, only that namespace is searched.
    #[must_use]
    pub fn get(&self, name: &str, command_type: Option<CommandType>) -> Option<RegisteredCommand> {
        let state = self.read();
        let search_chat = command_type != Some(CommandType::ContextMenu);
        let search_menus = command_type != Some(CommandType::Chat);

        let exact_chat = || {
            state
                .chat
                .iter()
                .find(|command| command.name().matches(name))
                .cloned()
                .map(RegisteredCommand::Chat)
        };
        let exact_menu = || {
            state
                .menus
                .iter()
                .find(|command| command.name().as_str() == name)
                .cloned()
                .map(RegisteredCommand::ContextMenu)
        };
        let alias_chat = || {
            state
                .chat
                .iter()
                .find(|command| command.aliases().iter().any(|alias| alias.matches(name)))
                .cloned()
                .map(RegisteredCommand::Chat)
        };

        search_chat
            .then(exact_chat)
            .flatten()
            .or_else(|| search_menus.then(exact_menu).flatten())
            .or_else(|| search_chat.then(alias_chat).flatten())
    }

    /// Looks up a chat command by name or alias.
    #[must_use]
    pub fn chat_command(&self, name: &str) -> Option<Arc<ChatCommand>> {
        match self.get(name, Some(CommandType::Chat)) {
            Some(RegisteredCommand::Chat(command)) => Some(command),
            Some(RegisteredCommand::ContextMenu(_)) | None => None,
        }
    }

    /// Looks up a chat command by exact name, ignoring aliases.
    #[must_use]
    pub fn chat_command_exact(&self, name: &str) -> Option<Arc<ChatCommand>> {
        self.read()
            .chat
            .iter()
            .find(|command| command.name().matches(name))
            .cloned()
    }

    /// Looks up a context-menu command by exact name.
    #[must_use]
    pub fn context_menu(&self, name: &str) -> Option<Arc<ContextMenuCommand>> {
        match self.get(name, Some(CommandType::ContextMenu)) {
            Some(RegisteredCommand::ContextMenu(command)) => Some(command),
            Some(RegisteredCommand::Chat(_)) | None => None,
        }
    }

    /// Returns a snapshot of registered commands in registration order.
    #[must_use]
    pub fn list(&self, command_type: Option<CommandType>) -> Vec<RegisteredCommand> {
        let state = self.read();
        let chat = state
            .chat
            .iter()
            .cloned()
            .map(RegisteredCommand::Chat)
            .filter(|_| command_type != Some(CommandType::ContextMenu));
        let menus = state
            .menus
            .iter()
            .cloned()
            .map(RegisteredCommand::ContextMenu)
            .filter(|_| command_type != Some(CommandType::Chat));
        chat.chain(menus).collect()
    }

    /// Returns a snapshot of chat commands.
    #[must_use]
    pub fn chat_commands(&self) -> Vec<Arc<ChatCommand>> {
        self.read().chat.clone()
    }

    /// Returns a snapshot of context-menu commands.
    #[must_use]
    pub fn context_menus(&self) -> Vec<Arc<ContextMenuCommand>> {
        self.read().menus.clone()
    }

    /// Called with the write guard held; [`Self::start`] flips the flag
    /// under the same guard.
    fn ensure_setup(&self, operation: &'static str) -> RegistryResult<()> {
        if self.is_running() {
            warn!(operation, "command registry is locked; mutation rejected");
            return Err(RegistryError::Locked { operation });
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
