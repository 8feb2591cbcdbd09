//! Dispatch error taxonomy.

use thiserror::Error;

use crate::command::domain::{ParameterError, PermissionDenial, Permissions};
use crate::command::ports::{HandlerError, TransportError};

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Every way a dispatch can fail after input reached the engine.
///
/// The dispatcher catches each of these exactly once and turns it into a
/// single system message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command answers to the name.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// Scope, DM policy or permission rule rejected the invocation.
    #[error("permission denied for '{command}': {denial}")]
    Permissions {
        /// Qualified command name.
        command: String,
        /// Reason for the denial.
        denial: PermissionDenial,
    },

    /// Raw input could not be bound to the parameter schema.
    #[error("invalid input for '{command}': {source}")]
    Parameter {
        /// Qualified command name.
        command: String,
        /// Binding failure.
        source: ParameterError,
    },

    /// The handler returned an error.
    #[error("command '{command}' failed: {source}")]
    Handler {
        /// Qualified command name.
        command: String,
        /// Handler failure.
        source: HandlerError,
    },

    /// The handler exceeded its deadline.
    #[error("command '{command}' did not finish within {seconds}s")]
    HandlerTimedOut {
        /// Qualified command name.
        command: String,
        /// Configured deadline.
        seconds: u64,
    },

    /// The handler panicked.
    #[error("command '{command}' panicked: {detail}")]
    HandlerPanicked {
        /// Qualified command name.
        command: String,
        /// Panic message, when it was a string.
        detail: String,
    },

    /// The resolved node has no handler attached.
    #[error("command '{command}' has no handler")]
    NoHandler {
        /// Qualified command name.
        command: String,
    },

    /// Acknowledging or replying failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// Returns the command name the error refers to, if known.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::CommandNotFound(name) => Some(name),
            Self::Permissions { command, .. }
            | Self::Parameter { command, .. }
            | Self::Handler { command, .. }
            | Self::HandlerTimedOut { command, .. }
            | Self::HandlerPanicked { command, .. }
            | Self::NoHandler { command } => Some(command),
            Self::Transport(_) => None,
        }
    }

    /// Returns the missing permission set for bitfield denials.
    #[must_use]
    pub const fn required_permissions(&self) -> Option<Permissions> {
        match self {
            Self::Permissions { denial, .. } => denial.required_permissions(),
            _ => None,
        }
    }

    /// Returns the user-facing detail line.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Permissions { denial, .. } => denial.to_string(),
            Self::Parameter { source, .. } => source.to_string(),
            Self::Handler { source, .. } => source.to_string(),
            Self::CommandNotFound(_)
            | Self::HandlerTimedOut { .. }
            | Self::HandlerPanicked { .. }
            | Self::NoHandler { .. }
            | Self::Transport(_) => self.to_string(),
        }
    }
}
