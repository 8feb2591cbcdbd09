//! Command handler port.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use super::{EntityCacheError, TransportError};
use crate::command::domain::{ParameterError, ReplyOutcome};
use crate::command::services::CommandContext;

/// Result type for handler invocations.
pub type HandlerResult = Result<ReplyOutcome, HandlerError>;

/// Code run when a command is invoked.
///
/// Handlers may reply manually through [`CommandContext::reply`]; in that
/// case they should return [`ReplyOutcome::Void`].
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] on failure; the dispatcher converts it into
    /// an error system message.
    async fn handle(&self, context: CommandContext) -> HandlerResult;
}

/// Errors returned by command handlers.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// A parameter could not be used.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A manual reply failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An entity lookup failed.
    #[error(transparent)]
    Entity(#[from] EntityCacheError),

    /// A user-facing failure message.
    #[error("{0}")]
    Message(String),

    /// Any other failure.
    #[error("handler failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a user-facing failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wraps an arbitrary error.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}

/// Handler backed by an async closure.
///
/// Built with [`handler_fn`].
pub struct FnHandler<F>(F);

/// Wraps an async closure as a [`CommandHandler`].
///
/// # Examples
///
/// ```
/// use switchboard::command::domain::ChatCommand;
/// use switchboard::command::ports::{HandlerResult, handler_fn};
///
/// let ping = ChatCommand::new("ping", "Replies with pong")
///     .expect("valid command")
///     .with_handler(handler_fn(|_context| async { HandlerResult::Ok("pong".into()) }));
/// assert!(ping.handler().is_some());
/// ```
pub const fn handler_fn<F, Fut>(handler: F) -> FnHandler<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    FnHandler(handler)
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, context: CommandContext) -> HandlerResult {
        (self.0)(context).await
    }
}
