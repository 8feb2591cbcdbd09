//! Handler execution and the reply protocol.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{CommandContext, DispatchError, DispatchResult, ReplySession};
use crate::command::domain::{AccessDefaults, CanonicalInvocation};
use crate::command::ports::EntityCache;

/// How an invocation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// A reply was delivered, by the handler or from its return value.
    Replied,
    /// The handler returned nothing and success should be announced.
    OperationSuccess,
    /// The handler returned nothing and nothing is announced.
    Silent,
}

/// Runs resolved invocations.
#[derive(Clone)]
pub struct CommandExecutor {
    defaults: AccessDefaults,
    announce_success: bool,
    handler_timeout: Duration,
    entities: Arc<dyn EntityCache>,
}

impl CommandExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        defaults: AccessDefaults,
        announce_success: bool,
        handler_timeout: Duration,
        entities: Arc<dyn EntityCache>,
    ) -> Self {
        Self {
            defaults,
            announce_success,
            handler_timeout,
            entities,
        }
    }

    /// Checks the root policy, then the subcommand's own rule.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Permissions`] with the first denial.
    pub fn authorize(&self, invocation: &CanonicalInvocation) -> DispatchResult<()> {
        let command = invocation.command();
        let context = invocation.context();
        let denied = |denial| DispatchError::Permissions {
            command: command.qualified_name(),
            denial,
        };

        command
            .access()
            .evaluate(context, self.defaults)
            .map_err(denied)?;
        if let Some(rule) = command.leaf_rule() {
            rule.evaluate(context, self.defaults.check_mode)
                .map_err(denied)?;
        }
        Ok(())
    }

    /// Authorizes, acknowledges, runs the handler and resolves its outcome.
    ///
    /// Structured interactions are deferred before the handler runs. A
    /// non-void return after a manual reply is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for denials, missing handlers, handler
    /// failures, deadline expiry and transport failures.
    pub async fn execute(
        &self,
        invocation: CanonicalInvocation,
        session: &ReplySession,
    ) -> DispatchResult<ExecutionOutcome> {
        self.authorize(&invocation)?;

        let command = invocation.command().qualified_name();
        let handler = invocation
            .command()
            .handler()
            .cloned()
            .ok_or_else(|| DispatchError::NoHandler {
                command: command.clone(),
            })?;
        let announce = invocation
            .command()
            .announce_success_override()
            .unwrap_or(self.announce_success);

        if invocation.context().is_structured() {
            session.acknowledge(false).await?;
        }

        let context = CommandContext::new(
            Arc::new(invocation),
            session.clone(),
            Arc::clone(&self.entities),
        );
        debug!(%command, "running handler");
        let guarded = AssertUnwindSafe(handler.as_handler().handle(context)).catch_unwind();
        let outcome = tokio::time::timeout(self.handler_timeout, guarded)
            .await
            .map_err(|_elapsed| DispatchError::HandlerTimedOut {
                command: command.clone(),
                seconds: self.handler_timeout.as_secs(),
            })?
            .map_err(|payload| {
                let detail = panic_detail(payload.as_ref());
                error!(%command, %detail, "handler panicked");
                DispatchError::HandlerPanicked {
                    command: command.clone(),
                    detail,
                }
            })?
            .map_err(|source| DispatchError::Handler {
                command: command.clone(),
                source,
            })?;

        match outcome.into_payload() {
            Some(_) if session.has_replied() => {
                warn!(%command, "handler replied manually and returned a reply; return value dropped");
                Ok(ExecutionOutcome::Replied)
            }
            Some(payload) => {
                session.reply(payload).await?;
                Ok(ExecutionOutcome::Replied)
            }
            None if session.has_replied() => Ok(ExecutionOutcome::Replied),
            None if announce => Ok(ExecutionOutcome::OperationSuccess),
            None => {
                session.discard().await?;
                Ok(ExecutionOutcome::Silent)
            }
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("defaults", &self.defaults)
            .field("announce_success", &self.announce_success)
            .field("handler_timeout", &self.handler_timeout)
            .finish_non_exhaustive()
    }
}
