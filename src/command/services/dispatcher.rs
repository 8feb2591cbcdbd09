//! The dispatch entry point.
//!
//! [`Dispatcher`] is the single error boundary: every failure from
//! resolution, permission checks or execution is caught here once, logged,
//! emitted as a lifecycle event and turned into exactly one system message.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    CommandExecutor, CommandRegistry, DispatchError, DispatchResolver, ExecutionOutcome,
    ReplySession, SystemMessages,
};
use crate::command::config::{ConfigError, DispatchConfig};
use crate::command::domain::{
    CanonicalInvocation, DefinitionError, Interaction, InvocationContext, LifecycleEvent,
    PrefixScope, ReplyPayload, TextMessage,
};
use crate::command::ports::{EntityCache, LifecycleSink, ReplyTransport};

/// What happened to one inbound event.
#[derive(Debug)]
pub enum DispatchReport {
    /// The message was not addressed to a command.
    Ignored,
    /// The command ran.
    Completed(ExecutionOutcome),
    /// Dispatch failed; a system message was sent.
    Failed(DispatchError),
}

impl DispatchReport {
    /// Returns `true` for [`Self::Completed`].
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the error for [`Self::Failed`].
    #[must_use]
    pub const fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Ignored | Self::Completed(_) => None,
        }
    }
}

/// Routes gateway events through resolution and execution.
pub struct Dispatcher<T, L>
where
    T: ReplyTransport + 'static,
    L: LifecycleSink,
{
    registry: Arc<CommandRegistry>,
    resolver: DispatchResolver,
    executor: CommandExecutor,
    messages: SystemMessages,
    transport: Arc<T>,
    lifecycle: Arc<L>,
}

impl<T, L> Dispatcher<T, L>
where
    T: ReplyTransport + 'static,
    L: LifecycleSink,
{
    /// Creates a dispatcher over `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn new(
        config: &DispatchConfig,
        registry: Arc<CommandRegistry>,
        transport: Arc<T>,
        entities: Arc<dyn EntityCache>,
        lifecycle: Arc<L>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = DispatchResolver::new(Arc::clone(&registry), config)?;
        let executor = CommandExecutor::new(
            config.access_defaults(),
            config.announce_success,
            config.handler_timeout(),
            entities,
        );
        Ok(Self {
            registry,
            resolver,
            executor,
            messages: SystemMessages::new(config.system_messages.clone()),
            transport,
            lifecycle,
        })
    }

    /// Locks the registry and emits [`LifecycleEvent::Ready`].
    pub fn start(&self) {
        self.registry.start();
        let chat_commands = self.registry.chat_commands().len();
        let context_menus = self.registry.context_menus().len();
        info!(chat_commands, context_menus, "dispatcher ready");
        self.lifecycle.emit(LifecycleEvent::Ready {
            chat_commands,
            context_menus,
        });
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Changes a text prefix at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPrefix`]; the prefix is unchanged.
    pub fn set_prefix(&self, scope: PrefixScope, prefix: &str) -> Result<(), DefinitionError> {
        self.resolver.set_prefix(scope, prefix)?;
        info!(prefix, "prefix updated");
        Ok(())
    }

    /// Handles a text message.
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn handle_message(&self, message: &TextMessage) -> DispatchReport {
        match self.resolver.resolve_message(message) {
            Ok(Some(invocation)) => self.run(invocation).await,
            Ok(None) => {
                self.lifecycle.emit(LifecycleEvent::Message(message.clone()));
                DispatchReport::Ignored
            }
            Err(err) => {
                let session = self.session_for(&message.context());
                self.fail(&session, err).await
            }
        }
    }

    /// Handles a structured interaction.
    #[instrument(skip(self, interaction), fields(interaction_id = %interaction.id, command = %interaction.command_name))]
    pub async fn handle_interaction(&self, interaction: &Interaction) -> DispatchReport {
        match self.resolver.resolve_interaction(interaction) {
            Ok(invocation) => self.run(invocation).await,
            Err(err) => {
                let session = self.session_for(&interaction.context());
                self.fail(&session, err).await
            }
        }
    }

    async fn run(&self, invocation: CanonicalInvocation) -> DispatchReport {
        let command = invocation.command().qualified_name();
        let context = invocation.context();
        self.lifecycle.emit(LifecycleEvent::Command {
            name: command.clone(),
            user: context.user_id().clone(),
            guild_id: context.guild_id().cloned(),
        });

        let session = self.session_for(context);
        match self.executor.execute(invocation, &session).await {
            Ok(ExecutionOutcome::OperationSuccess) => {
                let message = self.messages.for_success(&command);
                if let Err(err) = session.reply(ReplyPayload::text(message)).await {
                    warn!(%command, error = %err, "failed to deliver success message");
                }
                DispatchReport::Completed(ExecutionOutcome::OperationSuccess)
            }
            Ok(outcome) => DispatchReport::Completed(outcome),
            Err(err) => self.fail(&session, err).await,
        }
    }

    async fn fail(&self, session: &ReplySession, err: DispatchError) -> DispatchReport {
        error!(command = err.command(), error = %err, "dispatch failed");
        self.lifecycle.emit(LifecycleEvent::Error {
            command: err.command().map(ToOwned::to_owned),
            message: err.to_string(),
        });

        let message = self.messages.for_error(&err);
        if let Err(delivery) = session.reply(ReplyPayload::text(message)).await {
            warn!(error = %delivery, "failed to deliver error message");
        }
        DispatchReport::Failed(err)
    }

    fn session_for(&self, context: &InvocationContext) -> ReplySession {
        ReplySession::new(
            Arc::clone(&self.transport) as Arc<dyn ReplyTransport>,
            context.reply_target(),
        )
    }
}
