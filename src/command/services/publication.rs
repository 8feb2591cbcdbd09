//! Exports the registered tree and publishes it per scope.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use super::CommandRegistry;
use crate::command::domain::{AccessDefaults, CommandDescription, PublishScope};
use crate::command::ports::{CommandPublisher, PublishError};

/// Outcome of one publication run.
#[derive(Debug, Default)]
pub struct PublicationReport {
    /// Scopes that accepted their batch, with the batch size.
    pub published: Vec<(PublishScope, usize)>,
    /// Scopes whose batch failed.
    pub failed: Vec<(PublishScope, PublishError)>,
}

impl PublicationReport {
    /// Returns `true` when every scope published.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Publishes slash and context-menu commands through a [`CommandPublisher`].
#[derive(Clone)]
pub struct CommandPublicationService<P>
where
    P: CommandPublisher,
{
    registry: Arc<CommandRegistry>,
    publisher: Arc<P>,
    defaults: AccessDefaults,
}

impl<P> CommandPublicationService<P>
where
    P: CommandPublisher,
{
    /// Creates a publication service.
    #[must_use]
    pub const fn new(
        registry: Arc<CommandRegistry>,
        publisher: Arc<P>,
        defaults: AccessDefaults,
    ) -> Self {
        Self {
            registry,
            publisher,
            defaults,
        }
    }

    /// Groups command descriptions by scope.
    ///
    /// Text-only chat commands are omitted. Commands scoped to several
    /// guilds appear in each guild's batch.
    #[must_use]
    pub fn export(&self) -> BTreeMap<PublishScope, Vec<CommandDescription>> {
        let mut batches: BTreeMap<PublishScope, Vec<CommandDescription>> = BTreeMap::new();

        for command in self.registry.chat_commands() {
            if !command.is_slash() {
                continue;
            }
            let description = CommandDescription::from_chat(&command, self.defaults);
            for scope in PublishScope::for_policy(command.access()) {
                batches.entry(scope).or_default().push(description.clone());
            }
        }

        for command in self.registry.context_menus() {
            let description = CommandDescription::from_context_menu(&command, self.defaults);
            for scope in PublishScope::for_policy(command.access()) {
                batches.entry(scope).or_default().push(description.clone());
            }
        }

        batches
    }

    /// Publishes every scope's batch.
    ///
    /// Failures are logged and reported; remaining scopes still publish.
    pub async fn publish(&self) -> PublicationReport {
        let mut report = PublicationReport::default();
        for (scope, commands) in self.export() {
            match self.publisher.publish(&scope, &commands).await {
                Ok(()) => {
                    info!(%scope, count = commands.len(), "published commands");
                    report.published.push((scope, commands.len()));
                }
                Err(err) => {
                    error!(%scope, error = %err, "failed to publish commands");
                    report.failed.push((scope, err));
                }
            }
        }
        report
    }
}
