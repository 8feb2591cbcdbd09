//! Recording command publisher.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::command::domain::{CommandDescription, PublishScope};
use crate::command::ports::{CommandPublisher, PublishError, PublishResult};

/// Publisher that stores the latest batch per scope.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandPublisher {
    published: Arc<RwLock<BTreeMap<PublishScope, Vec<CommandDescription>>>>,
}

impl InMemoryCommandPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest batch published to `scope`.
    #[must_use]
    pub fn published(&self, scope: &PublishScope) -> Option<Vec<CommandDescription>> {
        self.published
            .read()
            .ok()
            .and_then(|published| published.get(scope).cloned())
    }

    /// Returns every scope that has been published to, in order.
    #[must_use]
    pub fn scopes(&self) -> Vec<PublishScope> {
        self.published
            .read()
            .map(|published| published.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandPublisher for InMemoryCommandPublisher {
    async fn publish(
        &self,
        scope: &PublishScope,
        commands: &[CommandDescription],
    ) -> PublishResult<()> {
        self.published
            .write()
            .map_err(|err| PublishError::request(std::io::Error::other(err.to_string())))?
            .insert(scope.clone(), commands.to_vec());
        Ok(())
    }
}
