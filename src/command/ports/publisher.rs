//! Command publication port.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::command::domain::{CommandDescription, PublishScope};

/// Result type for publication operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Pushes exported command descriptions to the platform.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Replaces the command set registered for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the platform rejects the batch or the
    /// request fails.
    async fn publish(
        &self,
        scope: &PublishScope,
        commands: &[CommandDescription],
    ) -> PublishResult<()>;
}

/// Errors returned by publisher adapters.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The platform rejected the command batch.
    #[error("platform rejected commands for {scope}: {reason}")]
    Rejected {
        /// Scope that was being published.
        scope: PublishScope,
        /// Platform-supplied reason.
        reason: String,
    },

    /// Request or client failure.
    #[error("publish request failed: {0}")]
    Request(Arc<dyn std::error::Error + Send + Sync>),
}

impl PublishError {
    /// Wraps a client error.
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Request(Arc::new(err))
    }
}
