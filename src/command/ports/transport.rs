//! Reply transport port.
//!
//! The dispatch core produces abstract [`ReplyPayload`]s; transports own
//! the platform calls. Interactions use the two-phase protocol: a deferred
//! placeholder first, then an edit or a delete.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::command::domain::{ReplyPayload, ReplyTarget};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Delivers replies for text messages and interactions.
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    /// Sends a reply. For a deferred interaction this is a follow-up.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when delivery fails.
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        payload: &ReplyPayload,
    ) -> TransportResult<()>;

    /// Acknowledges an interaction with a "thinking" placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the acknowledgement fails.
    async fn defer_reply(&self, target: &ReplyTarget, ephemeral: bool) -> TransportResult<()>;

    /// Replaces the deferred placeholder with a payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the edit fails.
    async fn edit_deferred_reply(
        &self,
        target: &ReplyTarget,
        payload: &ReplyPayload,
    ) -> TransportResult<()>;

    /// Removes the deferred placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the delete fails.
    async fn delete_deferred_reply(&self, target: &ReplyTarget) -> TransportResult<()>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The interaction token or message is no longer valid.
    #[error("reply target expired: {0}")]
    Expired(String),

    /// Client or network failure.
    #[error("reply delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a client error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
