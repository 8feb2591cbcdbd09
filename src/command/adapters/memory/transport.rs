//! Recording reply transport.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::command::domain::{ReplyPayload, ReplyTarget};
use crate::command::ports::{ReplyTransport, TransportError, TransportResult};

/// A transport call as observed by [`InMemoryReplyTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `send_reply`.
    Send {
        /// Reply target.
        target: ReplyTarget,
        /// Payload sent.
        payload: ReplyPayload,
    },
    /// `defer_reply`.
    Defer {
        /// Reply target.
        target: ReplyTarget,
        /// Whether the placeholder is ephemeral.
        ephemeral: bool,
    },
    /// `edit_deferred_reply`.
    Edit {
        /// Reply target.
        target: ReplyTarget,
        /// Replacement payload.
        payload: ReplyPayload,
    },
    /// `delete_deferred_reply`.
    Delete {
        /// Reply target.
        target: ReplyTarget,
    },
}

impl TransportCall {
    /// Returns the payload for sends and edits.
    #[must_use]
    pub const fn payload(&self) -> Option<&ReplyPayload> {
        match self {
            Self::Send { payload, .. } | Self::Edit { payload, .. } => Some(payload),
            Self::Defer { .. } | Self::Delete { .. } => None,
        }
    }
}

/// Transport that records every call instead of talking to a platform.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReplyTransport {
    calls: Arc<RwLock<Vec<TransportCall>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryReplyTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`TransportError::Expired`].
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Returns a snapshot of recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Returns the payloads of all sends and edits in order.
    #[must_use]
    pub fn delivered(&self) -> Vec<ReplyPayload> {
        self.calls()
            .iter()
            .filter_map(TransportCall::payload)
            .cloned()
            .collect()
    }

    fn record(&self, call: TransportCall) -> TransportResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Expired("transport disabled".to_owned()));
        }
        self.calls
            .write()
            .map_err(|err| TransportError::delivery(std::io::Error::other(err.to_string())))?
            .push(call);
        Ok(())
    }
}

#[async_trait]
impl ReplyTransport for InMemoryReplyTransport {
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        payload: &ReplyPayload,
    ) -> TransportResult<()> {
        self.record(TransportCall::Send {
            target: target.clone(),
            payload: payload.clone(),
        })
    }

    async fn defer_reply(&self, target: &ReplyTarget, ephemeral: bool) -> TransportResult<()> {
        self.record(TransportCall::Defer {
            target: target.clone(),
            ephemeral,
        })
    }

    async fn edit_deferred_reply(
        &self,
        target: &ReplyTarget,
        payload: &ReplyPayload,
    ) -> TransportResult<()> {
        self.record(TransportCall::Edit {
            target: target.clone(),
            payload: payload.clone(),
        })
    }

    async fn delete_deferred_reply(&self, target: &ReplyTarget) -> TransportResult<()> {
        self.record(TransportCall::Delete {
            target: target.clone(),
        })
    }
}
