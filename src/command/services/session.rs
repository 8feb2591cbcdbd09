//! Per-invocation reply session and handler context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::command::domain::{
    CanonicalInvocation, InvocationContext, Parameters, ReplyPayload, ReplyTarget,
    TargetReference,
};
use crate::command::ports::{
    CachedEntity, EntityCache, EntityCacheResult, EntityKind, ReplyTransport, TransportResult,
};

#[derive(Debug, Default)]
struct SessionState {
    deferred: AtomicBool,
    replied: AtomicBool,
}

/// Tracks the acknowledge and resolve phases of one invocation.
///
/// Clones share state, so a reply sent by the handler is visible to the
/// executor when it interprets the handler's return value.
#[derive(Clone)]
pub struct ReplySession {
    transport: Arc<dyn ReplyTransport>,
    target: ReplyTarget,
    state: Arc<SessionState>,
}

impl ReplySession {
    /// Creates a session for `target`.
    #[must_use]
    pub fn new(transport: Arc<dyn ReplyTransport>, target: ReplyTarget) -> Self {
        Self {
            transport,
            target,
            state: Arc::default(),
        }
    }

    /// Sends the deferred placeholder once; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the acknowledgement fails.
    pub async fn acknowledge(&self, ephemeral: bool) -> TransportResult<()> {
        if self.is_deferred() || self.has_replied() {
            return Ok(());
        }
        self.transport.defer_reply(&self.target, ephemeral).await?;
        self.state.deferred.store(true, Ordering::SeqCst);
        debug!(target = ?self.target, "reply deferred");
        Ok(())
    }

    /// Sends a reply.
    ///
    /// The first reply to a deferred interaction replaces the placeholder;
    /// every other reply is sent as a new message.
    ///
    /// # Errors
    ///
    /// Returns the transport error when delivery fails.
    pub async fn reply(&self, payload: impl Into<ReplyPayload> + Send) -> TransportResult<()> {
        let payload = payload.into();
        if self.is_deferred() && !self.has_replied() {
            self.transport
                .edit_deferred_reply(&self.target, &payload)
                .await?;
        } else {
            self.transport.send_reply(&self.target, &payload).await?;
        }
        self.state.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Deletes an unanswered placeholder. No-op otherwise.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the delete fails.
    pub async fn discard(&self) -> TransportResult<()> {
        if self.is_deferred() && !self.has_replied() {
            self.transport.delete_deferred_reply(&self.target).await?;
        }
        Ok(())
    }

    /// Returns `true` once a placeholder was sent.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.state.deferred.load(Ordering::SeqCst)
    }

    /// Returns `true` once any reply was delivered.
    #[must_use]
    pub fn has_replied(&self) -> bool {
        self.state.replied.load(Ordering::SeqCst)
    }

    /// Returns the reply target.
    #[must_use]
    pub const fn target(&self) -> &ReplyTarget {
        &self.target
    }
}

impl std::fmt::Debug for ReplySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySession")
            .field("target", &self.target)
            .field("deferred", &self.is_deferred())
            .field("replied", &self.has_replied())
            .finish_non_exhaustive()
    }
}

/// Everything a handler receives.
#[derive(Clone)]
pub struct CommandContext {
    invocation: Arc<CanonicalInvocation>,
    session: ReplySession,
    entities: Arc<dyn EntityCache>,
}

impl CommandContext {
    /// Creates a handler context.
    #[must_use]
    pub fn new(
        invocation: Arc<CanonicalInvocation>,
        session: ReplySession,
        entities: Arc<dyn EntityCache>,
    ) -> Self {
        Self {
            invocation,
            session,
            entities,
        }
    }

    /// Returns the canonical invocation.
    #[must_use]
    pub fn invocation(&self) -> &CanonicalInvocation {
        &self.invocation
    }

    /// Returns the bound parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        self.invocation.parameters()
    }

    /// Returns who invoked the command and where.
    #[must_use]
    pub fn context(&self) -> &InvocationContext {
        self.invocation.context()
    }

    /// Returns the context-menu target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&TargetReference> {
        self.invocation.target()
    }

    /// Returns the reply session for manual replies.
    #[must_use]
    pub const fn session(&self) -> &ReplySession {
        &self.session
    }

    /// Sends a manual reply.
    ///
    /// # Errors
    ///
    /// Returns the transport error when delivery fails.
    pub async fn reply(&self, payload: impl Into<ReplyPayload> + Send) -> TransportResult<()> {
        self.session.reply(payload).await
    }

    /// Resolves the object reference bound to parameter `name`.
    ///
    /// Returns `None` when the parameter is unset or the entity is unknown.
    /// Mentionables are tried as users, then roles.
    ///
    /// # Errors
    ///
    /// Returns the cache error when a lookup fails.
    pub async fn resolve_object(&self, name: &str) -> EntityCacheResult<Option<CachedEntity>> {
        let Some(reference) = self.parameters().object(name) else {
            return Ok(None);
        };
        let guild = self.context().guild_id();
        for kind in EntityKind::candidates(reference.kind()) {
            if let Some(entity) = self.entities.lookup(guild, *kind, reference.id()).await? {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    /// Resolves the context-menu target.
    ///
    /// # Errors
    ///
    /// Returns the cache error when the lookup fails.
    pub async fn resolve_target(&self) -> EntityCacheResult<Option<CachedEntity>> {
        let Some(target) = self.target() else {
            return Ok(None);
        };
        self.entities
            .lookup(target.guild_id(), target.kind().into(), target.id())
            .await
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("invocation", &self.invocation)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
