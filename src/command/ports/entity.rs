//! Entity lookup port backing lazy object and target resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::command::domain::{EntityId, GuildId, ObjectKind, TargetKind};

/// Result type for entity lookups.
pub type EntityCacheResult<T> = Result<T, EntityCacheError>;

/// Kind of entity being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A user or guild member.
    User,
    /// A role.
    Role,
    /// A channel.
    Channel,
    /// A message.
    Message,
}

impl From<TargetKind> for EntityKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Message => Self::Message,
            TargetKind::User => Self::User,
        }
    }
}

impl EntityKind {
    /// Returns the kinds to try, in order, for an object reference.
    ///
    /// Mentionables are looked up as users first, then as roles.
    #[must_use]
    pub const fn candidates(kind: ObjectKind) -> &'static [Self] {
        match kind {
            ObjectKind::User => &[Self::User],
            ObjectKind::Role => &[Self::Role],
            ObjectKind::Channel => &[Self::Channel],
            ObjectKind::Mentionable => &[Self::User, Self::Role],
        }
    }
}

/// A resolved platform entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntity {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Display name (username, role name, channel name or message excerpt).
    pub name: String,
    /// Raw platform payload.
    #[serde(default)]
    pub data: Value,
}

/// Looks up platform entities on demand.
#[async_trait]
pub trait EntityCache: Send + Sync {
    /// Looks up an entity, scoped to `guild` when one is given.
    ///
    /// Returns `None` when the entity does not exist or is not visible.
    ///
    /// # Errors
    ///
    /// Returns [`EntityCacheError`] when the lookup itself fails.
    async fn lookup(
        &self,
        guild: Option<&GuildId>,
        kind: EntityKind,
        id: &EntityId,
    ) -> EntityCacheResult<Option<CachedEntity>>;
}

/// Errors returned by entity cache adapters.
#[derive(Debug, Clone, Error)]
pub enum EntityCacheError {
    /// Backend failure.
    #[error("entity lookup failed: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl EntityCacheError {
    /// Wraps a backend error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
