//! Map-backed entity cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::command::domain::{EntityId, GuildId};
use crate::command::ports::{
    CachedEntity, EntityCache, EntityCacheError, EntityCacheResult, EntityKind,
};

type EntityKey = (Option<GuildId>, EntityKind, EntityId);

/// Entity cache seeded by hand.
///
/// Entities inserted without a guild are visible from every guild.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityCache {
    entities: Arc<RwLock<HashMap<EntityKey, CachedEntity>>>,
}

impl InMemoryEntityCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, optionally scoped to a guild.
    ///
    /// # Errors
    ///
    /// Returns [`EntityCacheError`] when the cache lock is poisoned.
    pub fn insert(&self, guild: Option<GuildId>, entity: CachedEntity) -> EntityCacheResult<()> {
        let mut entities = self
            .entities
            .write()
            .map_err(|err| EntityCacheError::unavailable(std::io::Error::other(err.to_string())))?;
        entities.insert((guild, entity.kind, entity.id.clone()), entity);
        Ok(())
    }
}

#[async_trait]
impl EntityCache for InMemoryEntityCache {
    async fn lookup(
        &self,
        guild: Option<&GuildId>,
        kind: EntityKind,
        id: &EntityId,
    ) -> EntityCacheResult<Option<CachedEntity>> {
        let entities = self
            .entities
            .read()
            .map_err(|err| EntityCacheError::unavailable(std::io::Error::other(err.to_string())))?;

        let scoped = guild.and_then(|g| entities.get(&(Some(g.clone()), kind, id.clone())));
        Ok(scoped
            .or_else(|| entities.get(&(None, kind, id.clone())))
            .cloned())
    }
}
