//! Text-command prefixes with per-guild overrides.

use std::collections::HashMap;

use super::{DefinitionError, GuildId};

const MAX_PREFIX_LENGTH: usize = 32;

/// Scope a prefix applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixScope {
    /// The fallback prefix.
    Global,
    /// An override for one guild.
    Guild(GuildId),
}

/// Global prefix plus per-guild overrides.
///
/// Only [`PrefixTable::set`] mutates the table, and it rejects invalid
/// prefixes, so every stored prefix is 1-32 characters without whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    global: String,
    guilds: HashMap<GuildId, String>,
}

impl PrefixTable {
    /// Creates a table with the given global prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPrefix`] when the prefix is invalid.
    pub fn new(global: impl Into<String>) -> Result<Self, DefinitionError> {
        let global = validate_prefix(global.into())?;
        Ok(Self {
            global,
            guilds: HashMap::new(),
        })
    }

    /// Sets the prefix for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPrefix`] when the prefix is invalid;
    /// the table is left unchanged.
    pub fn set(
        &mut self,
        scope: PrefixScope,
        prefix: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let prefix = validate_prefix(prefix.into())?;
        match scope {
            PrefixScope::Global => self.global = prefix,
            PrefixScope::Guild(guild) => {
                self.guilds.insert(guild, prefix);
            }
        }
        Ok(())
    }

    /// Removes a guild override, restoring the global fallback.
    pub fn clear(&mut self, guild: &GuildId) -> Option<String> {
        self.guilds.remove(guild)
    }

    /// Returns the prefix in effect for `guild` (global for direct messages).
    #[must_use]
    pub fn prefix_for(&self, guild: Option<&GuildId>) -> &str {
        guild
            .and_then(|id| self.guilds.get(id))
            .map_or(self.global.as_str(), String::as_str)
    }

    /// Returns the global prefix.
    #[must_use]
    pub fn global(&self) -> &str {
        &self.global
    }
}

fn validate_prefix(prefix: String) -> Result<String, DefinitionError> {
    let length = prefix.chars().count();
    if length == 0 || length > MAX_PREFIX_LENGTH || prefix.chars().any(char::is_whitespace) {
        return Err(DefinitionError::InvalidPrefix(prefix));
    }
    Ok(prefix)
}
