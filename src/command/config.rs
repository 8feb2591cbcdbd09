//! Dispatch configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. [`DispatchConfig::validate`] runs on every load path.

use minijinja::Environment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use super::domain::{
    AccessDefaults, CheckMode, DefinitionError, GuildId, PrefixScope, PrefixTable,
};

/// Default text-command prefix.
pub const DEFAULT_PREFIX: &str = "!";

/// Default handler deadline, kept under the 15-minute interaction token
/// lifetime so the error reply can still be delivered.
pub const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 840;

/// Operator-editable system message templates.
///
/// Templates are rendered with `minijinja` and see the keys `command`,
/// `detail` and `permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemMessageTemplates {
    /// Sent when no command matches.
    pub not_found: String,
    /// Sent when a permission check fails.
    pub permission_denied: String,
    /// Sent for every other dispatch failure.
    pub error: String,
    /// Sent when a void handler completes and announce-success is on.
    pub success: String,
}

impl Default for SystemMessageTemplates {
    fn default() -> Self {
        Self {
            not_found: "Command `{{ command }}` was not found.".to_owned(),
            permission_denied: concat!(
                "You do not have permission to use `{{ command }}`.",
                "{% if permissions %} Required: {{ permissions }}.{% endif %}",
            )
            .to_owned(),
            error: "Command `{{ command }}` failed: {{ detail }}".to_owned(),
            success: "Command `{{ command }}` completed.".to_owned(),
        }
    }
}

impl SystemMessageTemplates {
    fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("not_found", self.not_found.as_str()),
            ("permission_denied", self.permission_denied.as_str()),
            ("error", self.error.as_str()),
            ("success", self.success.as_str()),
        ]
    }
}

/// Settings for the resolver, evaluator and reply protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Global text-command prefix.
    pub prefix: String,
    /// Per-guild prefix overrides.
    pub guild_prefixes: BTreeMap<GuildId, String>,
    /// Separator between positional text arguments.
    pub parameter_separator: String,
    /// Separator between command, group and subcommand in text input.
    pub command_separator: String,
    /// Mode for permission rules that do not set one.
    pub default_check_mode: CheckMode,
    /// DM policy for commands that do not set one.
    pub default_dm_allowed: bool,
    /// Whether void handlers produce a success message by default.
    pub announce_success: bool,
    /// Handler deadline in seconds.
    pub handler_timeout_secs: u64,
    /// System message templates.
    pub system_messages: SystemMessageTemplates,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            guild_prefixes: BTreeMap::new(),
            parameter_separator: ",".to_owned(),
            command_separator: "/".to_owned(),
            default_check_mode: CheckMode::All,
            default_dm_allowed: true,
            announce_success: false,
            handler_timeout_secs: DEFAULT_HANDLER_TIMEOUT_SECS,
            system_messages: SystemMessageTemplates::default(),
        }
    }
}

impl DispatchConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, or
    /// any error from [`Self::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks prefixes, separators, the deadline and template syntax.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Definition`] for an invalid prefix or
    /// separator, [`ConfigError::ZeroTimeout`] for a zero deadline, or
    /// [`ConfigError::Template`] when a template does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prefix_table()?;
        validate_separator(&self.parameter_separator)?;
        validate_separator(&self.command_separator)?;
        if self.parameter_separator == self.command_separator {
            return Err(DefinitionError::SeparatorCollision(self.command_separator.clone()).into());
        }

        if self.handler_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let environment = Environment::new();
        for (name, source) in self.system_messages.entries() {
            environment
                .template_from_str(source)
                .map_err(|error| ConfigError::Template {
                    name,
                    reason: error.to_string(),
                })?;
        }
        Ok(())
    }

    /// Builds the prefix table from the global prefix and guild overrides.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPrefix`] for any invalid prefix.
    pub fn prefix_table(&self) -> Result<PrefixTable, DefinitionError> {
        let mut table = PrefixTable::new(self.prefix.clone())?;
        for (guild, prefix) in &self.guild_prefixes {
            table.set(PrefixScope::Guild(guild.clone()), prefix.clone())?;
        }
        Ok(table)
    }

    /// Returns the permission evaluator fallbacks.
    #[must_use]
    pub const fn access_defaults(&self) -> AccessDefaults {
        AccessDefaults {
            check_mode: self.default_check_mode,
            dm_allowed: self.default_dm_allowed,
        }
    }

    /// Returns the handler deadline.
    #[must_use]
    pub const fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }
}

fn validate_separator(separator: &str) -> Result<(), DefinitionError> {
    if separator.is_empty() || separator.chars().any(char::is_whitespace) {
        return Err(DefinitionError::InvalidSeparator(separator.to_owned()));
    }
    Ok(())
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document is malformed or has unknown keys.
    #[error("invalid dispatch configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A prefix or separator is invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The handler deadline is zero.
    #[error("handler_timeout_secs must be greater than zero")]
    ZeroTimeout,

    /// A system message template does not parse.
    #[error("system message template '{name}' is invalid: {reason}")]
    Template {
        /// Template key.
        name: &'static str,
        /// Parser message.
        reason: String,
    },
}
