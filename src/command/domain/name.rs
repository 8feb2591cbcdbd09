//! Validated command names and descriptions.

use super::DefinitionError;
use serde::Serialize;
use std::fmt;

/// Maximum length for command, subcommand, group and parameter names.
const MAX_NAME_LENGTH: usize = 32;

/// Maximum length for descriptions.
const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Validated command identifier.
///
/// Chat commands, subcommands, groups and parameters use the restricted
/// pattern (lowercase letters, digits, `-`, `_`). Context-menu commands
/// accept any characters and keep their case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Creates a name for a chat command, subcommand, group or parameter.
    ///
    /// The input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyName`] when the value is empty after
    /// trimming, [`DefinitionError::NameTooLong`] when it exceeds 32
    /// characters, or [`DefinitionError::InvalidName`] when it contains
    /// characters outside the allowed set.
    pub fn new(value: impl Into<String>) -> Result<Self, DefinitionError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        if normalized.chars().count() > MAX_NAME_LENGTH {
            return Err(DefinitionError::NameTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

        if !is_valid {
            return Err(DefinitionError::InvalidName(raw));
        }

        Ok(Self(normalized))
    }

    /// Creates a context-menu command name.
    ///
    /// Any characters are accepted; the value is trimmed but not lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyName`] or
    /// [`DefinitionError::NameTooLong`].
    pub fn context_menu(value: impl Into<String>) -> Result<Self, DefinitionError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DefinitionError::NameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when `candidate` names this command, ignoring case.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate || self.0 == candidate.to_lowercase()
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated human-readable description (1-100 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Creates a description.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyDescription`] when the value is empty
    /// after trimming or [`DefinitionError::DescriptionTooLong`] when it
    /// exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DefinitionError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DefinitionError::EmptyDescription);
        }

        if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DefinitionError::DescriptionTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the description as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
