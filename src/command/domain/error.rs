//! Error types for command definitions and parameter coercion.

use thiserror::Error;

use super::ParameterType;

/// Errors raised while building command definitions or dispatch settings.
///
/// These are setup-time failures: the offending node or setting is
/// rejected and the rest of the tree is unaffected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The name is empty after trimming.
    #[error("command name must not be empty")]
    EmptyName,

    /// The name contains characters outside the allowed set.
    #[error(
        "invalid name '{0}' (only lowercase letters, digits, '-' and '_' are allowed)"
    )]
    InvalidName(String),

    /// The name exceeds the 32-character limit.
    #[error("name exceeds 32 character limit: {0}")]
    NameTooLong(String),

    /// The description is empty after trimming.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The description exceeds the 100-character limit.
    #[error("description exceeds 100 character limit: {0}")]
    DescriptionTooLong(String),

    /// Choices were declared on a parameter that is not a string.
    #[error("parameter '{parameter}' declares choices but has type {parameter_type}")]
    ChoicesRequireString {
        /// Parameter name.
        parameter: String,
        /// Declared parameter type.
        parameter_type: ParameterType,
    },

    /// A choice label is empty or too long.
    #[error("parameter '{parameter}' has an invalid choice '{choice}'")]
    InvalidChoice {
        /// Parameter name.
        parameter: String,
        /// Offending choice.
        choice: String,
    },

    /// More choices than the platform accepts.
    #[error("parameter '{parameter}' declares {count} choices (at most 25 allowed)")]
    TooManyChoices {
        /// Parameter name.
        parameter: String,
        /// Number of declared choices.
        count: usize,
    },

    /// A `target` parameter was attached outside a context-menu command.
    #[error("parameter '{parameter}' on '{command}' has type target, which only context menus carry")]
    TargetParameterNotAllowed {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// Two parameters on one command share a name.
    #[error("duplicate parameter '{parameter}' on '{command}'")]
    DuplicateParameter {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// A required parameter was declared after an optional one.
    #[error("required parameter '{parameter}' on '{command}' follows an optional parameter")]
    RequiredAfterOptional {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// A child with the same name already exists under the parent.
    #[error("'{parent}' already has a child named '{child}'")]
    DuplicateChild {
        /// Parent node name.
        parent: String,
        /// Child node name.
        child: String,
    },

    /// A subcommand group was appended to another group.
    #[error("group '{child}' cannot be nested inside group '{parent}'")]
    NestedGroup {
        /// Parent group name.
        parent: String,
        /// Nested group name.
        child: String,
    },

    /// A top-level command was appended as a child.
    #[error("top-level command '{child}' cannot be appended under '{parent}'")]
    TopLevelAsChild {
        /// Parent node name.
        parent: String,
        /// Offending command name.
        child: String,
    },

    /// The parent back-reference was already assigned.
    #[error("'{node}' already belongs to '{parent}'")]
    ParentAlreadyAssigned {
        /// Node whose parent was assigned twice.
        node: String,
        /// Existing parent name.
        parent: String,
    },

    /// The prefix is empty, too long or contains whitespace.
    #[error("invalid prefix '{0}' (1-32 characters without whitespace)")]
    InvalidPrefix(String),

    /// A separator is empty or contains whitespace.
    #[error("invalid separator '{0}' (must be non-empty and free of whitespace)")]
    InvalidSeparator(String),

    /// The command and parameter separators are identical.
    #[error("command separator and parameter separator must differ (both are '{0}')")]
    SeparatorCollision(String),
}

/// Errors raised while binding raw input to a parameter schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterError {
    /// A required parameter received no value.
    #[error("missing required parameter '{parameter}'")]
    Missing {
        /// Parameter name.
        parameter: String,
    },

    /// The raw value does not match the declared type.
    #[error("invalid value for parameter '{parameter}' ({expected}): {reason}")]
    Type {
        /// Parameter name.
        parameter: String,
        /// Declared parameter type.
        expected: ParameterType,
        /// Why the value was rejected.
        reason: String,
    },

    /// The value is not one of the declared choices.
    #[error("invalid choice '{value}' for parameter '{parameter}': expected one of [{}]", .choices.join(", "))]
    InvalidChoice {
        /// Parameter name.
        parameter: String,
        /// Supplied value.
        value: String,
        /// Allowed choices.
        choices: Vec<String>,
    },

    /// A `target` parameter was coerced outside a context-menu command.
    #[error("parameter '{parameter}' is a target, which only context menus supply")]
    TargetOutsideContextMenu {
        /// Parameter name.
        parameter: String,
    },
}
