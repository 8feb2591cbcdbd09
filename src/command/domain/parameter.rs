//! Parameter schema, typed values and coercion rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use super::{
    CommandName, DefinitionError, Description, ObjectKind, ObjectReference, ParameterError,
};

/// Maximum number of choices a string parameter may declare.
const MAX_CHOICES: usize = 25;

/// Maximum length of a single choice.
const MAX_CHOICE_LENGTH: usize = 100;

/// Semantic parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// Free-form string, optionally restricted to choices.
    String,
    /// Boolean (`true` or `false`, case-insensitive).
    Boolean,
    /// Integer value.
    Number,
    /// User mention or id.
    User,
    /// Role mention or id.
    Role,
    /// Channel mention or id.
    Channel,
    /// User or role mention or id.
    Mentionable,
    /// Context-menu target.
    Target,
}

impl ParameterType {
    /// Every parameter type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Boolean,
        Self::Number,
        Self::User,
        Self::Role,
        Self::Channel,
        Self::Mentionable,
        Self::Target,
    ];

    /// Returns the platform option type code.
    ///
    /// `Target` is never published as an option and maps to `0`.
    #[must_use]
    pub const fn type_code(self) -> u8 {
        match self {
            Self::Target => 0,
            Self::String => 3,
            Self::Number => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
        }
    }

    /// Returns the lowercase type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::User => "user",
            Self::Role => "role",
            Self::Channel => "channel",
            Self::Mentionable => "mentionable",
            Self::Target => "target",
        }
    }

    const fn object_kind(self) -> Option<ObjectKind> {
        match self {
            Self::User => Some(ObjectKind::User),
            Self::Role => Some(ObjectKind::Role),
            Self::Channel => Some(ObjectKind::Channel),
            Self::Mentionable => Some(ObjectKind::Mentionable),
            Self::String | Self::Boolean | Self::Number | Self::Target => None,
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared parameter of a command or subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    name: CommandName,
    description: Description,
    optional: bool,
    parameter_type: ParameterType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<String>,
}

impl ParameterSchema {
    /// Creates a required parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_type: ParameterType,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: CommandName::new(name)?,
            description: Description::new(description)?,
            optional: false,
            parameter_type,
            choices: Vec::new(),
        })
    }

    /// Marks the parameter as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Restricts a string parameter to a fixed set of choices.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::ChoicesRequireString`] for non-string
    /// parameters, [`DefinitionError::TooManyChoices`] past 25 choices, or
    /// [`DefinitionError::InvalidChoice`] for empty or overlong labels.
    pub fn with_choices(
        mut self,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, DefinitionError> {
        if self.parameter_type != ParameterType::String {
            return Err(DefinitionError::ChoicesRequireString {
                parameter: self.name.to_string(),
                parameter_type: self.parameter_type,
            });
        }

        let collected: Vec<String> = choices.into_iter().map(Into::into).collect();
        if collected.len() > MAX_CHOICES {
            return Err(DefinitionError::TooManyChoices {
                parameter: self.name.to_string(),
                count: collected.len(),
            });
        }

        if let Some(bad) = collected
            .iter()
            .find(|choice| choice.is_empty() || choice.chars().count() > MAX_CHOICE_LENGTH)
        {
            return Err(DefinitionError::InvalidChoice {
                parameter: self.name.to_string(),
                choice: bad.clone(),
            });
        }

        self.choices = collected;
        Ok(self)
    }

    /// Returns the parameter name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the parameter description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns `true` when the parameter may be omitted.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    /// Returns the allowed choices (empty when unrestricted).
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Coerces a raw value into a typed value.
    ///
    /// Text input arrives as JSON strings; structured interaction options
    /// arrive as native JSON values.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Type`] when the value does not match the
    /// declared type, [`ParameterError::InvalidChoice`] when a string is
    /// not among the choices, or [`ParameterError::TargetOutsideContextMenu`]
    /// for `target` parameters.
    pub fn coerce(&self, raw: &Value) -> Result<ParameterValue, ParameterError> {
        match self.parameter_type {
            ParameterType::String => self.coerce_string(raw),
            ParameterType::Boolean => self.coerce_boolean(raw),
            ParameterType::Number => self.coerce_number(raw),
            ParameterType::User
            | ParameterType::Role
            | ParameterType::Channel
            | ParameterType::Mentionable => self.coerce_object(raw),
            ParameterType::Target => Err(ParameterError::TargetOutsideContextMenu {
                parameter: self.name.to_string(),
            }),
        }
    }

    /// Binds an optional raw value to this schema.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Missing`] when a required parameter has no
    /// value, or any coercion error from [`Self::coerce`].
    pub fn bind(&self, raw: Option<&Value>) -> Result<BoundParameter, ParameterError> {
        let value = match raw {
            Some(value) => Some(self.coerce(value)?),
            None if self.optional => None,
            None => {
                return Err(ParameterError::Missing {
                    parameter: self.name.to_string(),
                });
            }
        };

        Ok(BoundParameter {
            schema: self.clone(),
            value,
        })
    }

    fn coerce_string(&self, raw: &Value) -> Result<ParameterValue, ParameterError> {
        let Value::String(text) = raw else {
            return Err(self.type_error("expected a string"));
        };

        if !self.choices.is_empty() && !self.choices.iter().any(|choice| choice == text) {
            return Err(ParameterError::InvalidChoice {
                parameter: self.name.to_string(),
                value: text.clone(),
                choices: self.choices.clone(),
            });
        }

        Ok(ParameterValue::String(text.clone()))
    }

    fn coerce_boolean(&self, raw: &Value) -> Result<ParameterValue, ParameterError> {
        match raw {
            Value::Bool(flag) => Ok(ParameterValue::Boolean(*flag)),
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(ParameterValue::Boolean(true)),
                "false" => Ok(ParameterValue::Boolean(false)),
                _ => Err(self.type_error("expected true or false")),
            },
            _ => Err(self.type_error("expected true or false")),
        }
    }

    fn coerce_number(&self, raw: &Value) -> Result<ParameterValue, ParameterError> {
        let parsed = match raw {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(ParameterValue::Integer)
            .ok_or_else(|| self.type_error("expected an integer"))
    }

    fn coerce_object(&self, raw: &Value) -> Result<ParameterValue, ParameterError> {
        let Some(kind) = self.parameter_type.object_kind() else {
            return Err(self.type_error("not an object parameter"));
        };
        let text = match raw {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return Err(self.type_error("expected a mention or id")),
        };
        ObjectReference::parse(kind, &text)
            .map(ParameterValue::Object)
            .ok_or_else(|| self.type_error("expected a mention or id"))
    }

    fn type_error(&self, reason: &str) -> ParameterError {
        ParameterError::Type {
            parameter: self.name.to_string(),
            expected: self.parameter_type,
            reason: reason.to_owned(),
        }
    }
}

/// Checks a parameter list for duplicates, ordering and target misuse.
pub(crate) fn validate_parameter_list(
    command: &CommandName,
    parameters: &[ParameterSchema],
) -> Result<(), DefinitionError> {
    let mut names = HashSet::new();
    let mut seen_optional = false;
    for parameter in parameters {
        if parameter.parameter_type == ParameterType::Target {
            return Err(DefinitionError::TargetParameterNotAllowed {
                command: command.to_string(),
                parameter: parameter.name.to_string(),
            });
        }
        if !names.insert(parameter.name.as_str()) {
            return Err(DefinitionError::DuplicateParameter {
                command: command.to_string(),
                parameter: parameter.name.to_string(),
            });
        }
        if seen_optional && !parameter.optional {
            return Err(DefinitionError::RequiredAfterOptional {
                command: command.to_string(),
                parameter: parameter.name.to_string(),
            });
        }
        seen_optional |= parameter.optional;
    }
    Ok(())
}

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// String value.
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Deferred user, role or channel reference.
    Object(ObjectReference),
}

impl ParameterValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the object reference, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectReference> {
        match self {
            Self::Object(reference) => Some(reference),
            _ => None,
        }
    }
}

/// A schema paired with its resolved value.
///
/// `value` is `None` only for optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParameter {
    schema: ParameterSchema,
    value: Option<ParameterValue>,
}

impl BoundParameter {
    /// Returns the schema this value was bound against.
    #[must_use]
    pub const fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Returns the bound value, if one was supplied.
    #[must_use]
    pub const fn value(&self) -> Option<&ParameterValue> {
        self.value.as_ref()
    }
}

/// Ordered parameter set produced for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    bound: Vec<BoundParameter>,
}

impl Parameters {
    /// Creates a parameter set from bound parameters in schema order.
    #[must_use]
    pub const fn new(bound: Vec<BoundParameter>) -> Self {
        Self { bound }
    }

    /// Binds positional raw strings against a schema list.
    ///
    /// Empty pieces count as absent values; pieces beyond the schema are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] raised while binding.
    pub fn bind_positional(
        schemas: &[ParameterSchema],
        pieces: &[&str],
    ) -> Result<Self, ParameterError> {
        schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| {
                let raw = pieces
                    .get(index)
                    .filter(|piece| !piece.is_empty())
                    .map(|piece| Value::String((*piece).to_owned()));
                schema.bind(raw.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Binds named raw values against a schema list.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] raised while binding.
    pub fn bind_named<'a>(
        schemas: &[ParameterSchema],
        lookup: impl Fn(&str) -> Option<&'a Value>,
    ) -> Result<Self, ParameterError> {
        schemas
            .iter()
            .map(|schema| schema.bind(lookup(schema.name().as_str())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.bound
            .iter()
            .find(|parameter| parameter.schema.name().as_str() == name)
            .and_then(BoundParameter::value)
    }

    /// Returns the string bound to `name`, if any.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_str)
    }

    /// Returns the integer bound to `name`, if any.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_integer)
    }

    /// Returns the boolean bound to `name`, if any.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParameterValue::as_bool)
    }

    /// Returns the object reference bound to `name`, if any.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&ObjectReference> {
        self.get(name).and_then(ParameterValue::as_object)
    }

    /// Iterates over bound parameters in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundParameter> {
        self.bound.iter()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Returns `true` when no parameters were bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}
