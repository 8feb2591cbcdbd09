//! System message rendering.

use minijinja::Environment;
use serde_json::{Map, Value};
use tracing::warn;

use super::DispatchError;
use crate::command::config::SystemMessageTemplates;
use crate::command::domain::Permissions;

/// Which system message template applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMessageKind {
    /// No command matched.
    NotFound,
    /// A permission check failed.
    PermissionDenied,
    /// Any other failure.
    Error,
    /// A void handler completed with announce-success on.
    Success,
}

impl SystemMessageKind {
    /// Selects the template for a dispatch error.
    #[must_use]
    pub const fn for_error(error: &DispatchError) -> Self {
        match error {
            DispatchError::CommandNotFound(_) => Self::NotFound,
            DispatchError::Permissions { .. } => Self::PermissionDenied,
            DispatchError::Parameter { .. }
            | DispatchError::Handler { .. }
            | DispatchError::HandlerTimedOut { .. }
            | DispatchError::HandlerPanicked { .. }
            | DispatchError::NoHandler { .. }
            | DispatchError::Transport(_) => Self::Error,
        }
    }
}

/// Renders system messages from operator templates.
#[derive(Debug, Clone)]
pub struct SystemMessages {
    templates: SystemMessageTemplates,
}

impl SystemMessages {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(templates: SystemMessageTemplates) -> Self {
        Self { templates }
    }

    /// Renders the message for a dispatch error.
    ///
    /// Falls back to the error's own text if the template fails to render.
    #[must_use]
    pub fn for_error(&self, error: &DispatchError) -> String {
        let kind = SystemMessageKind::for_error(error);
        let command = error.command().unwrap_or_default();
        let detail = error.detail();
        self.render(kind, command, &detail, error.required_permissions())
            .unwrap_or_else(|| error.to_string())
    }

    /// Renders the success message for `command`.
    #[must_use]
    pub fn for_success(&self, command: &str) -> String {
        self.render(SystemMessageKind::Success, command, "", None)
            .unwrap_or_else(|| format!("{command} completed."))
    }

    /// Renders a template; `None` when rendering fails.
    #[must_use]
    pub fn render(
        &self,
        kind: SystemMessageKind,
        command: &str,
        detail: &str,
        permissions: Option<Permissions>,
    ) -> Option<String> {
        let template = match kind {
            SystemMessageKind::NotFound => &self.templates.not_found,
            SystemMessageKind::PermissionDenied => &self.templates.permission_denied,
            SystemMessageKind::Error => &self.templates.error,
            SystemMessageKind::Success => &self.templates.success,
        };

        let mut context = Map::new();
        context.insert("command".to_owned(), Value::String(command.to_owned()));
        context.insert("detail".to_owned(), Value::String(detail.to_owned()));
        context.insert(
            "permissions".to_owned(),
            permissions.map_or(Value::Null, |bits| Value::String(bits.to_string())),
        );

        Environment::new()
            .render_str(template, context)
            .map_err(|error| warn!(?kind, %error, "system message template failed to render"))
            .ok()
    }
}
