//! Typed edits of the scalar configuration fields.

use config_model::{Configuration, WebhookSecret};
use thiserror::Error;

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;

/// Errors raised while turning textual input into a [`FieldEdit`].
///
/// These play the part of an input widget's own type constraint; they are
/// raised before anything reaches the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldEditError {
    #[error("Unknown field '{0}'. Expected one of: organization, port, webhook_secret")]
    UnknownField(String),

    #[error("Port must be a whole number between 0 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// A new value for one editable scalar field of the working configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Organization(String),
    Port(u16),
    WebhookSecret(WebhookSecret),
}

impl FieldEdit {
    /// Maps a field name and its text value onto a typed edit.
    ///
    /// Accepted names are `organization`, `port` and `webhook_secret`
    /// (`webhook-secret` is also accepted).
    ///
    /// # Errors
    /// Returns `FieldEditError::UnknownField` for other names and
    /// `FieldEditError::InvalidPort` when the port is not a `u16`.
    pub fn parse(name: &str, value: &str) -> Result<Self, FieldEditError> {
        match name {
            "organization" => Ok(FieldEdit::Organization(value.to_string())),
            "port" => value
                .trim()
                .parse::<u16>()
                .map(FieldEdit::Port)
                .map_err(|_| FieldEditError::InvalidPort(value.to_string())),
            "webhook_secret" | "webhook-secret" => {
                Ok(FieldEdit::WebhookSecret(WebhookSecret::new(value)))
            }
            other => Err(FieldEditError::UnknownField(other.to_string())),
        }
    }

    /// Name of the edited field, as it appears in the JSON document.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldEdit::Organization(_) => "organization",
            FieldEdit::Port(_) => "port",
            FieldEdit::WebhookSecret(_) => "webhook_secret",
        }
    }

    pub(crate) fn apply(self, config: &mut Configuration) {
        match self {
            FieldEdit::Organization(value) => config.organization = value,
            FieldEdit::Port(value) => config.port = value,
            FieldEdit::WebhookSecret(value) => config.webhook_secret = value,
        }
    }
}
