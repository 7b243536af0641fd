//! Validation error types.
//!
//! Every error here is local: it is produced before any network call and the
//! user recovers by editing and resubmitting.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Reasons a configuration or notifications document is rejected locally.
///
/// The `Display` text of each variant is what the edit session shows in its
/// error banner, so the messages are written for the person editing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The raw notifications text is not parseable JSON.
    #[error("Notifications must be valid JSON")]
    NotificationsNotJson { reason: String },

    /// The notifications document parsed, but is not an array.
    #[error("notifications must be a JSON array of rules")]
    NotificationsNotArray,

    /// An element of the notifications array is not an object.
    #[error("notification rule {index}: rule must be a JSON object")]
    RuleNotObject { index: usize },

    /// A rule is missing `event_type`, or it is empty or not a string.
    #[error("notification rule {index}: event_type must be a non-empty string")]
    InvalidEventType { index: usize },

    /// `actions` or `repos` is present but not a list of non-empty strings.
    #[error("notification rule {index}: {field} must be an array of non-empty strings")]
    InvalidValueList { index: usize, field: &'static str },

    /// The rule passed the structural checks but could not be decoded.
    #[error("notification rule {index}: {reason}")]
    RuleRejected { index: usize, reason: String },

    #[error("organization is required")]
    OrganizationRequired,

    #[error("webhook_secret is required")]
    WebhookSecretRequired,

    #[error("port must be between 1 and 65535")]
    PortOutOfRange { port: u16 },
}

/// Result type alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
