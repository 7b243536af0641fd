//! Root configuration document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ValidationError, ValidationResult};
use crate::github_app::GitHubAppCredentials;
use crate::notifications::{keep_null, NotificationRule};
use crate::secret::WebhookSecret;

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod tests;

/// Listen port the service falls back to when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Full settings document of one notification service instance.
///
/// # JSON Format
///
/// ```json
/// {
///   "organization": "acme",
///   "port": 8080,
///   "webhook_secret": "s3cret",
///   "notifications": [
///     { "event_type": "pull_request", "actions": ["opened"] }
///   ],
///   "github_app": { "app_id": 1, "installation_id": 2, "private_key_path": "/keys/app.pem" }
/// }
/// ```
///
/// The service replaces the whole document on every save, so anything read
/// from it must survive the trip back. `github_app` and any keys this type
/// does not model (kept in `extra`) are passed through untouched, and the
/// rule list keeps the form it arrived in: missing, `null` or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// GitHub organization being monitored
    #[serde(default)]
    pub organization: String,

    /// Listen port of the service
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret used to validate inbound webhook signatures
    #[serde(default)]
    pub webhook_secret: WebhookSecret,

    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    notifications: Option<Option<Vec<NotificationRule>>>,

    /// GitHub App settings; never edited here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_app: Option<GitHubAppCredentials>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Configuration {
    /// Creates a configuration with no rules and no GitHub App settings.
    pub fn new(organization: impl Into<String>, port: u16, webhook_secret: impl Into<WebhookSecret>) -> Self {
        Self {
            organization: organization.into(),
            port,
            webhook_secret: webhook_secret.into(),
            notifications: Some(Some(Vec::new())),
            github_app: None,
            extra: Map::new(),
        }
    }

    /// Ordered notification filter rules.
    ///
    /// The service encodes an empty rule list as `null`; that reads back as
    /// an empty slice here.
    pub fn notifications(&self) -> &[NotificationRule] {
        self.notifications
            .as_ref()
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    /// Replaces the notification rules.
    ///
    /// Rules equal to the current ones leave the document untouched, so an
    /// unedited `null` or missing list is written back the way it was read.
    pub fn set_notifications(&mut self, rules: Vec<NotificationRule>) {
        if self.notifications() != rules.as_slice() {
            self.notifications = Some(Some(rules));
        }
    }

    /// Applies the scalar rules the service enforces on a replace.
    ///
    /// # Errors
    /// Returns the first violated rule: organization, then webhook secret,
    /// then port.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.organization.is_empty() {
            return Err(ValidationError::OrganizationRequired);
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        if self.port == 0 {
            return Err(ValidationError::PortOutOfRange { port: self.port });
        }
        Ok(())
    }
}
