//! Redacted holder for the webhook signing secret.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;

const REDACTED: &str = "********";

/// The shared secret used to validate inbound webhook signatures.
///
/// Serializes as a plain JSON string because the service needs the value,
/// but `Debug` and `Display` never print it. Use [`WebhookSecret::expose`]
/// where the plain text is genuinely required.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain-text secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for WebhookSecret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WebhookSecret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WebhookSecret").field(&REDACTED).finish()
    }
}

impl fmt::Display for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
