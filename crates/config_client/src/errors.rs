//! Error types for configuration service operations.
//!
//! The two failure classes the edit session cares about are kept apart:
//! [`Error::Remote`] means the service answered and refused, and
//! [`Error::Transport`] means the request never completed. The remaining
//! variants come from building the client or handling payloads.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while talking to the configuration service.
///
/// ## Examples
///
/// ```rust,ignore
/// use config_client::{ConfigStore, Error};
///
/// match client.fetch_configuration().await {
///     Ok(config) => println!("Monitoring {}", config.organization),
///     Err(Error::Remote { status: 401, .. }) => eprintln!("Credential rejected"),
///     Err(err) => eprintln!("{}", err.user_message()),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service responded with a non-success status.
    ///
    /// `body` is the raw response text, passed on verbatim for display. No
    /// attempt is made to interpret it.
    #[error("Configuration service returned status {status}: {body}")]
    Remote { status: u16, body: String },

    /// The request could not be completed (DNS, connection reset, timeout).
    #[error("Failed to reach the configuration service: {0}")]
    Transport(String),

    /// A success response did not contain a readable configuration document.
    #[error("Failed to deserialize configuration response: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The configuration could not be encoded for a replace request.
    #[error("Failed to serialize configuration: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The configured endpoint is not a usable URL.
    #[error("Invalid configuration endpoint: {0}")]
    InvalidEndpoint(String),

    /// A required deployment setting was not provided.
    #[error("Required setting missing: {0}")]
    MissingSetting(String),
}

impl Error {
    /// Text to show the user for this failure.
    ///
    /// For a remote rejection this is the service's own diagnostic, verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::Remote { status, body } if body.trim().is_empty() => {
                format!("HTTP {}", status)
            }
            Error::Remote { body, .. } => body.clone(),
            Error::Transport(detail) => {
                format!("Unable to reach the configuration service: {}", detail)
            }
            other => other.to_string(),
        }
    }

    /// HTTP status of a remote rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
