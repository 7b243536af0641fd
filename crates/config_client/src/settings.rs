//! Deployment settings for the configuration service client.
//!
//! Endpoint and credential are resolved once, before a session starts, and
//! handed to the client as an explicit value. Nothing in the client reads
//! the process environment on its own.

use std::env;

use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::errors::Error;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/config";

/// Environment variable holding the configuration endpoint URL.
pub const ENDPOINT_ENV_VAR: &str = "GITNOTIFY_API_URL";

/// Environment variable holding the bearer credential.
pub const TOKEN_ENV_VAR: &str = "GITNOTIFY_CONFIG_TOKEN";

/// Where the configuration service lives and how to authenticate to it.
///
/// The credential is a [`SecretString`], so `Debug` output stays redacted.
#[derive(Debug)]
pub struct ClientSettings {
    /// Full URL of the configuration resource (GET and PUT target)
    pub endpoint: Url,

    /// Static bearer credential sent with every request
    pub credential: SecretString,
}

impl ClientSettings {
    /// Builds settings from an endpoint string and a credential.
    ///
    /// # Errors
    /// Returns `Error::InvalidEndpoint` if the endpoint is not an absolute
    /// http(s) URL, and `Error::MissingSetting` if the credential is empty.
    pub fn new(endpoint: &str, credential: impl Into<String>) -> Result<Self, Error> {
        let endpoint = parse_endpoint(endpoint)?;

        let credential = credential.into();
        if credential.is_empty() {
            return Err(Error::MissingSetting(TOKEN_ENV_VAR.to_string()));
        }

        Ok(Self {
            endpoint,
            credential: SecretString::from(credential),
        })
    }

    /// Reads settings from `GITNOTIFY_API_URL` and `GITNOTIFY_CONFIG_TOKEN`.
    ///
    /// The endpoint falls back to [`DEFAULT_ENDPOINT`]; the token is required.
    ///
    /// # Errors
    /// Returns `Error::MissingSetting` when no token is set, or
    /// `Error::InvalidEndpoint` when the endpoint does not parse.
    pub fn from_env() -> Result<Self, Error> {
        let endpoint = env::var(ENDPOINT_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = env::var(TOKEN_ENV_VAR)
            .map_err(|_| Error::MissingSetting(TOKEN_ENV_VAR.to_string()))?;

        debug!(endpoint = %endpoint, "Resolved client settings from environment");
        Self::new(&endpoint, token)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, Error> {
    let url = Url::parse(endpoint).map_err(|e| Error::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidEndpoint(format!(
            "{}: unsupported scheme '{}'",
            endpoint, other
        ))),
    }
}
