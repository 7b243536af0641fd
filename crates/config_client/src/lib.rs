//! Client for the GitNotify configuration service.
//!
//! This crate is the only channel to the remote configuration store. It
//! performs two operations against a single endpoint: read the current
//! configuration (`GET`) and replace it wholesale (`PUT`). Every request
//! carries a static bearer credential taken from [`ClientSettings`].
//!
//! There is no retry, no credential refresh and no client-side timeout. A
//! rejected credential surfaces as `Error::Remote { status: 401, .. }`.

use async_trait::async_trait;
use config_model::Configuration;
use reqwest::{header::CONTENT_TYPE, Client, Response, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod settings;
pub use settings::{ClientSettings, DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR, TOKEN_ENV_VAR};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Trait for reading and replacing the service configuration.
///
/// The edit session depends on this trait rather than on the HTTP client so
/// it can be driven by in-memory stores in tests.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads the current configuration.
    ///
    /// Writing the returned value back unmodified must not change anything
    /// on the service.
    ///
    /// # Errors
    /// Returns `Error::Remote` for a rejected request and `Error::Transport`
    /// when the service cannot be reached.
    async fn fetch_configuration(&self) -> Result<Configuration, Error>;

    /// Replaces the whole configuration with `next`.
    ///
    /// This is not a patch. Callers must have merged every field, including
    /// the ones they do not edit, before calling.
    ///
    /// # Errors
    /// Returns `Error::Remote` for a rejected request and `Error::Transport`
    /// when the service cannot be reached.
    async fn replace_configuration(&self, next: &Configuration) -> Result<(), Error>;
}

/// HTTP implementation of [`ConfigStore`].
#[derive(Debug)]
pub struct RemoteConfigClient {
    client: Client,
    settings: ClientSettings,
}

impl RemoteConfigClient {
    /// Creates a client with a default `reqwest` connection pool.
    ///
    /// # Arguments
    ///
    /// * `settings` - Endpoint and bearer credential to use for every request
    ///
    /// # Errors
    /// Returns `Error::Transport` if the HTTP client cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use config_client::{ClientSettings, ConfigStore, RemoteConfigClient};
    ///
    /// # async fn example() -> Result<(), config_client::Error> {
    /// let settings = ClientSettings::new("http://localhost:8080/api/config", "devtoken")?;
    /// let client = RemoteConfigClient::new(settings)?;
    ///
    /// let config = client.fetch_configuration().await?;
    /// println!("organization: {}", config.organization);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: ClientSettings) -> Result<Self, Error> {
        let client = Client::builder().build().map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            Error::Transport(e.to_string())
        })?;
        Ok(Self::with_client(client, settings))
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    pub fn with_client(client: Client, settings: ClientSettings) -> Self {
        Self { client, settings }
    }

    /// The configuration resource this client reads and replaces.
    pub fn endpoint(&self) -> &Url {
        &self.settings.endpoint
    }
}

#[async_trait]
impl ConfigStore for RemoteConfigClient {
    #[instrument(skip(self), fields(endpoint = %self.settings.endpoint))]
    async fn fetch_configuration(&self) -> Result<Configuration, Error> {
        debug!("Fetching configuration");

        let response = self
            .client
            .get(self.settings.endpoint.clone())
            .bearer_auth(self.settings.credential.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = read_body(response).await?;
        if status != StatusCode::OK {
            return Err(remote_error(status, body));
        }

        let config: Configuration = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Configuration response is not a valid document");
            Error::Deserialization(e)
        })?;

        info!(
            organization = %config.organization,
            port = config.port,
            rule_count = config.notifications().len(),
            has_github_app = config.github_app.is_some(),
            "Fetched configuration"
        );
        Ok(config)
    }

    #[instrument(skip(self, next), fields(endpoint = %self.settings.endpoint))]
    async fn replace_configuration(&self, next: &Configuration) -> Result<(), Error> {
        let payload = serde_json::to_vec(next).map_err(|e| {
            error!(error = %e, "Failed to encode configuration");
            Error::Serialization(e)
        })?;

        debug!(
            organization = %next.organization,
            port = next.port,
            rule_count = next.notifications().len(),
            payload_bytes = payload.len(),
            "Replacing configuration"
        );

        let response = self
            .client
            .put(self.settings.endpoint.clone())
            .bearer_auth(self.settings.credential.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await?;
            return Err(remote_error(status, body));
        }

        info!(status = status.as_u16(), "Configuration replaced");
        Ok(())
    }
}

async fn read_body(response: Response) -> Result<String, Error> {
    response.text().await.map_err(transport_error)
}

fn remote_error(status: StatusCode, body: String) -> Error {
    warn!(
        status = status.as_u16(),
        body_length = body.len(),
        "Configuration service rejected the request"
    );
    Error::Remote {
        status: status.as_u16(),
        body,
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    warn!(
        error = %e,
        is_timeout = e.is_timeout(),
        is_connect = e.is_connect(),
        "Request to configuration service did not complete"
    );
    Error::Transport(e.to_string())
}
