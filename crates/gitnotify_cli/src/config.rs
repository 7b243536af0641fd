//! Settings for the gitnotify-config CLI.
//!
//! Connection settings come from up to four places. For each value the first
//! source that provides it wins:
//!
//! 1. command-line flags (`--endpoint`, `--token`)
//! 2. environment (`GITNOTIFY_API_URL`, `GITNOTIFY_CONFIG_TOKEN`)
//! 3. the TOML settings file (`--settings`, or `gitnotify.toml` when present)
//! 4. built-in defaults (the endpoint only; a token is always required)

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use clap::Args;
use config_client::{ClientSettings, DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR, TOKEN_ENV_VAR};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILENAME: &str = "gitnotify.toml";

const REDACTED: &str = "********";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Connection options shared by every command.
///
/// `Debug` output never shows the token.
#[derive(Args, Clone, Default)]
pub struct ConnectionArgs {
    /// Configuration endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bearer token for the configuration service
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to the TOML settings file
    #[arg(long, global = true)]
    pub settings: Option<String>,
}

/// Contents of the settings file.
///
/// # Example TOML Configuration
///
/// ```toml
/// [service]
/// endpoint = "https://gitnotify.example.com/api/config"
/// token = "devtoken"
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Where the configuration service lives.
#[derive(Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_endpoint")]
    pub endpoint: String,

    /// Bearer token. Prefer the environment variable over storing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ServiceConfig {
    fn default_endpoint() -> String {
        DEFAULT_ENDPOINT.to_string()
    }
}

fn redact(token: &Option<String>) -> Option<&'static str> {
    token.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("endpoint", &self.endpoint)
            .field("token", &redact(&self.token))
            .field("settings", &self.settings)
            .finish()
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            token: None,
        }
    }
}

impl AppConfig {
    /// Loads the settings file at `path`.
    ///
    /// Missing keys fall back to their defaults, so an empty file is valid.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the TOML settings file
    ///
    /// # Returns
    ///
    /// The parsed settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or
    /// is not valid TOML.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitnotify_cli::config::AppConfig;
    /// use std::path::Path;
    ///
    /// let config = AppConfig::load(Path::new("gitnotify.toml"))?;
    /// println!("endpoint: {}", config.service.endpoint);
    /// # Ok::<(), gitnotify_cli::errors::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading settings from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!("Settings file not found: {:?}", path)));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read settings file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Writes the settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization or any file operation fails.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving settings to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write settings file: {}", e)))?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }
}

/// Resolves the settings file path: the given path, or `gitnotify.toml` in
/// the current directory.
pub fn get_settings_path(settings_path: Option<&str>) -> PathBuf {
    if let Some(path) = settings_path {
        PathBuf::from(path)
    } else {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_SETTINGS_FILENAME)
    }
}

/// Loads the settings file named by `--settings`, or the default file when
/// it exists.
///
/// An explicitly named file must exist; the default one is optional.
pub fn load_settings_file(args: &ConnectionArgs) -> Result<Option<AppConfig>, Error> {
    let path = get_settings_path(args.settings.as_deref());
    if args.settings.is_none() && !path.exists() {
        debug!(path = ?path, "No settings file found");
        return Ok(None);
    }
    AppConfig::load(&path).map(Some)
}

/// Builds client settings from flags, the process environment and the
/// settings file.
///
/// # Arguments
///
/// * `args` - Connection flags given on the command line
///
/// # Returns
///
/// Settings ready to hand to the configuration client.
///
/// # Errors
///
/// Returns `Error::Config` when an explicitly named settings file cannot be
/// loaded and `Error::ClientSettings` when no token is found or the endpoint
/// is not a URL.
pub fn resolve_client_settings(args: &ConnectionArgs) -> Result<ClientSettings, Error> {
    let file = load_settings_file(args)?;
    resolve_with(args, |name| env::var(name).ok(), file.as_ref())
}

/// Applies the precedence rules with an explicit environment lookup.
///
/// # Errors
///
/// Returns `Error::ClientSettings` when no token is available from any
/// source or the endpoint is not a usable URL.
pub fn resolve_with<F>(
    args: &ConnectionArgs,
    lookup_env: F,
    file: Option<&AppConfig>,
) -> Result<ClientSettings, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| lookup_env(ENDPOINT_ENV_VAR))
        .or_else(|| file.map(|f| f.service.endpoint.clone()))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let token = args
        .token
        .clone()
        .or_else(|| lookup_env(TOKEN_ENV_VAR))
        .or_else(|| file.and_then(|f| f.service.token.clone()))
        .ok_or_else(|| config_client::Error::MissingSetting(TOKEN_ENV_VAR.to_string()))?;

    debug!(endpoint = %endpoint, "Resolved client settings");
    Ok(ClientSettings::new(&endpoint, token)?)
}
