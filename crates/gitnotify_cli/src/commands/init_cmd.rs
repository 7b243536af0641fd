//! `init`: write a settings file with default values.

use std::path::PathBuf;

use tracing::{debug, error, info, instrument};

use crate::config::{get_settings_path, AppConfig};
use crate::errors::Error;

#[cfg(test)]
#[path = "init_cmd_tests.rs"]
mod tests;

/// Creates a settings file at `path` (default `./gitnotify.toml`).
///
/// Refuses to overwrite an existing file.
#[instrument]
pub fn execute(path: Option<&str>) -> Result<PathBuf, Error> {
    let settings_path = get_settings_path(path);
    debug!(message = "Initializing settings", path = ?settings_path);

    if settings_path.exists() {
        let err = Error::Config(format!(
            "Settings file already exists at {:?}",
            settings_path
        ));
        error!(message = "Settings file already exists", path = ?settings_path);
        return Err(err);
    }

    AppConfig::default().save(&settings_path)?;

    info!(message = "Settings initialized", path = ?settings_path);
    Ok(settings_path)
}
