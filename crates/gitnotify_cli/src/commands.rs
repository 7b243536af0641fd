//! Command modules for the gitnotify-config CLI.
//!
//! - `show_cmd`: load the configuration and render the form
//! - `set_cmd`: edit fields, submit, and render the result
//! - `validate_cmd`: check a notifications document locally
//! - `init_cmd`: write a settings file

use std::sync::Arc;

use config_client::{ClientSettings, RemoteConfigClient};
use config_session::ConfigEditSession;

use crate::errors::Error;

pub mod init_cmd;
pub mod set_cmd;
pub mod show_cmd;
pub mod validate_cmd;

/// Starts an edit session against the service described by `settings`.
pub fn open_session(settings: ClientSettings) -> Result<ConfigEditSession, Error> {
    let client = RemoteConfigClient::new(settings)?;
    Ok(ConfigEditSession::new(Arc::new(client)))
}
