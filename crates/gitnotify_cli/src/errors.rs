use std::io;

use config_model::ValidationError;
use config_session::FieldEditError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Exit code for a failed operation (load, save or validation).
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for an invalid invocation or unusable settings.
pub const EXIT_USAGE: i32 = 2;

/// Errors that can occur in the gitnotify-config CLI.
///
/// Each variant maps onto one of two exit codes through
/// [`Error::exit_code`]: problems with how the tool was invoked or configured
/// exit with `2`, failures of the operation itself exit with `1`.
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file error: missing, unreadable, or not valid TOML.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Client settings could not be assembled (no token, bad endpoint).
    #[error("Client settings error: {0}")]
    ClientSettings(#[from] config_client::Error),

    /// A file named on the command line could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The configuration could not be loaded from the service.
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// Local validation rejected the edits; nothing was sent.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The service refused the save or could not be reached.
    #[error("Failed to save configuration: {0}")]
    SaveRejected(String),

    /// The user interrupted the command while a request was outstanding.
    #[error("Cancelled before the service replied")]
    Cancelled,

    /// The edit session ended up in a state the command did not expect.
    #[error("Edit session unavailable: {0}")]
    Session(String),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::InvalidArguments(_)
            | Error::ClientSettings(_)
            | Error::ReadFile { .. } => EXIT_USAGE,
            Error::LoadFailed(_)
            | Error::Validation(_)
            | Error::SaveRejected(_)
            | Error::Cancelled
            | Error::Session(_) => EXIT_FAILURE,
        }
    }
}

impl From<FieldEditError> for Error {
    fn from(value: FieldEditError) -> Self {
        Error::InvalidArguments(value.to_string())
    }
}
