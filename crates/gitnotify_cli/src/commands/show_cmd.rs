//! `show`: load the configuration and render it.

use clap::Args;
use config_session::{ConfigEditSession, FormModel, FormView};
use tracing::{info, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "show_cmd_tests.rs"]
mod tests;

/// Arguments for the show command
#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Print the webhook secret instead of masking it
    #[arg(long)]
    pub reveal_secret: bool,
}

/// Loads the configuration through `session` and returns the rendered form.
///
/// # Errors
///
/// Returns `Error::LoadFailed` with the service's message when the load fails.
#[instrument(skip(session))]
pub async fn execute(session: &ConfigEditSession, args: &ShowArgs) -> Result<FormModel, Error> {
    let view = if args.reveal_secret {
        FormView::revealing()
    } else {
        FormView::new()
    };

    match view.mount(session).await {
        FormModel::LoadFailed { message } => Err(Error::LoadFailed(message)),
        model => {
            info!(reveal_secret = args.reveal_secret, "Configuration shown");
            Ok(model)
        }
    }
}
