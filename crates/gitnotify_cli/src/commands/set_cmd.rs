//! `set`: apply edits to the configuration and save it.
//!
//! The command behaves like one pass through the dashboard form: load, type
//! into the fields, press submit. Everything the user typed is turned into
//! [`FormInput`]s before any request is made, so bad arguments never reach
//! the service.

use std::{fs, future::Future, io, path::PathBuf};

use clap::Args;
use config_session::{
    ConfigEditSession, DispatchOutcome, EditOutcome, FieldEdit, FormInput, FormModel, FormView,
    SubmitOutcome,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::Error;

#[cfg(test)]
#[path = "set_cmd_tests.rs"]
mod tests;

/// Value of `--notifications` that reads the document from standard input.
pub const STDIN_MARKER: &str = "-";

/// Arguments for the set command
#[derive(Args, Clone, Default)]
pub struct SetArgs {
    /// New organization name
    #[arg(long)]
    pub organization: Option<String>,

    /// New listening port
    #[arg(long)]
    pub port: Option<String>,

    /// New webhook signing secret
    #[arg(long)]
    pub webhook_secret: Option<String>,

    /// Read the notifications JSON document from this file
    #[arg(long, conflicts_with = "notifications")]
    pub notifications_file: Option<PathBuf>,

    /// Notifications JSON document, or `-` to read it from standard input
    #[arg(long)]
    pub notifications: Option<String>,
}

/// Turns the command-line arguments into form input.
///
/// # Errors
///
/// Returns `Error::InvalidArguments` when nothing would change or a field
/// value is malformed, and `Error::ReadFile` when the notifications document
/// cannot be read.
pub fn collect_inputs(args: &SetArgs, stdin: impl io::Read) -> Result<Vec<FormInput>, Error> {
    let mut inputs = Vec::new();

    let fields = [
        ("organization", &args.organization),
        ("port", &args.port),
        ("webhook_secret", &args.webhook_secret),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            inputs.push(FormInput::Field(FieldEdit::parse(name, value)?));
        }
    }

    if let Some(text) = read_notifications(args, stdin)? {
        inputs.push(FormInput::NotificationsText(text));
    }

    if inputs.is_empty() {
        return Err(Error::InvalidArguments(
            "Nothing to change. Pass at least one of --organization, --port, \
             --webhook-secret, --notifications or --notifications-file"
                .to_string(),
        ));
    }

    Ok(inputs)
}

fn read_notifications(args: &SetArgs, mut stdin: impl io::Read) -> Result<Option<String>, Error> {
    if let Some(path) = &args.notifications_file {
        debug!(path = ?path, "Reading notifications document");
        return fs::read_to_string(path)
            .map(Some)
            .map_err(|source| Error::ReadFile {
                path: path.display().to_string(),
                source,
            });
    }

    match args.notifications.as_deref() {
        Some(STDIN_MARKER) => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .map_err(|source| Error::ReadFile {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(Some(text))
        }
        Some(text) => Ok(Some(text.to_string())),
        None => Ok(None),
    }
}

/// Loads the configuration, applies `inputs` and submits.
///
/// If `cancel` completes while a request is outstanding, the session is
/// disposed and `Error::Cancelled` is returned; a late reply is ignored.
///
/// # Errors
///
/// Returns `Error::LoadFailed` when the configuration cannot be loaded,
/// `Error::Validation` when local validation rejects the edits and
/// `Error::SaveRejected` when the service refuses the save.
#[instrument(skip(session, inputs, cancel), fields(input_count = inputs.len()))]
pub async fn execute<C>(
    session: &ConfigEditSession,
    inputs: Vec<FormInput>,
    cancel: C,
) -> Result<FormModel, Error>
where
    C: Future<Output = ()>,
{
    let view = FormView::new();
    tokio::pin!(cancel);

    let mounted = tokio::select! {
        model = view.mount(session) => model,
        _ = &mut cancel => return Err(cancelled(session)),
    };
    if let FormModel::LoadFailed { message } = mounted {
        return Err(Error::LoadFailed(message));
    }

    for input in inputs {
        if let DispatchOutcome::Edited(EditOutcome::NotReady) = view.dispatch(session, input).await
        {
            return Err(Error::Session("edits were refused".to_string()));
        }
    }

    let outcome = tokio::select! {
        outcome = view.dispatch(session, FormInput::Submit) => outcome,
        _ = &mut cancel => return Err(cancelled(session)),
    };

    match outcome {
        DispatchOutcome::Submitted(SubmitOutcome::Saved) => {
            info!("Configuration updated");
            Ok(view.render(&session.state()))
        }
        DispatchOutcome::Submitted(SubmitOutcome::Invalid(e)) => Err(Error::Validation(e)),
        DispatchOutcome::Submitted(SubmitOutcome::Rejected(message)) => {
            Err(Error::SaveRejected(message))
        }
        other => Err(Error::Session(format!("unexpected outcome {:?}", other))),
    }
}

fn cancelled(session: &ConfigEditSession) -> Error {
    warn!("Interrupted; abandoning the edit session");
    session.dispose();
    Error::Cancelled
}
