//! Presentation contract for the configuration form.
//!
//! [`FormView`] holds no business rules. It projects a [`SessionState`] onto a
//! [`FormModel`] that a front end can draw as-is, and forwards user input to
//! the session unchanged.

use config_model::WebhookSecret;
use tracing::debug;

use crate::field::FieldEdit;
use crate::session::{ConfigEditSession, EditOutcome, SubmitOutcome};
use crate::state::{EditState, SessionState};

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;

/// What the front end should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum FormModel {
    /// Loading indicator.
    Loading,
    /// Error panel; the form is never shown for this session.
    LoadFailed { message: String },
    Form(FormFields),
}

/// Contents of the editable form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub organization: String,
    pub port: u16,
    /// Masked unless the view reveals secrets. An empty secret stays empty so
    /// the user can see that one is missing.
    pub webhook_secret: String,
    pub notifications_text: String,
    pub submit_enabled: bool,
    pub saving: bool,
    pub dirty: bool,
    pub banner: Option<Banner>,
}

/// Transient message from the last submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// One piece of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    Field(FieldEdit),
    NotificationsText(String),
    Submit,
}

/// Session reaction to a [`FormInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Edited(EditOutcome),
    Submitted(SubmitOutcome),
}

/// Binds a [`ConfigEditSession`] to a [`FormModel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormView {
    reveal_secret: bool,
}

impl FormView {
    /// A view that masks the webhook secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// A view that shows the webhook secret in plain text.
    pub fn revealing() -> Self {
        Self {
            reveal_secret: true,
        }
    }

    pub fn reveals_secret(&self) -> bool {
        self.reveal_secret
    }

    pub fn render(&self, state: &SessionState) -> FormModel {
        match state {
            SessionState::Loading => FormModel::Loading,
            SessionState::LoadFailed { message } => FormModel::LoadFailed {
                message: message.clone(),
            },
            SessionState::Ready(edit) => FormModel::Form(self.fields(edit, false)),
            SessionState::Saving(edit) => FormModel::Form(self.fields(edit, true)),
        }
    }

    fn fields(&self, edit: &EditState, saving: bool) -> FormFields {
        let banner = match (&edit.last_error, &edit.last_success) {
            (Some(error), _) => Some(Banner::Error(error.clone())),
            (None, Some(success)) => Some(Banner::Success(success.clone())),
            (None, None) => None,
        };

        FormFields {
            organization: edit.working.organization.clone(),
            port: edit.working.port,
            webhook_secret: self.secret_text(&edit.working.webhook_secret),
            notifications_text: edit.notifications_text.clone(),
            submit_enabled: !saving,
            saving,
            dirty: edit.is_dirty(),
            banner,
        }
    }

    fn secret_text(&self, secret: &WebhookSecret) -> String {
        if self.reveal_secret || secret.is_empty() {
            secret.expose().to_string()
        } else {
            secret.to_string()
        }
    }

    /// Starts the session's initial load and renders the result.
    pub async fn mount(&self, session: &ConfigEditSession) -> FormModel {
        let outcome = session.load().await;
        debug!(?outcome, "Form mounted");
        self.render(&session.state())
    }

    /// Forwards one input to the session.
    pub async fn dispatch(
        &self,
        session: &ConfigEditSession,
        input: FormInput,
    ) -> DispatchOutcome {
        match input {
            FormInput::Field(edit) => DispatchOutcome::Edited(session.set_field(edit)),
            FormInput::NotificationsText(raw) => {
                DispatchOutcome::Edited(session.set_notifications_text(raw))
            }
            FormInput::Submit => DispatchOutcome::Submitted(session.submit().await),
        }
    }
}
