//! Observable state of an edit session.
//!
//! ```text
//! Loading ──load ok──▶ Ready ──submit──▶ Saving ──reply──▶ Ready
//!    │
//!    └──load failed──▶ LoadFailed   (terminal)
//! ```

use config_model::{notifications_to_text, parse_notifications, Configuration};

/// Current state of a [`ConfigEditSession`](crate::ConfigEditSession).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the initial fetch.
    Loading,

    /// The initial fetch failed. No working copy exists and none will.
    LoadFailed { message: String },

    /// A working copy is available for editing.
    Ready(EditState),

    /// A replace request is outstanding; edits and submits are refused.
    Saving(EditState),
}

/// Discriminant of [`SessionState`], for logging and quick checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    LoadFailed,
    Ready,
    Saving,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Loading => SessionPhase::Loading,
            SessionState::LoadFailed { .. } => SessionPhase::LoadFailed,
            SessionState::Ready(_) => SessionPhase::Ready,
            SessionState::Saving(_) => SessionPhase::Saving,
        }
    }

    /// The edit state, when one exists.
    pub fn edit(&self) -> Option<&EditState> {
        match self {
            SessionState::Ready(edit) | SessionState::Saving(edit) => Some(edit),
            SessionState::Loading | SessionState::LoadFailed { .. } => None,
        }
    }
}

/// Everything held while a configuration is being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    /// Last configuration the service confirmed (fetched or saved).
    pub baseline: Configuration,

    /// Working copy. Scalar edits land here immediately; notifications only
    /// when a submit accepts the raw text.
    pub working: Configuration,

    /// Unparsed notifications document as typed by the user.
    pub notifications_text: String,

    /// Error from the last submit attempt, cleared when the next one starts.
    pub last_error: Option<String>,

    /// Confirmation from the last submit attempt, cleared likewise.
    pub last_success: Option<String>,
}

impl EditState {
    /// Seeds an edit state from a freshly fetched configuration.
    pub(crate) fn from_fetched(config: Configuration) -> Result<Self, serde_json::Error> {
        let notifications_text = notifications_to_text(config.notifications())?;
        Ok(Self {
            baseline: config.clone(),
            working: config,
            notifications_text,
            last_error: None,
            last_success: None,
        })
    }

    /// Whether the working copy or the notifications text differ from the
    /// baseline.
    ///
    /// Text that does not parse counts as a change; reformatting alone does
    /// not.
    pub fn is_dirty(&self) -> bool {
        if self.working.organization != self.baseline.organization
            || self.working.port != self.baseline.port
            || self.working.webhook_secret != self.baseline.webhook_secret
        {
            return true;
        }

        parse_notifications(&self.notifications_text)
            .map_or(true, |rules| rules.as_slice() != self.baseline.notifications())
    }
}
