//! The configuration edit session.
//!
//! A session drives one load → edit → validate → submit lifecycle against a
//! [`ConfigStore`]. All state lives behind a single lock that is taken only
//! for synchronous transitions and never held across a remote call. Each
//! remote call is tagged with the session generation at the time it was
//! issued; a reply is applied only if that generation is still current, the
//! session has not been disposed, and the session is still in the state
//! that issued the call. Anything else is discarded.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use config_client::{ConfigStore, Error as ClientError};
use config_model::{parse_notifications, Configuration, ValidationError};
use tracing::{debug, info, instrument, warn};

use crate::field::FieldEdit;
use crate::state::{EditState, SessionPhase, SessionState};

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// Banner text shown after a successful save.
pub const SAVE_SUCCESS_MESSAGE: &str = "Configuration updated successfully!";

/// Result of [`ConfigEditSession::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The configuration was fetched; the session is `Ready`.
    Ready,
    /// The fetch failed; the session is `LoadFailed` with this message.
    Failed(String),
    /// The session is not in `Loading`; nothing was fetched.
    NotLoading,
    /// The session was disposed or superseded before the reply arrived.
    Discarded,
}

/// Result of [`ConfigEditSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service accepted the configuration.
    Saved,
    /// Local validation failed; no request was sent.
    Invalid(ValidationError),
    /// The service rejected the request or could not be reached.
    Rejected(String),
    /// Another submit is still outstanding; nothing was sent.
    InFlight,
    /// There is no working copy to submit.
    NotReady,
    /// The session was disposed or superseded before the reply arrived.
    Discarded,
}

/// Result of a field or notifications text edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Edits are only accepted in `Ready`.
    NotReady,
}

struct SessionCore {
    state: SessionState,
    generation: u64,
    disposed: bool,
}

impl SessionCore {
    fn is_current(&self, generation: u64) -> bool {
        !self.disposed && self.generation == generation
    }
}

struct Inner {
    store: Arc<dyn ConfigStore>,
    core: Mutex<SessionCore>,
}

/// Edit session for the service configuration.
///
/// Cloning yields another handle to the same session.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use config_client::{ClientSettings, RemoteConfigClient};
/// use config_session::{ConfigEditSession, FieldEdit, SubmitOutcome};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RemoteConfigClient::new(ClientSettings::from_env()?)?;
/// let session = ConfigEditSession::new(Arc::new(client));
///
/// session.load().await;
/// session.set_field(FieldEdit::Port(9090));
///
/// if session.submit().await == SubmitOutcome::Saved {
///     println!("Saved");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConfigEditSession {
    inner: Arc<Inner>,
}

impl ConfigEditSession {
    /// Creates a session in the `Loading` state.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                core: Mutex::new(SessionCore {
                    state: SessionState::Loading,
                    generation: 0,
                    disposed: false,
                }),
            }),
        }
    }

    fn core(&self) -> MutexGuard<'_, SessionCore> {
        self.inner
            .core
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.core().state.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.core().disposed
    }

    /// Discards the session.
    ///
    /// Replies to calls still in flight are ignored once they arrive, and
    /// every later operation is a no-op.
    pub fn dispose(&self) {
        let mut core = self.core();
        if !core.disposed {
            core.disposed = true;
            info!(phase = ?core.state.phase(), "Edit session disposed");
        }
    }

    /// Fetches the configuration and enters `Ready`, or `LoadFailed`.
    ///
    /// Only valid while `Loading`. `LoadFailed` is terminal; recovering from
    /// it means starting a new session.
    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadOutcome {
        let generation = {
            let mut core = self.core();
            if core.disposed {
                return LoadOutcome::Discarded;
            }
            if core.state.phase() != SessionPhase::Loading {
                warn!(phase = ?core.state.phase(), "Load requested outside the Loading state");
                return LoadOutcome::NotLoading;
            }
            core.generation += 1;
            core.generation
        };

        let result = self.inner.store.fetch_configuration().await;
        self.finish_load(generation, result)
    }

    fn finish_load(
        &self,
        generation: u64,
        result: Result<Configuration, ClientError>,
    ) -> LoadOutcome {
        let mut core = self.core();
        if !core.is_current(generation) || core.state.phase() != SessionPhase::Loading {
            debug!(generation, "Discarding stale load reply");
            return LoadOutcome::Discarded;
        }

        let seeded = result.and_then(|config| {
            EditState::from_fetched(config).map_err(ClientError::Serialization)
        });
        match seeded {
            Ok(edit) => {
                info!(
                    organization = %edit.working.organization,
                    rule_count = edit.working.notifications().len(),
                    "Configuration loaded"
                );
                core.state = SessionState::Ready(edit);
                LoadOutcome::Ready
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Configuration load failed");
                core.state = SessionState::LoadFailed {
                    message: message.clone(),
                };
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Sets one scalar field of the working copy.
    ///
    /// No validation happens here; it is deferred to [`submit`](Self::submit).
    ///
    /// # Arguments
    ///
    /// * `edit` - The field and its already parsed value
    ///
    /// # Returns
    ///
    /// `EditOutcome::Applied` when the session is `Ready`, otherwise
    /// `EditOutcome::NotReady` and the edit is dropped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use config_session::{ConfigEditSession, EditOutcome, FieldEdit};
    /// # async fn example(session: ConfigEditSession) -> Result<(), Box<dyn std::error::Error>> {
    /// session.load().await;
    ///
    /// let outcome = session.set_field(FieldEdit::parse("port", "9090")?);
    /// assert_eq!(outcome, EditOutcome::Applied);
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_field(&self, edit: FieldEdit) -> EditOutcome {
        let mut core = self.core();
        if core.disposed {
            return EditOutcome::NotReady;
        }
        match &mut core.state {
            SessionState::Ready(state) => {
                debug!(field = edit.field_name(), "Field edited");
                edit.apply(&mut state.working);
                EditOutcome::Applied
            }
            _ => EditOutcome::NotReady,
        }
    }

    /// Replaces the raw notifications text.
    ///
    /// The text is not parsed until submit, so it may be invalid while the
    /// user is still typing.
    pub fn set_notifications_text(&self, raw: impl Into<String>) -> EditOutcome {
        let mut core = self.core();
        if core.disposed {
            return EditOutcome::NotReady;
        }
        match &mut core.state {
            SessionState::Ready(state) => {
                state.notifications_text = raw.into();
                EditOutcome::Applied
            }
            _ => EditOutcome::NotReady,
        }
    }

    /// Validates the pending edits and replaces the remote configuration.
    ///
    /// The notifications text is parsed and checked first, then the scalar
    /// fields. Any local failure is recorded as `last_error` and returned
    /// without a network call. On a remote failure the working copy is kept
    /// so the user can retry.
    ///
    /// # Returns
    ///
    /// * `SubmitOutcome::Saved` - the service accepted the document, which is
    ///   now the baseline
    /// * `SubmitOutcome::Invalid` - local validation failed
    /// * `SubmitOutcome::Rejected` - the service or the transport failed
    /// * `SubmitOutcome::InFlight` / `SubmitOutcome::NotReady` - nothing was
    ///   sent because of the current phase
    /// * `SubmitOutcome::Discarded` - the session was disposed meanwhile
    #[instrument(skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, payload) = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let result = self.inner.store.replace_configuration(&payload).await;
        self.finish_submit(generation, payload, result)
    }

    fn begin_submit(&self) -> Result<(u64, Configuration), SubmitOutcome> {
        let mut core = self.core();
        if core.disposed {
            return Err(SubmitOutcome::Discarded);
        }

        let mut edit = match mem::replace(&mut core.state, SessionState::Loading) {
            SessionState::Ready(edit) => edit,
            other => {
                let outcome = match other {
                    SessionState::Saving(_) => {
                        debug!("Submit ignored while a save is outstanding");
                        SubmitOutcome::InFlight
                    }
                    _ => SubmitOutcome::NotReady,
                };
                core.state = other;
                return Err(outcome);
            }
        };

        edit.last_error = None;
        edit.last_success = None;

        match prepare_payload(&edit) {
            Ok(payload) => {
                edit.working = payload.clone();
                core.generation += 1;
                let generation = core.generation;
                core.state = SessionState::Saving(edit);
                Ok((generation, payload))
            }
            Err(e) => {
                info!(reason = %e, "Submit rejected by local validation");
                edit.last_error = Some(e.to_string());
                core.state = SessionState::Ready(edit);
                Err(SubmitOutcome::Invalid(e))
            }
        }
    }

    fn finish_submit(
        &self,
        generation: u64,
        payload: Configuration,
        result: Result<(), ClientError>,
    ) -> SubmitOutcome {
        let mut core = self.core();
        if !core.is_current(generation) {
            debug!(generation, "Discarding stale save reply");
            return SubmitOutcome::Discarded;
        }

        let mut edit = match mem::replace(&mut core.state, SessionState::Loading) {
            SessionState::Saving(edit) => edit,
            other => {
                core.state = other;
                return SubmitOutcome::Discarded;
            }
        };

        let outcome = match result {
            Ok(()) => {
                info!(organization = %payload.organization, "Configuration saved");
                edit.baseline = payload;
                edit.last_success = Some(SAVE_SUCCESS_MESSAGE.to_string());
                SubmitOutcome::Saved
            }
            Err(e) => {
                warn!(error = %e, status = ?e.status(), "Configuration save failed");
                let message = e.user_message();
                edit.last_error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        };

        core.state = SessionState::Ready(edit);
        outcome
    }
}

/// Builds the replace payload: the working copy with the parsed
/// notifications merged in. Every other field, `github_app` included, comes
/// across unchanged.
fn prepare_payload(edit: &EditState) -> Result<Configuration, ValidationError> {
    let rules = parse_notifications(&edit.notifications_text)?;

    let mut payload = edit.working.clone();
    payload.set_notifications(rules);
    payload.validate()?;
    Ok(payload)
}

impl fmt::Debug for ConfigEditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core();
        f.debug_struct("ConfigEditSession")
            .field("phase", &core.state.phase())
            .field("generation", &core.generation)
            .field("disposed", &core.disposed)
            .finish()
    }
}
