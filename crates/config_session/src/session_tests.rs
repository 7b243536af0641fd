use super::*;
use async_trait::async_trait;
use config_model::{GitHubAppCredentials, NotificationRule, WebhookSecret};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing_test::traced_test;

// --- Test Stores ---

/// How an in-memory store answers a request.
#[derive(Clone)]
enum Reply {
    Ok,
    Remote(u16, &'static str),
    Transport,
}

impl Reply {
    fn into_result(self) -> Result<(), ClientError> {
        match self {
            Reply::Ok => Ok(()),
            Reply::Remote(status, body) => Err(ClientError::Remote {
                status,
                body: body.to_string(),
            }),
            Reply::Transport => Err(ClientError::Transport("connection refused".to_string())),
        }
    }
}

struct MemoryStore {
    current: Mutex<Configuration>,
    fetch_reply: Reply,
    replace_reply: Mutex<Reply>,
    replaced: Mutex<Vec<Configuration>>,
}

impl MemoryStore {
    fn new(config: Configuration) -> Self {
        Self {
            current: Mutex::new(config),
            fetch_reply: Reply::Ok,
            replace_reply: Mutex::new(Reply::Ok),
            replaced: Mutex::new(Vec::new()),
        }
    }

    fn failing_fetch(reply: Reply) -> Self {
        Self {
            fetch_reply: reply,
            ..Self::new(acme_config())
        }
    }

    fn set_replace_reply(&self, reply: Reply) {
        *self.replace_reply.lock().unwrap() = reply;
    }

    fn replaced(&self) -> Vec<Configuration> {
        self.replaced.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn fetch_configuration(&self) -> Result<Configuration, ClientError> {
        self.fetch_reply.clone().into_result()?;
        Ok(self.current.lock().unwrap().clone())
    }

    async fn replace_configuration(&self, next: &Configuration) -> Result<(), ClientError> {
        self.replaced.lock().unwrap().push(next.clone());
        let reply = self.replace_reply.lock().unwrap().clone();
        reply.into_result()?;
        *self.current.lock().unwrap() = next.clone();
        Ok(())
    }
}

/// Store whose calls block until the test releases them.
struct GatedStore {
    config: Configuration,
    entered: Notify,
    release: Notify,
    fetches: AtomicUsize,
    replaces: AtomicUsize,
    gate_fetch: bool,
}

impl GatedStore {
    fn gating_replace(config: Configuration) -> Self {
        Self {
            config,
            entered: Notify::new(),
            release: Notify::new(),
            fetches: AtomicUsize::new(0),
            replaces: AtomicUsize::new(0),
            gate_fetch: false,
        }
    }

    fn gating_fetch(config: Configuration) -> Self {
        Self {
            gate_fetch: true,
            ..Self::gating_replace(config)
        }
    }
}

#[async_trait]
impl ConfigStore for GatedStore {
    async fn fetch_configuration(&self) -> Result<Configuration, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.gate_fetch {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(self.config.clone())
    }

    async fn replace_configuration(&self, _next: &Configuration) -> Result<(), ClientError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        if !self.gate_fetch {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(())
    }
}

// --- Helpers ---

fn acme_config() -> Configuration {
    let mut config = Configuration::new("acme", 8080, "s3cret");
    config.set_notifications(vec![NotificationRule::new("pull_request").with_actions(["opened"])]);
    config.github_app = Some(GitHubAppCredentials {
        app_id: Some(42),
        installation_id: Some(7),
        private_key_path: Some("/keys/app.pem".to_string()),
        ..Default::default()
    });
    config
}

async fn ready_session(store: Arc<MemoryStore>) -> ConfigEditSession {
    let session = ConfigEditSession::new(store);
    assert_eq!(session.load().await, LoadOutcome::Ready);
    session
}

fn edit_state(session: &ConfigEditSession) -> EditState {
    session
        .state()
        .edit()
        .cloned()
        .expect("session should hold an edit state")
}

// --- Loading ---

mod loading {
    use super::*;

    #[test]
    fn test_new_session_starts_loading() {
        let session = ConfigEditSession::new(Arc::new(MemoryStore::new(acme_config())));

        assert_eq!(session.state(), SessionState::Loading);
        assert!(!session.is_disposed());
    }

    #[tokio::test]
    async fn test_load_seeds_working_copy_and_text() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        let edit = edit_state(&session);
        assert_eq!(edit.working, acme_config());
        assert_eq!(edit.baseline, acme_config());
        assert_eq!(
            edit.notifications_text,
            "[\n  {\n    \"event_type\": \"pull_request\",\n    \"actions\": [\n      \"opened\"\n    ]\n  }\n]"
        );
        assert!(!edit.is_dirty());
        assert_eq!(edit.last_error, None);
        assert_eq!(edit.last_success, None);
    }

    #[tokio::test]
    async fn test_load_empty_notifications_renders_empty_array() {
        let store = Arc::new(MemoryStore::new(Configuration::new("acme", 8080, "s3cret")));
        let session = ready_session(store).await;

        assert_eq!(edit_state(&session).notifications_text, "[]");
    }

    #[tokio::test]
    async fn test_load_remote_failure_is_terminal() {
        let store = Arc::new(MemoryStore::failing_fetch(Reply::Remote(
            401,
            "{\"error\":\"unauthorized\"}",
        )));
        let session = ConfigEditSession::new(store);

        let outcome = session.load().await;

        assert_eq!(
            outcome,
            LoadOutcome::Failed("{\"error\":\"unauthorized\"}".to_string())
        );
        assert_eq!(
            session.state(),
            SessionState::LoadFailed {
                message: "{\"error\":\"unauthorized\"}".to_string()
            }
        );
        assert_eq!(session.load().await, LoadOutcome::NotLoading);
        assert_eq!(session.set_field(FieldEdit::Port(9090)), EditOutcome::NotReady);
        assert_eq!(session.submit().await, SubmitOutcome::NotReady);
    }

    #[tokio::test]
    async fn test_load_transport_failure_message() {
        let session = ConfigEditSession::new(Arc::new(MemoryStore::failing_fetch(Reply::Transport)));

        match session.load().await {
            LoadOutcome::Failed(message) => {
                assert!(message.starts_with("Unable to reach the configuration service"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_load_after_ready_is_refused() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        session.set_field(FieldEdit::Port(9090));

        assert_eq!(session.load().await, LoadOutcome::NotLoading);
        assert_eq!(edit_state(&session).working.port, 9090);
    }

    #[tokio::test]
    async fn test_dispose_during_load_discards_reply() {
        let store = Arc::new(GatedStore::gating_fetch(acme_config()));
        let session = ConfigEditSession::new(store.clone());

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.load().await }
        });
        store.entered.notified().await;

        session.dispose();
        store.release.notify_one();

        assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.is_disposed());
    }
}

// --- Editing ---

mod editing {
    use super::*;

    #[tokio::test]
    async fn test_edits_before_load_are_refused() {
        let session = ConfigEditSession::new(Arc::new(MemoryStore::new(acme_config())));

        assert_eq!(
            session.set_field(FieldEdit::Organization("other".to_string())),
            EditOutcome::NotReady
        );
        assert_eq!(session.set_notifications_text("[]"), EditOutcome::NotReady);
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[tokio::test]
    async fn test_set_field_updates_working_copy_only() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        assert_eq!(session.set_field(FieldEdit::Port(9090)), EditOutcome::Applied);

        let edit = edit_state(&session);
        assert_eq!(edit.working.port, 9090);
        assert_eq!(edit.baseline.port, 8080);
        assert!(edit.is_dirty());
        assert!(store.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_set_field_accepts_invalid_values_until_submit() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        assert_eq!(
            session.set_field(FieldEdit::Organization(String::new())),
            EditOutcome::Applied
        );
        assert_eq!(session.set_field(FieldEdit::Port(0)), EditOutcome::Applied);
        assert_eq!(edit_state(&session).working.organization, "");
    }

    #[tokio::test]
    async fn test_notifications_text_is_kept_verbatim() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        session.set_notifications_text("[{\"event_type\": ");

        let edit = edit_state(&session);
        assert_eq!(edit.notifications_text, "[{\"event_type\": ");
        assert_eq!(edit.working.notifications(), acme_config().notifications());
        assert!(edit.is_dirty());
    }

    #[tokio::test]
    async fn test_reformatted_notifications_are_not_dirty() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        session.set_notifications_text(
            "[{\"event_type\":\"pull_request\",\"actions\":[\"opened\"]}]",
        );

        assert!(!edit_state(&session).is_dirty());
    }

    #[tokio::test]
    async fn test_edits_after_dispose_are_refused() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        session.dispose();

        assert_eq!(session.set_field(FieldEdit::Port(9090)), EditOutcome::NotReady);
        assert_eq!(session.set_notifications_text("[]"), EditOutcome::NotReady);
        assert_eq!(session.submit().await, SubmitOutcome::Discarded);
        assert_eq!(edit_state(&session).working.port, 8080);
    }
}

// --- Submitting ---

mod submitting {
    use super::*;

    #[tokio::test]
    async fn test_submit_sends_merged_configuration() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Port(9090));
        session.set_notifications_text("[{\"event_type\": \"push\", \"repos\": [\"api\"]}]");

        assert_eq!(session.submit().await, SubmitOutcome::Saved);

        let sent = store.replaced();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].organization, "acme");
        assert_eq!(sent[0].port, 9090);
        assert_eq!(sent[0].webhook_secret, WebhookSecret::new("s3cret"));
        assert_eq!(
            sent[0].notifications(),
            vec![NotificationRule::new("push").with_repos(["api"])]
        );
        assert_eq!(sent[0].github_app, acme_config().github_app);

        let edit = edit_state(&session);
        assert_eq!(session.state().phase(), SessionPhase::Ready);
        assert_eq!(edit.last_success.as_deref(), Some(SAVE_SUCCESS_MESSAGE));
        assert_eq!(edit.last_error, None);
        assert_eq!(edit.baseline, sent[0]);
        assert_eq!(edit.working.notifications(), sent[0].notifications());
        assert!(!edit.is_dirty());
    }

    #[tokio::test]
    async fn test_submit_without_edits_round_trips_fetched_document() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        assert_eq!(session.submit().await, SubmitOutcome::Saved);

        assert_eq!(store.replaced(), vec![acme_config()]);
    }

    #[tokio::test]
    async fn test_invalid_notifications_block_submit() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Port(9090));
        session.set_notifications_text("{not: \"an array\"}");

        let outcome = session.submit().await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(ValidationError::NotificationsNotJson { .. })
        ));
        assert!(store.replaced().is_empty());

        let edit = edit_state(&session);
        assert_eq!(session.state().phase(), SessionPhase::Ready);
        assert_eq!(
            edit.last_error.as_deref(),
            Some("Notifications must be valid JSON")
        );
        assert_eq!(edit.working.port, 9090);
        assert_eq!(edit.working.notifications(), acme_config().notifications());
        assert_eq!(edit.notifications_text, "{not: \"an array\"}");
    }

    #[tokio::test]
    async fn test_notifications_checked_before_scalars() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Organization(String::new()));
        session.set_notifications_text("not json");

        assert!(matches!(
            session.submit().await,
            SubmitOutcome::Invalid(ValidationError::NotificationsNotJson { .. })
        ));
    }

    #[tokio::test]
    async fn test_scalar_validation_blocks_submit() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Organization(String::new()));
        assert_eq!(
            session.submit().await,
            SubmitOutcome::Invalid(ValidationError::OrganizationRequired)
        );

        session.set_field(FieldEdit::Organization("acme".to_string()));
        session.set_field(FieldEdit::WebhookSecret(WebhookSecret::new("")));
        assert_eq!(
            session.submit().await,
            SubmitOutcome::Invalid(ValidationError::WebhookSecretRequired)
        );

        session.set_field(FieldEdit::WebhookSecret(WebhookSecret::new("s3cret")));
        session.set_field(FieldEdit::Port(0));
        assert_eq!(
            session.submit().await,
            SubmitOutcome::Invalid(ValidationError::PortOutOfRange { port: 0 })
        );

        assert!(store.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_remote_rejection_keeps_edits() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        store.set_replace_reply(Reply::Remote(500, "internal error"));
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Port(9090));

        assert_eq!(
            session.submit().await,
            SubmitOutcome::Rejected("internal error".to_string())
        );

        let edit = edit_state(&session);
        assert_eq!(session.state().phase(), SessionPhase::Ready);
        assert_eq!(edit.last_error.as_deref(), Some("internal error"));
        assert_eq!(edit.last_success, None);
        assert_eq!(edit.working.port, 9090);
        assert_eq!(edit.baseline.port, 8080);
        assert!(edit.is_dirty());
    }

    #[tokio::test]
    async fn test_retry_after_rejection_clears_error() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        store.set_replace_reply(Reply::Transport);
        let session = ready_session(store.clone()).await;

        session.set_field(FieldEdit::Port(9090));
        assert!(matches!(session.submit().await, SubmitOutcome::Rejected(_)));

        store.set_replace_reply(Reply::Ok);
        assert_eq!(session.submit().await, SubmitOutcome::Saved);

        let edit = edit_state(&session);
        assert_eq!(edit.last_error, None);
        assert_eq!(edit.last_success.as_deref(), Some(SAVE_SUCCESS_MESSAGE));
        assert_eq!(store.replaced().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_validation_clears_previous_success() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        assert_eq!(session.submit().await, SubmitOutcome::Saved);
        session.set_notifications_text("oops");
        assert!(matches!(session.submit().await, SubmitOutcome::Invalid(_)));

        let edit = edit_state(&session);
        assert_eq!(edit.last_success, None);
        assert!(edit.last_error.is_some());
    }

    #[tokio::test]
    async fn test_submit_while_saving_is_single_flight() {
        let store = Arc::new(GatedStore::gating_replace(acme_config()));
        let session = ConfigEditSession::new(store.clone());
        assert_eq!(session.load().await, LoadOutcome::Ready);

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });
        store.entered.notified().await;

        assert_eq!(session.state().phase(), SessionPhase::Saving);
        assert_eq!(session.submit().await, SubmitOutcome::InFlight);
        assert_eq!(session.set_field(FieldEdit::Port(1)), EditOutcome::NotReady);
        assert_eq!(session.set_notifications_text("[]"), EditOutcome::NotReady);

        store.release.notify_one();

        assert_eq!(first.await.unwrap(), SubmitOutcome::Saved);
        assert_eq!(store.replaces.load(Ordering::SeqCst), 1);
        assert_eq!(session.state().phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_dispose_during_save_discards_reply() {
        let store = Arc::new(GatedStore::gating_replace(acme_config()));
        let session = ConfigEditSession::new(store.clone());
        session.load().await;

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });
        store.entered.notified().await;

        session.dispose();
        store.release.notify_one();

        assert_eq!(pending.await.unwrap(), SubmitOutcome::Discarded);
        let edit = edit_state(&session);
        assert_eq!(edit.last_success, None);
        assert_eq!(session.state().phase(), SessionPhase::Saving);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_secret_never_reaches_logs() {
        let store = Arc::new(MemoryStore::new(acme_config()));
        let session = ready_session(store).await;

        session.set_field(FieldEdit::WebhookSecret(WebhookSecret::new("n3w-s3cret")));
        assert_eq!(session.submit().await, SubmitOutcome::Saved);

        assert!(logs_contain("Configuration saved"));
        assert!(!logs_contain("s3cret"));
    }
}

#[tokio::test]
async fn test_debug_output_summarizes_session() {
    let store = Arc::new(MemoryStore::new(acme_config()));
    let session = ready_session(store).await;

    let rendered = format!("{:?}", session);

    assert!(rendered.contains("Ready"));
    assert!(!rendered.contains("s3cret"));
}
