//! Notification filter rules.
//!
//! The rules are edited as one free-form JSON document. Nothing typed in the
//! editor is trusted until [`parse_notifications`] has accepted the whole
//! document; a single bad rule rejects all of them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{ValidationError, ValidationResult};

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;

/// One filter describing which webhook events produce a notification.
///
/// # JSON Format
///
/// ```json
/// {
///   "event_type": "pull_request",
///   "actions": ["opened", "reopened"],
///   "repos": ["api", "web"]
/// }
/// ```
///
/// Keys this type does not know about are kept in `extra` and written back
/// unchanged. An `actions` or `repos` key sent as `null` is written back as
/// `null`; a missing one stays missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    /// Class of GitHub event matched (e.g. `issues`, `pull_request`, `push`)
    pub event_type: String,

    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    actions: Option<Option<Vec<String>>>,

    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    repos: Option<Option<Vec<String>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationRule {
    /// Creates a rule matching every action in every repository.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            actions: None,
            repos: None,
            extra: Map::new(),
        }
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = Some(Some(actions.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repos = Some(Some(repos.into_iter().map(Into::into).collect()));
        self
    }

    /// Event sub-actions to match; `None` matches every action.
    pub fn actions(&self) -> Option<&[String]> {
        self.actions.as_ref().and_then(Option::as_deref)
    }

    /// Repository names to match; `None` matches every repository.
    pub fn repos(&self) -> Option<&[String]> {
        self.repos.as_ref().and_then(Option::as_deref)
    }

    /// Checks whether an event is selected by this rule.
    ///
    /// The event type must match exactly. An absent or empty `actions` or
    /// `repos` list matches any value; otherwise the value must be listed.
    pub fn matches(&self, event_type: &str, action: &str, repo: &str) -> bool {
        self.event_type == event_type
            && list_allows(self.actions(), action)
            && list_allows(self.repos(), repo)
    }
}

/// Deserializes a present key as `Some`, so that an explicit `null` becomes
/// `Some(None)` while a missing key falls back to the `None` default.
pub(crate) fn keep_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn list_allows(list: Option<&[String]>, value: &str) -> bool {
    match list {
        None | Some([]) => true,
        Some(values) => values.iter().any(|v| v == value),
    }
}

/// Decides whether a rule set asks for a notification about an event.
///
/// An empty rule set notifies for everything.
pub fn should_notify(rules: &[NotificationRule], event_type: &str, action: &str, repo: &str) -> bool {
    rules.is_empty() || rules.iter().any(|r| r.matches(event_type, action, repo))
}

/// Validates a candidate notifications document and decodes it.
///
/// Succeeds only for an array of objects where every object has a non-empty
/// string `event_type`, and `actions`/`repos`, when present, are arrays of
/// non-empty strings. Order is preserved.
///
/// # Errors
/// Returns the first structural violation found, naming the rule index.
pub fn validate_notifications(candidate: &Value) -> ValidationResult<Vec<NotificationRule>> {
    let items = candidate
        .as_array()
        .ok_or(ValidationError::NotificationsNotArray)?;

    let mut rules = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let fields = item
            .as_object()
            .ok_or(ValidationError::RuleNotObject { index })?;

        match fields.get("event_type").and_then(Value::as_str) {
            Some(event_type) if !event_type.is_empty() => {}
            _ => return Err(ValidationError::InvalidEventType { index }),
        }

        for field in ["actions", "repos"] {
            check_value_list(index, field, fields.get(field))?;
        }

        let rule = serde_json::from_value(item.clone()).map_err(|e| {
            ValidationError::RuleRejected {
                index,
                reason: e.to_string(),
            }
        })?;
        rules.push(rule);
    }

    debug!(rule_count = rules.len(), "Notifications document accepted");
    Ok(rules)
}

fn check_value_list(index: usize, field: &'static str, value: Option<&Value>) -> ValidationResult<()> {
    let valid = match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(values)) => values
            .iter()
            .all(|v| v.as_str().is_some_and(|s| !s.is_empty())),
        Some(_) => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidValueList { index, field })
    }
}

/// Parses the raw notifications text and validates it.
///
/// # Errors
/// Returns `ValidationError::NotificationsNotJson` when the text is not JSON,
/// otherwise whatever [`validate_notifications`] reports.
pub fn parse_notifications(raw: &str) -> ValidationResult<Vec<NotificationRule>> {
    let candidate: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::NotificationsNotJson {
            reason: e.to_string(),
        })?;
    validate_notifications(&candidate)
}

/// Renders rules as the pretty-printed JSON array shown in the editor.
///
/// # Errors
/// Returns the serializer error if the rules cannot be encoded.
pub fn notifications_to_text(rules: &[NotificationRule]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rules)
}
