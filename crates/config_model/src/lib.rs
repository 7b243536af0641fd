//! Typed model of the GitNotify runtime configuration.
//!
//! This crate holds the data definitions exchanged with the configuration
//! service together with the structural validation helpers the edit session
//! runs before anything is sent back.
//!
//! ## Layout
//!
//! - [`Configuration`]: the root settings document of one service instance
//! - [`NotificationRule`]: one filter deciding which webhook events notify
//! - [`GitHubAppCredentials`]: GitHub App settings, carried through unmodified
//! - [`WebhookSecret`]: the signing secret, redacted in `Debug` and `Display`
//!
//! ## Example
//!
//! ```rust
//! use config_model::{parse_notifications, notifications_to_text, NotificationRule};
//!
//! let rules = vec![NotificationRule::new("pull_request").with_actions(["opened"])];
//! let text = notifications_to_text(&rules).unwrap();
//!
//! let parsed = parse_notifications(&text).unwrap();
//! assert_eq!(parsed, rules);
//! ```

pub mod configuration;
pub mod errors;
pub mod github_app;
pub mod notifications;
pub mod secret;

pub use configuration::{Configuration, DEFAULT_PORT};
pub use errors::{ValidationError, ValidationResult};
pub use github_app::GitHubAppCredentials;
pub use notifications::{
    notifications_to_text, parse_notifications, should_notify, validate_notifications,
    NotificationRule,
};
pub use secret::WebhookSecret;
