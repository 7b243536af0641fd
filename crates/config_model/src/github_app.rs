//! GitHub App credentials.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GitHub App authentication settings of the notification service.
///
/// Not editable through the dashboard. Every field is optional and unknown
/// keys are kept in `extra`, so that a value read from the service is written
/// back exactly as it was received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubAppCredentials {
    /// GitHub App ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u64>,

    /// Installation ID for the monitored organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<u64>,

    /// Path of the PEM private key on the service host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
