//! Alertmanager webhook data models
//!
//! See <https://prometheus.io/docs/alerting/latest/configuration/#webhook_config>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single alert from an Alertmanager notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert status, normally "firing" or "resolved"
    #[serde(default)]
    pub status: String,

    /// Identifying labels (alertname, namespace, service, severity, ...)
    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// Descriptive annotations (summary, description, ...)
    #[serde(default)]
    pub annotations: HashMap<String, String>,

    /// When the alert started firing
    pub starts_at: DateTime<Utc>,

    /// When the alert ended, if known
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,

    /// Alertmanager fingerprint
    #[serde(default)]
    pub fingerprint: String,

    /// Link back to the rule expression in Prometheus
    #[serde(default, rename = "generatorURL", alias = "generatorUrl")]
    pub generator_url: Option<String>,
}

impl Alert {
    /// Label value, or `""` when the label is absent
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map_or("", String::as_str)
    }

    /// Annotation value, or `""` when the annotation is absent
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map_or("", String::as_str)
    }
}

/// Alertmanager v2 webhook payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    /// Payload format version ("4" for current Alertmanager)
    #[serde(default)]
    pub version: String,

    /// Key identifying the alert group
    #[serde(default)]
    pub group_key: String,

    /// Number of alerts dropped by Alertmanager's max_alerts limit
    #[serde(default)]
    pub truncated_alerts: Option<u64>,

    /// Group status
    #[serde(default)]
    pub status: String,

    /// Receiver name from the Alertmanager route
    #[serde(default)]
    pub receiver: String,

    /// Labels the group was formed on
    #[serde(default)]
    pub group_labels: HashMap<String, String>,

    /// Labels shared by every alert in the group
    #[serde(default)]
    pub common_labels: HashMap<String, String>,

    /// Annotations shared by every alert in the group
    #[serde(default)]
    pub common_annotations: HashMap<String, String>,

    /// Alertmanager base URL
    #[serde(default, rename = "externalURL", alias = "externalUrl")]
    pub external_url: String,

    /// Alerts in arrival order
    #[serde(default)]
    pub alerts: Vec<Alert>,
}
