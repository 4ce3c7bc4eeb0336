use serde::{Deserialize, Serialize};

/// Alert rule group configured in the monitoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub alert_scope: String,
    #[serde(default)]
    pub alert_scope_id: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub rules: Vec<serde_json::Value>,
    #[serde(default)]
    pub notifies: Vec<serde_json::Value>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub update_time: i64,
}

/// Scheduled report task configured in the monitoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTask {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub scope_id: String,
    #[serde(rename = "type", default)]
    pub report_type: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub dashboard_id: String,
    #[serde(default)]
    pub notify_target: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}
