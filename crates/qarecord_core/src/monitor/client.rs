//! Monitor client contract and blocking HTTP implementation.

use crate::monitor::error::{MonitorError, MonitorResult};
use crate::monitor::model::{Alert, ReportTask};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Header marking requests as coming from an internal platform component.
pub const INTERNAL_CLIENT_HEADER: &str = "Internal-Client";

const INTERNAL_CLIENT_NAME: &str = "bundle";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Read-only access to monitoring resources.
///
/// By-id lookups fail with `EmptyResult` when the service has no entity;
/// by-scope lookups return `Ok(None)` instead.
pub trait MonitorClient {
    fn get_alert_by_id(&self, id: i64) -> MonitorResult<Alert>;
    fn get_alert_by_scope(&self, scope: &str, scope_id: &str) -> MonitorResult<Option<Alert>>;
    fn get_custom_alert_by_id(&self, id: i64) -> MonitorResult<Alert>;
    fn get_custom_alert_by_scope(
        &self,
        scope: &str,
        scope_id: &str,
    ) -> MonitorResult<Option<Alert>>;
    fn get_report_task_by_id(&self, id: i64) -> MonitorResult<ReportTask>;
}

/// Blocking HTTP client for the monitoring service API.
pub struct HttpMonitorClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpMonitorClient {
    /// Creates a client for `base_url` (e.g. `http://monitor:7096`).
    ///
    /// `timeout` bounds each whole request, connect included.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_by_id<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        id: i64,
    ) -> MonitorResult<T> {
        let (status, body) = self.fetch(&format!("{path}/{id}"), &[])?;
        decode_envelope::<T>(status, &body)?.ok_or(MonitorError::EmptyResult { resource, id })
    }

    fn get_first_by_scope<T: DeserializeOwned>(
        &self,
        path: &str,
        scope: &str,
        scope_id: &str,
    ) -> MonitorResult<Option<T>> {
        let (status, body) = self.fetch(
            path,
            &[
                ("scope", scope),
                ("scopeID", scope_id),
                ("pageSize", "1"),
                ("pageNo", "1"),
            ],
        )?;
        let page = decode_envelope::<ListData<T>>(status, &body)?;
        Ok(page.and_then(|page| page.list.into_iter().next()))
    }

    fn fetch(&self, path: &str, query: &[(&str, &str)]) -> MonitorResult<(u16, String)> {
        let started_at = Instant::now();
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .agent
            .get(&url)
            .set(INTERNAL_CLIENT_HEADER, INTERNAL_CLIENT_NAME);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                debug!(
                    "event=monitor_request module=monitor status=error path={path} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(MonitorError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        let body = response
            .into_string()
            .map_err(|err| MonitorError::Transport(err.to_string()))?;
        debug!(
            "event=monitor_request module=monitor status=ok path={path} http_status={status} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok((status, body))
    }
}

impl MonitorClient for HttpMonitorClient {
    fn get_alert_by_id(&self, id: i64) -> MonitorResult<Alert> {
        self.get_by_id("alert", "/api/alerts", id)
    }

    fn get_alert_by_scope(&self, scope: &str, scope_id: &str) -> MonitorResult<Option<Alert>> {
        self.get_first_by_scope("/api/alerts", scope, scope_id)
    }

    fn get_custom_alert_by_id(&self, id: i64) -> MonitorResult<Alert> {
        self.get_by_id("custom alert", "/api/customize/alerts", id)
    }

    fn get_custom_alert_by_scope(
        &self,
        scope: &str,
        scope_id: &str,
    ) -> MonitorResult<Option<Alert>> {
        self.get_first_by_scope("/api/customize/alerts", scope, scope_id)
    }

    fn get_report_task_by_id(&self, id: i64) -> MonitorResult<ReportTask> {
        self.get_by_id("report task", "/api/org/report/tasks", id)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    err: EnvelopeError,
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ListData<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}

/// Unwraps the `{success, err, data}` envelope of a monitor response.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> MonitorResult<Option<T>> {
    let ok_status = (200..300).contains(&status);
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(err) if ok_status => return Err(MonitorError::Decode(err)),
        Err(_) => {
            return Err(MonitorError::Status {
                status,
                code: String::new(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            })
        }
    };

    if !ok_status || !envelope.success {
        return Err(MonitorError::Status {
            status,
            code: envelope.err.code,
            message: envelope.err.msg,
        });
    }

    Ok(envelope.data)
}
