use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MonitorResult<T> = Result<T, MonitorError>;

/// Classified failure of a monitoring service call.
#[derive(Debug)]
pub enum MonitorError {
    /// Request never produced an HTTP response (DNS, connect, IO, timeout).
    Transport(String),
    /// Non-2xx status or an envelope with `success=false`.
    Status {
        status: u16,
        code: String,
        message: String,
    },
    /// A by-id lookup succeeded but carried no entity.
    EmptyResult { resource: &'static str, id: i64 },
    /// Response body is not the expected JSON envelope.
    Decode(serde_json::Error),
}

impl Display for MonitorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "monitor request failed: {message}"),
            Self::Status {
                status,
                code,
                message,
            } => write!(
                f,
                "monitor responded with status {status} (code `{code}`): {message}"
            ),
            Self::EmptyResult { resource, id } => {
                write!(f, "monitor returned no {resource} for id {id}")
            }
            Self::Decode(err) => write!(f, "invalid monitor response: {err}"),
        }
    }
}

impl Error for MonitorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Transport(_) | Self::Status { .. } | Self::EmptyResult { .. } => None,
        }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}
