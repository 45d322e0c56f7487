//! Error types for backend access.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for backend client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Longest raw body kept in a [`ClientError::Status`] detail.
const MAX_DETAIL_LEN: usize = 512;

/// Everything that can go wrong talking to the backend.
///
/// Three families matter to callers: the backend could not be reached
/// ([`ClientError::Transport`]), it answered with a non-2xx status
/// ([`ClientError::Status`]), or it answered with something other than the
/// expected document ([`ClientError::Decode`]). None of them is retried by
/// the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or body transfer failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `detail` is the backend's `{"detail": ...}` message
    /// when present.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response from {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed or prematurely closed event stream.
    #[error("event stream error: {0}")]
    Stream(String),

    /// An event carried an image that is not valid base64.
    #[error("invalid image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Returns the HTTP status for [`ClientError::Status`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the backend reported that the entity does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Returns true when the backend could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_connect() || err.is_timeout())
    }

    /// Builds a [`ClientError::Status`] from a response status and body.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        Self::Status {
            status: status.as_u16(),
            detail: detail_from_body(status, body),
        }
    }
}

/// Extracts the most useful message from an error response body.
///
/// Preference order: `{"detail": "..."}` (FastAPI's `HTTPException`), a
/// non-string `detail` such as a validation error list rendered as JSON,
/// `{"error": "..."}`, the raw body, and finally the status reason.
fn detail_from_body(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        match object.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Null) | None => {}
            Some(detail) => return detail.to_string(),
        }
        if let Some(Value::String(error)) = object.get("error") {
            return error.clone();
        }
    }

    if !body.is_empty() {
        return body.chars().take(MAX_DETAIL_LEN).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
