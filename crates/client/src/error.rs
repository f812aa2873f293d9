//! Client error taxonomy and the user-facing message policy.

use serde_json::Value;

use billbook_core::DomainError;
use billbook_invoicing::ValidationError;

pub type ClientResult<T> = Result<T, ClientError>;

pub const NETWORK_MESSAGE: &str = "Could not reach the server. Check your connection and try again.";
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";
pub const BUSY_MESSAGE: &str = "Another invoice action is still in progress.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local validation failed; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The invoice's current state does not allow the action.
    #[error("lifecycle: {0}")]
    Lifecycle(DomainError),

    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("parse error: {0}")]
    Parse(String),

    /// A lifecycle request is already outstanding.
    #[error("another request is in flight")]
    Busy,
}

impl From<DomainError> for ClientError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Malformed(msg) => ClientError::Parse(msg),
            other => ClientError::Lifecycle(other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ClientError::Parse(value.to_string())
        } else {
            ClientError::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        ClientError::Parse(value.to_string())
    }
}

impl ClientError {
    /// Text to show the user: the server's message verbatim when it sent one,
    /// a generic message otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(err) => capitalize(&err.to_string()),
            ClientError::Lifecycle(DomainError::Conflict(msg)) => capitalize(msg),
            ClientError::Lifecycle(DomainError::NotFound) => "This invoice no longer exists.".into(),
            ClientError::Lifecycle(_) | ClientError::Parse(_) => GENERIC_MESSAGE.into(),
            ClientError::Network(_) => NETWORK_MESSAGE.into(),
            ClientError::Api { message: Some(msg), .. } => msg.clone(),
            ClientError::Api { message: None, .. } => GENERIC_MESSAGE.into(),
            ClientError::Busy => BUSY_MESSAGE.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable message in an error body: `message`, then `error`, then the
/// first entry of an `errors` map (Laravel validation style).
pub fn server_message(body: &Value) -> Option<String> {
    let text = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(msg) = body.get("message").and_then(text) {
        return Some(msg);
    }
    if let Some(msg) = body.get("error").and_then(text) {
        return Some(msg);
    }
    let first = match body.get("errors")? {
        Value::Object(map) => map.values().next()?,
        Value::Array(list) => list.first()?,
        other => other,
    };
    match first {
        Value::Array(list) => list.first().and_then(text),
        other => text(other),
    }
}
