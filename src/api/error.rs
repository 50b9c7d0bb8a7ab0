//! Normalized error type for the API gateway.
//!
//! The REST service reports failures in several body shapes
//! (`{"error": {"message": ..}}`, `{"message": ..}`, `{"error": ".."}`).
//! Everything is folded into [`ApiError`] here so that domain code never
//! inspects raw responses.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the storefront REST service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server answered 401 or 403. The caller's session is no longer valid.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// Server answered with any other non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Request was sent but no response arrived (connect failure, timeout).
    #[error("Could not connect to server: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// Request could not be constructed or sent at all.
    #[error("Invalid request: {0}")]
    Request(String),

    /// 2xx response whose body does not match the expected shape.
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// 2xx auth response without a usable bearer token.
    #[error("Server did not return a token")]
    MissingToken,
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = server_message(body).unwrap_or_else(|| format!("Server error: {}", status));
        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            _ => ApiError::Server { status, message },
        }
    }

    /// Classify a failure reported by the HTTP client itself.
    pub fn from_client(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport { source: err }
        }
    }

    /// True for 401/403, which force the local session to be dropped.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// HTTP status, when the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Short machine-readable classification, used in logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Server { .. } => "server_error",
            ApiError::Transport { .. } => "transport_error",
            ApiError::Request(_) => "request_error",
            ApiError::Decode(_) => "decode_error",
            ApiError::MissingToken => "missing_token",
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Order: `error.message`, then `message`, then a string `error`.
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.get("error").and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}
