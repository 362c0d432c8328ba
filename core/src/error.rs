//! Error types for the contacts client.
//!
//! # Design
//! Every failure is a remote operation failure. `NotFound` gets its own
//! variant because callers routinely distinguish "no such record" from "the
//! server broke". `Normalized` is what `update` and `remove` hand to their
//! subscribers instead of failing the stream.

use std::fmt;

use thiserror::Error;

/// Errors produced while building, sending, or parsing a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The exchange never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A per-record operation was given a record with no identifier.
    #[error("record has no identifier")]
    MissingId,
}

impl ApiError {
    /// The human-readable message this failure carries, if any.
    ///
    /// For status failures that is the text the server sent back: the
    /// `message` (or `error`) field of a JSON object body, else the body
    /// itself, else the status line. Only `MissingId` carries no message.
    pub fn message(&self) -> Option<String> {
        match self {
            ApiError::NotFound { body } => Some(server_message(404, body)),
            ApiError::HttpError { status, body } => Some(server_message(*status, body)),
            ApiError::DeserializationError(msg)
            | ApiError::SerializationError(msg)
            | ApiError::Transport(msg) => Some(msg.clone()),
            ApiError::MissingId => None,
        }
    }
}

fn server_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {status}");
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(text)) = fields.get(key) {
                return text.clone();
            }
        }
    }
    body.to_string()
}

/// A failure after normalization: its message when it has one, otherwise
/// the raw error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Message(String),
    Raw(ApiError),
}

impl From<ApiError> for Normalized {
    fn from(error: ApiError) -> Self {
        match error.message() {
            Some(message) => Normalized::Message(message),
            None => Normalized::Raw(error),
        }
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalized::Message(message) => f.write_str(message),
            Normalized::Raw(error) => write!(f, "{error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_message_field_wins() {
        let err = ApiError::HttpError {
            status: 500,
            body: r#"{"message":"database offline","error":"internal"}"#.to_string(),
        };
        assert_eq!(err.message().as_deref(), Some("database offline"));
    }

    #[test]
    fn json_error_field_is_fallback() {
        let err = ApiError::NotFound {
            body: r#"{"error":"contact 7 not found"}"#.to_string(),
        };
        assert_eq!(err.message().as_deref(), Some("contact 7 not found"));
    }

    #[test]
    fn plain_text_body_is_the_message() {
        let err = ApiError::HttpError {
            status: 502,
            body: "  bad gateway\n".to_string(),
        };
        assert_eq!(err.message().as_deref(), Some("bad gateway"));
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = ApiError::HttpError {
            status: 503,
            body: String::new(),
        };
        assert_eq!(Normalized::from(err), Normalized::Message("HTTP 503".to_string()));

        let err = ApiError::NotFound {
            body: " \n".to_string(),
        };
        assert_eq!(err.message().as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn missing_id_has_no_message() {
        assert_eq!(
            Normalized::from(ApiError::MissingId),
            Normalized::Raw(ApiError::MissingId)
        );
    }

    #[test]
    fn transport_failure_normalizes_to_its_description() {
        let normalized = Normalized::from(ApiError::Transport("connection refused".to_string()));
        assert_eq!(normalized, Normalized::Message("connection refused".to_string()));
        assert_eq!(normalized.to_string(), "connection refused");
    }
}
