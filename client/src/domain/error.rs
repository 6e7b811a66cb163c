//! Normalised API error shared by every service.
//!
//! Whatever goes wrong on a backend call (no connection, a 401, a
//! validation rejection) callers see the same `{statusCode, message,
//! error}` triple. Transport exception types never leak past
//! [`crate::domain::ApiClient`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code reported when no response was received.
pub const CONNECTION_ERROR_STATUS: u16 = 500;
/// Message reported when no response was received.
pub const CONNECTION_ERROR_MESSAGE: &str = "connection error";
/// Error label reported when no response was received.
pub const CONNECTION_ERROR_LABEL: &str = "Network Error";

/// Failure category derived from the normalised status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// No response was received.
    Transport,
    /// 401: the session was rejected; a forced logout has already happened.
    Unauthenticated,
    /// 403: the user is known but lacks permission.
    Forbidden,
    /// 404: the referenced resource does not exist server-side.
    NotFound,
    /// Any other 4xx, carrying a backend message meant for display.
    Validation,
    /// 5xx answered by the backend.
    Server,
}

/// Normalised error payload.
///
/// ## Invariants
/// - `message` is never empty; a reason phrase is substituted when the
///   backend omits one.
///
/// # Examples
/// ```
/// use ego_house::domain::{ApiError, ApiErrorKind};
///
/// let err = ApiError::from_response(403, br#"{"statusCode":403,"message":"Admins only","error":"Forbidden"}"#);
/// assert_eq!(err.kind(), ApiErrorKind::Forbidden);
/// assert_eq!(err.message(), "Admins only");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    status_code: u16,
    message: String,
    error: String,
    #[serde(skip)]
    transport: bool,
}

/// Error body as sent by the backend; `message` may be a list of strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendErrorBody {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// Build an error from explicit parts.
    pub fn new(status_code: u16, message: impl Into<String>, error: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            reason_phrase(status_code).to_owned()
        } else {
            message
        };
        Self {
            status_code,
            message,
            error: error.into(),
            transport: false,
        }
    }

    /// Error reported when no response was received at all.
    pub fn connection() -> Self {
        Self {
            transport: true,
            ..Self::new(
                CONNECTION_ERROR_STATUS,
                CONNECTION_ERROR_MESSAGE,
                CONNECTION_ERROR_LABEL,
            )
        }
    }

    /// Normalise a non-2xx response. Bodies that are not the backend's JSON
    /// error shape fall back to the status reason phrase.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let reason = reason_phrase(status_code);
        let Ok(parsed) = serde_json::from_slice::<BackendErrorBody>(body) else {
            return Self::new(status_code, reason, reason);
        };
        let message = parsed
            .message
            .as_ref()
            .map(flatten_message)
            .unwrap_or_default();
        let error = parsed
            .error
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| reason.to_owned());
        Self::new(status_code, message, error)
    }

    /// A 2xx response whose body did not match the expected shape.
    pub fn undecodable(detail: impl std::fmt::Display) -> Self {
        Self::new(
            CONNECTION_ERROR_STATUS,
            format!("unexpected response body: {detail}"),
            "Decode Error",
        )
    }

    /// HTTP status code (500 for transport failures).
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Human-readable message suitable for an inline banner.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Short error label, e.g. `Unauthorized`.
    pub fn error(&self) -> &str {
        self.error.as_str()
    }

    /// Failure category.
    pub fn kind(&self) -> ApiErrorKind {
        if self.transport {
            return ApiErrorKind::Transport;
        }
        match self.status_code {
            401 => ApiErrorKind::Unauthenticated,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            400..=499 => ApiErrorKind::Validation,
            _ => ApiErrorKind::Server,
        }
    }
}

fn flatten_message(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Canonical reason phrase for the statuses this backend emits.
pub(crate) fn reason_phrase(status_code: u16) -> &'static str {
    match status_code {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}
