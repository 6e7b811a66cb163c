//! Port for the wire-level HTTP exchange used by [`crate::domain::ApiClient`].
//!
//! Adapters own transport details only: URL joining, timeouts, TLS, and
//! header encoding. Interception (bearer injection, 401 handling) and error
//! normalisation stay in the domain so every adapter behaves identically.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP verbs used by the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request after interception.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path relative to the configured API base URL, e.g. `/orders/42`.
    pub path: String,
    /// Bearer credential attached by the request interceptor.
    pub bearer: Option<String>,
    /// JSON body, if the call carries one.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build a request without credentials or body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes; empty for bodiless responses.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Failures where no HTTP response was received.
    pub enum TransportError {
        /// The connection could not be established or was interrupted.
        Connection { message: String } => "connection failed: {message}",
        /// The request did not complete within the configured timeout.
        Timeout { message: String } => "request timed out: {message}",
        /// The request could not be built (bad path, unencodable header).
        InvalidRequest { message: String } => "request could not be built: {message}",
    }
}

/// Wire-level HTTP exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever status the backend answered with.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
