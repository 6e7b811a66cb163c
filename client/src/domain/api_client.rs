//! Typed HTTP client with bearer injection and global 401 handling.
//!
//! Every call goes through [`ApiClient::send`], which:
//! 1. attaches the bearer token (registered session first, token mirror
//!    second, so calls work before the session registers itself);
//! 2. on a 401, clears the token mirror and forces the registered session
//!    to log out before surfacing the error;
//! 3. normalises every failure into [`ApiError`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use super::ports::{ApiRequest, HttpMethod, HttpTransport, SessionHandle};
use super::token::TokenStorage;

const UNAUTHORIZED: u16 = 401;

/// HTTP client shared by every service.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    token_storage: TokenStorage,
    session: RwLock<Option<Arc<dyn SessionHandle>>>,
}

impl ApiClient {
    /// Create a client over `transport`, falling back to `token_storage`
    /// for credentials until a session is registered.
    pub fn new(transport: Arc<dyn HttpTransport>, token_storage: TokenStorage) -> Self {
        Self {
            transport,
            token_storage,
            session: RwLock::new(None),
        }
    }

    /// Register the late-bound session capability. Replaces any earlier
    /// registration.
    pub fn register_session(&self, session: Arc<dyn SessionHandle>) {
        let mut slot = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(session);
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Get, path)).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::new(HttpMethod::Post, path).with_body(encode_body(body)?);
        self.send(request).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::new(HttpMethod::Put, path).with_body(encode_body(body)?);
        self.send(request).await
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(HttpMethod::Delete, path)).await
    }

    /// Intercept, dispatch, and decode one request.
    pub async fn send<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, ApiError> {
        request.bearer = self.current_token();
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, path = %path, authenticated = request.bearer.is_some(), "dispatching request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%method, path = %path, %error, "request failed without a response");
                return Err(ApiError::connection());
            }
        };

        if response.status == UNAUTHORIZED {
            self.handle_unauthorized();
        }
        if !response.is_success() {
            let error = ApiError::from_response(response.status, &response.body);
            debug!(%method, path = %path, status = response.status, message = error.message(), "request rejected");
            return Err(error);
        }

        let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(ApiError::undecodable)
    }

    fn current_token(&self) -> Option<String> {
        self.registered_session()
            .and_then(|session| session.token())
            .or_else(|| self.token_storage.get())
    }

    fn handle_unauthorized(&self) {
        if let Err(error) = self.token_storage.remove() {
            warn!(%error, "failed to clear token mirror after 401");
        }
        if let Some(session) = self.registered_session() {
            session.force_logout();
        }
    }

    fn registered_session(&self) -> Option<Arc<dyn SessionHandle>> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Percent-encode one path segment (e.g. an item name in a URL path).
pub(crate) fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|error| {
        ApiError::new(400, format!("request body could not be encoded: {error}"), "Bad Request")
    })
}
