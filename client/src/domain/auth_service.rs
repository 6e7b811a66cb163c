//! Login, registration, and profile flows.
//!
//! Successful login/register responses are written into the session before
//! the call returns, so callers never persist anything themselves. Failures
//! are both recorded on the session (for display) and returned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::api_client::ApiClient;
use super::auth::{AuthResponse, LoginCredentials, Registration};
use super::error::ApiError;
use super::session::SessionStore;
use super::User;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const PROFILE_PATH: &str = "/auth/profile";
const LOGOUT_PATH: &str = "/auth/logout";

/// Orchestrates auth endpoints and session updates.
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    /// Create a service over a shared client and session.
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// `POST /auth/login`, then start the session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        let result = self.authenticate(LOGIN_PATH, &credentials.body()).await;
        if result.is_ok() {
            info!("login succeeded");
        }
        result
    }

    /// `POST /auth/register`, then start the session.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let result = self.authenticate(REGISTER_PATH, &registration.body()).await;
        if result.is_ok() {
            info!("registration succeeded");
        }
        result
    }

    /// Tell the backend (best effort) and clear the local session
    /// unconditionally.
    pub async fn logout(&self) {
        if self.session.is_authenticated() {
            if let Err(error) = self.api.post::<serde_json::Value, _>(LOGOUT_PATH, &()).await {
                warn!(status = error.status_code(), message = error.message(), "logout notification failed");
            }
        }
        self.session.logout();
        info!("logged out");
    }

    /// Cached user if logged in; otherwise try the profile endpoint.
    /// Returns `None` instead of an error when neither is available.
    pub async fn get_current_user(&self) -> Option<User> {
        if let Some(user) = self.session.snapshot().user() {
            return Some(user.clone());
        }
        match self.api.get::<User>(PROFILE_PATH).await {
            Ok(user) => Some(user),
            Err(error) => {
                debug!(status = error.status_code(), "no current user");
                None
            }
        }
    }

    /// `GET /auth/profile`. Refreshes the session identity when logged in.
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let user: User = self.api.get(PROFILE_PATH).await?;
        if self.session.is_authenticated() {
            self.session.update_user(user.clone());
        }
        Ok(user)
    }

    /// Logged in with a token that has not yet expired.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated() && self.session.token_storage().is_valid()
    }

    async fn authenticate<B>(&self, path: &str, body: &B) -> Result<AuthResponse, ApiError>
    where
        B: serde::Serialize + ?Sized,
    {
        self.session.set_loading(true);
        self.session.clear_error();
        let result = self.api.post::<AuthResponse, B>(path, body).await;
        match &result {
            Ok(response) => self
                .session
                .login(response.user.clone(), response.access_token.clone()),
            Err(error) => {
                warn!(path, status = error.status_code(), message = error.message(), "authentication failed");
                self.session.set_error(Some(error.message().to_owned()));
            }
        }
        self.session.set_loading(false);
        result
    }
}
