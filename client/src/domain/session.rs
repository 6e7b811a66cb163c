//! Session store: the single source of truth for who is logged in.
//!
//! Identity fields (`user`, `token`, `is_authenticated`) change only through
//! [`SessionStore::apply`], which re-derives the authentication flag,
//! persists the persisted subset, mirrors the token into [`TokenStorage`],
//! and publishes the new snapshot. Transient UI fields (`is_loading`,
//! `error`) are never persisted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::{KeyValueStore, SessionHandle};
use super::token::TokenStorage;
use super::User;

/// Sessions idle for longer than this are evicted on rehydration.
pub const STALE_AFTER_MS: i64 = 7 * 24 * 60 * 60 * 1000;
/// Schema version written into the persisted blob.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Coarse lifecycle state derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No identity held and nothing in flight.
    Unauthenticated,
    /// No identity held yet, but a login/register or rehydration is running.
    Authenticating,
    /// User and token are both present.
    Authenticated,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user: Option<User>,
    token: Option<String>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
    last_activity: Option<i64>,
    hydrated: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
            last_activity: None,
            hydrated: false,
        }
    }
}

impl SessionState {
    /// Logged-in identity.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Bearer token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether both user and token are held.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Whether an auth call or rehydration is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Last error recorded for display.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last interaction, in milliseconds since the Unix epoch.
    pub fn last_activity(&self) -> Option<i64> {
        self.last_activity
    }

    /// Whether rehydration has completed. Protected views must not render
    /// before this is true.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Lifecycle state.
    pub fn status(&self) -> SessionStatus {
        if self.is_authenticated {
            SessionStatus::Authenticated
        } else if self.is_loading {
            SessionStatus::Authenticating
        } else {
            SessionStatus::Unauthenticated
        }
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated,
            last_activity: self.last_activity,
        }
    }
}

/// Persisted subset of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Logged-in identity.
    #[serde(default)]
    pub user: Option<User>,
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Stored authentication flag.
    #[serde(default)]
    pub is_authenticated: bool,
    /// Last interaction, in milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_activity: Option<i64>,
}

/// Versioned blob written under the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Persisted subset.
    pub state: PersistedState,
    /// Schema version.
    pub version: u32,
}

impl PersistedSession {
    fn migrate(self) -> Option<PersistedState> {
        match self.version {
            // Version 0 blobs share the version 1 layout.
            0 | SESSION_SCHEMA_VERSION => Some(self.state),
            _ => None,
        }
    }
}

/// What rehydration found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RehydrationOutcome {
    /// Nothing usable was persisted.
    Empty,
    /// A live session was restored.
    Restored,
    /// A persisted session was older than [`STALE_AFTER_MS`] and was cleared.
    Evicted,
}

enum Transition {
    SignIn { user: User, token: String },
    Restore { user: User, token: String, last_activity: Option<i64> },
    SignOut,
    ReplaceUser(User),
    Touch,
}

/// Session store shared by the auth service, the HTTP client, and the
/// route gate.
pub struct SessionStore {
    state: Mutex<SessionState>,
    store: Arc<dyn KeyValueStore>,
    session_key: String,
    token_storage: TokenStorage,
    clock: Arc<dyn Clock>,
    updates: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store that persists under `session_key` and mirrors its
    /// token through `token_storage`. The store starts loading and
    /// unhydrated; call [`Self::rehydrate`] once before rendering.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session_key: impl Into<String>,
        token_storage: TokenStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let initial = SessionState::default();
        let (updates, _) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            store,
            session_key: session_key.into(),
            token_storage,
            clock,
            updates,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Receive every subsequent snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Whether both user and token are held.
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    /// The token mirror this store writes through.
    pub fn token_storage(&self) -> &TokenStorage {
        &self.token_storage
    }

    /// Record a successful login or registration.
    /// A blank token cannot authenticate anything; it clears the session
    /// instead so the store and the token mirror stay identical.
    pub fn login(&self, user: User, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            warn!(user_id = %user.id, "refusing to start a session with a blank token");
            self.apply(Transition::SignOut);
            return;
        }
        info!(user_id = %user.id, role = %user.role, "session started");
        self.apply(Transition::SignIn { user, token });
    }

    /// Clear the identity. Safe to call when already logged out.
    pub fn logout(&self) {
        self.apply(Transition::SignOut);
    }

    /// Replace the identity after a profile refresh.
    pub fn update_user(&self, user: User) {
        self.apply(Transition::ReplaceUser(user));
    }

    /// Stamp `last_activity` with the current time. Throttling is the
    /// caller's job (see [`crate::domain::ActivityTracker`]).
    pub fn update_activity(&self) {
        self.apply(Transition::Touch);
    }

    /// Set the transient loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.update_transient(|state| state.is_loading = loading);
    }

    /// Set or clear the transient error message.
    pub fn set_error(&self, error: Option<String>) {
        self.update_transient(|state| state.error = error);
    }

    /// Clear the transient error message.
    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Restore persisted state. Runs once at startup; always finishes with
    /// `is_loading == false` and the store marked hydrated.
    pub fn rehydrate(&self) -> RehydrationOutcome {
        self.set_loading(true);
        let outcome = match self.load_persisted() {
            None => {
                self.logout();
                RehydrationOutcome::Empty
            }
            Some(persisted) => self.restore(persisted),
        };
        self.update_transient(|state| {
            state.is_loading = false;
            state.hydrated = true;
        });
        info!(?outcome, "session rehydrated");
        outcome
    }

    fn restore(&self, persisted: PersistedState) -> RehydrationOutcome {
        if persisted.user.is_none() && persisted.token.is_none() {
            self.logout();
            return RehydrationOutcome::Empty;
        }
        let now = self.now_ms();
        let stale = persisted
            .last_activity
            .is_none_or(|last| now.saturating_sub(last) > STALE_AFTER_MS);
        if stale {
            warn!(last_activity = ?persisted.last_activity, "evicting stale session");
            self.logout();
            return RehydrationOutcome::Evicted;
        }

        match (persisted.user, persisted.token) {
            (Some(user), Some(token)) if !token.trim().is_empty() => {
                self.apply(Transition::Restore {
                    user,
                    token,
                    last_activity: persisted.last_activity,
                });
                self.update_activity();
                RehydrationOutcome::Restored
            }
            _ => {
                self.logout();
                RehydrationOutcome::Empty
            }
        }
    }

    fn load_persisted(&self) -> Option<PersistedState> {
        let raw = match self.store.get(&self.session_key) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "persisted session unreadable");
                return None;
            }
        };
        let decoded = match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(decoded) => decoded,
            Err(error) => {
                warn!(%error, "discarding undecodable session blob");
                self.discard_blob();
                return None;
            }
        };
        let version = decoded.version;
        decoded.migrate().or_else(|| {
            warn!(version, "discarding session blob with unknown schema version");
            self.discard_blob();
            None
        })
    }

    fn discard_blob(&self) {
        if let Err(error) = self.store.remove(&self.session_key) {
            warn!(%error, "failed to remove session blob");
        }
    }

    fn apply(&self, transition: Transition) {
        let now = self.now_ms();
        let mut state = self.lock();
        match transition {
            Transition::SignIn { user, token } => {
                state.user = Some(user);
                state.token = Some(token);
                state.error = None;
                state.last_activity = Some(now);
            }
            Transition::Restore {
                user,
                token,
                last_activity,
            } => {
                state.user = Some(user);
                state.token = Some(token);
                state.last_activity = last_activity;
            }
            Transition::SignOut => {
                state.user = None;
                state.token = None;
                state.error = None;
            }
            Transition::ReplaceUser(user) => {
                state.user = Some(user);
                state.last_activity = Some(now);
            }
            Transition::Touch => {
                state.last_activity = Some(now);
            }
        }
        state.is_authenticated = state.user.is_some() && state.token.is_some();

        self.persist(&state);
        self.sync_mirror(state.token.as_deref());
        self.updates.send_replace(state.clone());
    }

    fn update_transient(&self, mutate: impl FnOnce(&mut SessionState)) {
        let mut state = self.lock();
        mutate(&mut state);
        self.updates.send_replace(state.clone());
    }

    fn persist(&self, state: &SessionState) {
        let blob = PersistedSession {
            state: state.persisted(),
            version: SESSION_SCHEMA_VERSION,
        };
        let encoded = match serde_json::to_string(&blob) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(%error, "failed to encode session blob");
                return;
            }
        };
        if let Err(error) = self.store.set(&self.session_key, &encoded) {
            warn!(%error, "failed to persist session");
        }
    }

    fn sync_mirror(&self, token: Option<&str>) {
        let mirrored = self.token_storage.get();
        let result = match token {
            Some(token) if mirrored.as_deref() == Some(token) => Ok(()),
            Some(token) => {
                debug!("writing token mirror");
                self.token_storage.set(token)
            }
            None if mirrored.is_none() => Ok(()),
            None => self.token_storage.remove(),
        };
        if let Err(error) = result {
            warn!(%error, "token mirror write failed");
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionHandle for SessionStore {
    fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    fn force_logout(&self) {
        warn!("backend rejected session credentials; logging out");
        self.logout();
    }
}
