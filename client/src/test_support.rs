//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and the integration/behaviour suites
//! (in `tests/`), which enable the `test-support` feature through the
//! crate's self dev-dependency.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::app::{AppContext, StorageKeys};
use crate::domain::ports::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use crate::domain::{Role, SessionStore, TokenStorage, User, UserId};
pub use crate::outbound::storage::MemoryKeyValueStore;

/// Fixed instant most tests start from: 2025-06-01T12:00:00Z.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0) {
        chrono::LocalResult::Single(now) => now,
        _ => panic!("fixture timestamp must be unambiguous"),
    }
}

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Mint an unsigned three-part token whose payload carries `exp`.
pub fn unsigned_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "1", "exp": exp}).to_string());
    format!("{header}.{payload}.unsigned")
}

/// Administrator identity used across suites.
pub fn admin_user() -> User {
    user_with_role("1", "admin@test.com", Role::Admin)
}

/// Regular customer identity used across suites.
pub fn regular_user() -> User {
    user_with_role("2", "guest@test.com", Role::User)
}

fn user_with_role(id: &str, email: &str, role: Role) -> User {
    let id = match UserId::new(id) {
        Ok(id) => id,
        Err(error) => panic!("fixture id must be valid: {error}"),
    };
    User {
        id,
        email: email.to_owned(),
        name: None,
        role,
    }
}

/// Session store wired to in-memory storage and a controllable clock.
pub struct SessionFixture {
    pub storage: Arc<MemoryKeyValueStore>,
    pub clock: Arc<MutableClock>,
    pub session: Arc<SessionStore>,
}

impl SessionFixture {
    pub const TOKEN_KEY: &'static str = "auth_token";
    pub const SESSION_KEY: &'static str = "auth-storage";

    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryKeyValueStore::default()))
    }

    /// Build over pre-seeded storage, e.g. to exercise rehydration.
    pub fn with_storage(storage: Arc<MemoryKeyValueStore>) -> Self {
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let session = Arc::new(SessionStore::new(
            storage.clone(),
            Self::SESSION_KEY,
            Self::token_storage_for(&storage, &clock),
            clock.clone(),
        ));
        Self {
            storage,
            clock,
            session,
        }
    }

    /// A second handle onto the token mirror the session writes through.
    pub fn token_storage(&self) -> TokenStorage {
        Self::token_storage_for(&self.storage, &self.clock)
    }

    /// Raw mirrored token as stored.
    pub fn mirrored_token(&self) -> Option<String> {
        self.token_storage().get()
    }

    fn token_storage_for(storage: &Arc<MemoryKeyValueStore>, clock: &Arc<MutableClock>) -> TokenStorage {
        TokenStorage::new(storage.clone(), Self::TOKEN_KEY, clock.clone())
    }
}

impl Default for SessionFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fully wired client over in-memory storage, a scripted transport, and a
/// controllable clock.
pub struct AppFixture {
    pub storage: Arc<MemoryKeyValueStore>,
    pub clock: Arc<MutableClock>,
    pub transport: Arc<ScriptedTransport>,
    pub app: AppContext,
}

impl AppFixture {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryKeyValueStore::default()))
    }

    /// Wire over pre-seeded storage. The session is not rehydrated yet.
    pub fn with_storage(storage: Arc<MemoryKeyValueStore>) -> Self {
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let transport = Arc::new(ScriptedTransport::new());
        let app = AppContext::assemble(
            storage.clone(),
            transport.clone(),
            clock.clone(),
            StorageKeys {
                token: SessionFixture::TOKEN_KEY,
                session: SessionFixture::SESSION_KEY,
            },
        );
        Self {
            storage,
            clock,
            transport,
            app,
        }
    }

    /// Rehydrated client with `user` logged in on a token valid for an hour.
    pub fn logged_in(user: User) -> Self {
        let fixture = Self::new();
        fixture.app.start();
        let token = unsigned_token(fixture_now().timestamp() + 3600);
        fixture.app.session().login(user, token);
        fixture
    }
}

impl Default for AppFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport that answers from a queue of scripted responses and records
/// every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(ApiResponse {
            status,
            body: body.to_string().into_bytes(),
        }))
    }

    /// Queue a bodiless response.
    pub fn push_status(&self, status: u16) -> &Self {
        self.push(Ok(ApiResponse {
            status,
            body: Vec::new(),
        }))
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Most recent request, if any.
    pub fn last_request(&self) -> Option<ApiRequest> {
        lock(&self.requests).last().cloned()
    }

    fn push(&self, response: Result<ApiResponse, TransportError>) -> &Self {
        lock(&self.responses).push_back(response);
        self
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::connection("no scripted response left")))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("scripted transport mutex"),
    }
}
