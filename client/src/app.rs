//! Composition root: builds the adapters, the session, and the services,
//! and registers the session with the HTTP client exactly once.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::config::{ClientSettings, ConfigError};
use crate::domain::ports::{HttpTransport, KeyValueStore, SessionHandle};
use crate::domain::{
    ActivityTracker, ApiClient, AuthService, CatalogService, OrderService, RehydrationOutcome,
    SessionStore, TokenStorage,
};
use crate::inbound::cli::CommandContext;
use crate::outbound::http::ReqwestTransport;
use crate::outbound::storage::FileKeyValueStore;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Settings were unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The state directory could not be opened or created.
    #[error("failed to open state directory {path}: {source}")]
    StateDir {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Storage keys for the token mirror and the session blob.
#[derive(Debug, Clone, Copy)]
pub struct StorageKeys<'a> {
    /// Token mirror key.
    pub token: &'a str,
    /// Session blob key.
    pub session: &'a str,
}

/// Wired client: one session, one HTTP client, and the services over them.
pub struct AppContext {
    session: Arc<SessionStore>,
    api: Arc<ApiClient>,
    auth: AuthService,
    orders: OrderService,
    catalog: CatalogService,
    activity: ActivityTracker,
}

impl AppContext {
    /// Wire the client over arbitrary adapters.
    pub fn assemble(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        keys: StorageKeys<'_>,
    ) -> Self {
        let mirror = || TokenStorage::new(store.clone(), keys.token, clock.clone());
        let session = Arc::new(SessionStore::new(
            store.clone(),
            keys.session,
            mirror(),
            clock.clone(),
        ));
        let api = Arc::new(ApiClient::new(transport, mirror()));
        api.register_session(session.clone() as Arc<dyn SessionHandle>);
        Self {
            auth: AuthService::new(api.clone(), session.clone()),
            orders: OrderService::new(api.clone()),
            catalog: CatalogService::new(api.clone()),
            activity: ActivityTracker::new(clock),
            session,
            api,
        }
    }

    /// Wire the client from settings: on-disk state under `state_dir` and a
    /// reqwest transport against `api_url`.
    ///
    /// # Errors
    ///
    /// Fails when the URL is invalid, the state directory cannot be
    /// created, or the HTTP client cannot be built.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, BootstrapError> {
        let base_url = settings.api_url()?;
        let state_dir = settings.state_dir();
        let store = FileKeyValueStore::open(&state_dir).map_err(|source| BootstrapError::StateDir {
            path: state_dir.clone(),
            source,
        })?;
        let transport = ReqwestTransport::new(base_url, settings.request_timeout())?;
        info!(
            api_url = %transport.base_url(),
            state_dir = %state_dir.display(),
            "client configured"
        );
        Ok(Self::assemble(
            Arc::new(store),
            Arc::new(transport),
            Arc::new(DefaultClock),
            StorageKeys {
                token: settings.token_key(),
                session: settings.session_key(),
            },
        ))
    }

    /// Restore the persisted session. Call once before routing or issuing
    /// commands.
    pub fn start(&self) -> RehydrationOutcome {
        self.session.rehydrate()
    }

    /// Shared session store.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Shared HTTP client.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Auth endpoints.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Borrowed view handed to CLI commands.
    pub fn commands(&self) -> CommandContext<'_> {
        CommandContext {
            session: &self.session,
            auth: &self.auth,
            orders: &self.orders,
            catalog: &self.catalog,
            activity: &self.activity,
        }
    }
}
