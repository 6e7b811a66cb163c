//! Bearer-token mirror with expiry introspection.
//!
//! The session store is the source of truth for the token; this mirror is
//! a flat key the HTTP client can read before the store has registered
//! itself. Only the session store writes to it.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use mockable::Clock;
use serde::Deserialize;
use tracing::warn;

use super::ports::{KeyValueStore, StorageError};

/// Claims read from the token payload. Only `exp` matters to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry in seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Decode the middle segment of a three-part dot-delimited token.
    ///
    /// No signature verification happens here; the backend rejects tampered
    /// tokens on its own.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };
        let trimmed = payload.trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .or_else(|_| STANDARD.decode(payload))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Token mirror stored under a fixed key.
#[derive(Clone)]
pub struct TokenStorage {
    store: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl TokenStorage {
    /// Create a mirror over `store` using `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            key: key.into(),
            clock,
        }
    }

    /// Key the token is stored under.
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Current mirrored token. Storage failures read as "no token".
    pub fn get(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(token) => token.filter(|value| !value.is_empty()),
            Err(error) => {
                warn!(%error, "token mirror unreadable; treating as absent");
                None
            }
        }
    }

    /// Replace the mirrored token.
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(&self.key, token)
    }

    /// Clear the mirrored token.
    pub fn remove(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }

    /// Whether the mirrored token is present and not yet expired.
    ///
    /// Any decode failure counts as invalid.
    pub fn is_valid(&self) -> bool {
        self.get()
            .is_some_and(|token| is_unexpired(&token, self.clock.as_ref()))
    }
}

/// Whether `token` decodes and its `exp` lies in the future.
pub fn is_unexpired(token: &str, clock: &dyn Clock) -> bool {
    TokenClaims::decode(token).is_some_and(|claims| claims.exp > clock.utc().timestamp())
}
