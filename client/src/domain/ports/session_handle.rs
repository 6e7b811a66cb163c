//! Late-bound session capability consumed by the HTTP client.
//!
//! The client reads the current token through this port and forces a logout
//! through it when the backend answers 401. The session store registers
//! itself once at startup; until then the client falls back to the token
//! mirror.

/// Minimal view of the session that the HTTP client may touch.
pub trait SessionHandle: Send + Sync {
    /// Current bearer token, if the session holds one.
    fn token(&self) -> Option<String>;

    /// Clear the session because the backend rejected its credentials.
    fn force_logout(&self);
}
