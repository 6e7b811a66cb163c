//! EGO HOUSE client library.
//!
//! Session-aware access to the venue backend: a persisted session with
//! staleness eviction, a bearer-injecting HTTP client that forces a logout
//! on 401, a role gate for navigation, and typed catalogue and order
//! services.
//!
//! The hexagon is split the usual way: [`domain`] holds the rules and the
//! ports, [`outbound`] the reqwest and storage adapters, [`inbound`] the
//! CLI. [`app`] wires them together.

pub mod app;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{AppContext, BootstrapError, StorageKeys};
pub use config::ClientSettings;
