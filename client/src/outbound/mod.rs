//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed [`crate::domain::ports::HttpTransport`]
//! - **storage**: file and in-memory [`crate::domain::ports::KeyValueStore`]
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod http;
pub mod storage;
