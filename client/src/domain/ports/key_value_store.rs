//! Port abstraction for the client-side string storage that backs the
//! persisted session blob and the bearer-token mirror.
//!
//! The store is synchronous: every adapter answers from local state (memory
//! or a file in the state directory), so callers never suspend on it.

use super::define_port_error;

define_port_error! {
    /// Failures raised by key-value storage adapters.
    pub enum StorageError {
        /// Reading or writing the backing medium failed.
        Io { key: String, message: String } => "storage access for {key} failed: {message}",
        /// The stored value could not be interpreted.
        Corrupt { key: String, message: String } => "stored value for {key} is unreadable: {message}",
    }
}

/// String storage keyed by a fixed name.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
