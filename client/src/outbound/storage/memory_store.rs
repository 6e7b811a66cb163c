//! In-process key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ports::{KeyValueStore, StorageError};

/// Mutex-guarded map implementing [`KeyValueStore`].
///
/// Nothing survives the process; useful for tests and for callers that do
/// not want on-disk state.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn stores_and_removes_values() {
        let store = MemoryKeyValueStore::default();
        store.set("auth_token", "abc").expect("set");
        assert_eq!(store.get("auth_token").expect("get").as_deref(), Some("abc"));
        store.remove("auth_token").expect("remove");
        store.remove("auth_token").expect("second remove is a no-op");
        assert!(!store.contains("auth_token"));
    }

    #[rstest]
    fn seeded_entries_are_visible() {
        let store = MemoryKeyValueStore::with_entries([("auth-storage", "{}")]);
        assert_eq!(store.get("auth-storage").expect("get").as_deref(), Some("{}"));
    }
}
