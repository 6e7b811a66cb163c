//! Key-value storage adapters backing the persisted session and token
//! mirror.

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
