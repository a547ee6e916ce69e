//!  Persistence is organized around a flat key → string store, the same shape browser storage
//!  has. The basic idea is:
//!   - [KeyValueStore] is the only capability the accounting logic sees.
//!   - [memory_store::MemoryStore] is used in tests and for throwaway sessions.
//!   - [file_store::FileStore] keeps the whole map in one JSON file inside the application
//!     directory.

pub mod file_store;
pub mod memory_store;

use anyhow::Result;

/// Interface for abstracting storage of the timer's keys.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
