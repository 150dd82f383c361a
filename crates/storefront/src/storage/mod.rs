//! Key-value storage backends for the cart.
//!
//! The cart only ever needs what browser local storage offers: string values
//! under string keys, scoped to one origin. [`KeyValueStorage`] captures that
//! contract so hosts and tests can plug in whatever backs it.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map, used by tests and headless hosts
//! - [`FileStorage`] - a single JSON file on disk

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value couldn't be serialized for writing.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// String key-value storage local to one origin.
///
/// Every write overwrites the whole value under a key; readers never see a
/// partially written value.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend can't be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend can't be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
