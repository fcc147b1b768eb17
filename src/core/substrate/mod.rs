//! Key-value substrates backing the profile store.
//!
//! A substrate is a synchronous, string-keyed, string-valued map scoped to a
//! single storage origin. [`FileStore`] is the durable one used by the
//! binary; [`MemoryStore`] backs tests and short-lived sessions.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Errors raised by a substrate.
#[derive(Debug)]
pub enum SubstrateError {
    /// Reading or writing the backing file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The value does not fit in the substrate's budget.
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
    /// The key contains characters the substrate cannot store.
    InvalidKey(String),
    /// Storage is switched off or otherwise refusing writes.
    Unavailable(String),
}

impl fmt::Display for SubstrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstrateError::Io { path, source } => {
                write!(f, "storage I/O error at {}: {}", path.display(), source)
            }
            SubstrateError::QuotaExceeded { key, size, limit } => write!(
                f,
                "storage quota exceeded for '{key}': {size} bytes (limit {limit})"
            ),
            SubstrateError::InvalidKey(key) => write!(f, "invalid storage key: '{key}'"),
            SubstrateError::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl StdError for SubstrateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SubstrateError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Synchronous string key-value storage for one origin.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError>;

    /// Replaces the value stored under `key` in a single step.
    fn set(&self, key: &str, value: &str) -> Result<(), SubstrateError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), SubstrateError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SubstrateError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SubstrateError> {
        (**self).remove(key)
    }
}

pub(crate) fn check_quota(
    key: &str,
    value: &str,
    limit: Option<usize>,
) -> Result<(), SubstrateError> {
    match limit {
        Some(limit) if key.len() + value.len() > limit => Err(SubstrateError::QuotaExceeded {
            key: key.to_string(),
            size: key.len() + value.len(),
            limit,
        }),
        _ => Ok(()),
    }
}
