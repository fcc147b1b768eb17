use std::error::Error as StdError;
use std::fmt;

use crate::core::substrate::SubstrateError;

/// Errors surfaced by [`ProfileStore`](super::ProfileStore) write operations.
///
/// Read operations never fail: unreadable storage reads as empty.
#[derive(Debug)]
pub enum StoreError {
    /// The substrate refused the write (quota, I/O, storage disabled).
    Persistence {
        key: &'static str,
        source: SubstrateError,
    },
    /// The root record could not be encoded.
    Serialize(serde_json::Error),
    /// No profile with this id exists.
    NotFound { id: String },
    /// Another profile already uses this name (compared case-insensitively).
    NameTaken { name: String },
}

impl StoreError {
    /// True for failures of the underlying storage rather than of the request.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            StoreError::Persistence { .. } | StoreError::Serialize(_)
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Persistence { key, source } => {
                write!(f, "Failed to save chatbot data ({key}): {source}")
            }
            StoreError::Serialize(err) => write!(f, "Failed to encode chatbot data: {err}"),
            StoreError::NotFound { id } => write!(f, "Chatbot '{id}' not found"),
            StoreError::NameTaken { name } => {
                write!(f, "A chatbot named '{name}' already exists")
            }
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Persistence { source, .. } => Some(source),
            StoreError::Serialize(err) => Some(err),
            StoreError::NotFound { .. } | StoreError::NameTaken { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}
