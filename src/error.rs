//! Error model for the storage-facing layers.
//! Cookie-jar and shared-store operations return an explicit `StorageError`
//! so each call site decides whether a failure reads as "not authenticated"
//! (fail-open) or aborts the operation (fail-closed).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageError {
    /// The backing store cannot be reached at all (e.g. cookie access blocked).
    #[error("storage_unavailable: {message}")]
    Unavailable { message: String },
    /// A stored value could not be encoded or decoded.
    #[error("storage_codec: {message}")]
    Codec { message: String },
}

impl StorageError {
    pub fn unavailable<S: Into<String>>(msg: S) -> Self { StorageError::Unavailable { message: msg.into() } }
    pub fn codec<S: Into<String>>(msg: S) -> Self { StorageError::Codec { message: msg.into() } }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Codec { message: err.to_string() }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
