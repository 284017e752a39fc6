#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Local persistence for polymap collections.
//!
//! Each record kind is stored as one JSON array under a fixed key of a
//! [`KeyValueBackend`]. A [`RecordStore`] serializes and deserializes that
//! array. Damaged data loads as whatever records still decode, and a copy
//! is kept before it can be overwritten. A [`Collection`] keeps the
//! in-memory copy and the stored copy in lockstep by rewriting the whole
//! array on every mutation.
//!
//! Two backends ship with the crate:
//! - [`MemoryBackend`] for tests and embedding (optionally quota-limited)
//! - [`FileBackend`] which keeps one `<key>.json` file per key on disk

pub mod backend;
pub mod collection;
pub mod paths;
pub mod store;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use collection::Collection;
pub use polymap_storage_models::StoredRecord;
pub use store::RecordStore;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted records.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O operation on the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Records could not be serialized to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The write would exceed the backend's storage quota.
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {available} available")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        available: usize,
    },

    /// The key cannot be mapped onto the backend (e.g. contains path
    /// separators for the file backend).
    #[error("Invalid storage key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// Errors from looking up a record by full id or id prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No record id equals or starts with the given text.
    #[error("No record found matching '{0}'")]
    NotFound(String),

    /// More than one record id starts with the given prefix.
    #[error("{count} records match prefix '{prefix}'. Be more specific.")]
    Ambiguous {
        /// The prefix that was looked up.
        prefix: String,
        /// Number of matching records.
        count: usize,
    },
}
