//! Typed JSON array storage under a single backend key.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KeyValueBackend, StorageError};

/// Reads and writes one collection of `T` as a JSON array stored under a
/// fixed key.
///
/// Loading is fail-safe: see [`RecordStore::load_or_default`]. Saving
/// always overwrites the full array.
#[derive(Debug)]
pub struct RecordStore<T> {
    backend: Arc<dyn KeyValueBackend>,
    key: String,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            key: self.key.clone(),
            _records: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> {
    /// Creates a store for the collection under `key`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            _records: PhantomData,
        }
    }

    /// Returns the backend key this store reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the collection, surfacing every failure.
    ///
    /// Returns `Ok(None)` when nothing (or an empty string) is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend read fails or the stored
    /// value is not a JSON array of `T`.
    pub fn load(&self) -> Result<Option<Vec<T>>, StorageError> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(None);
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Loads the collection, substituting what can be recovered for
    /// missing or unreadable data.
    ///
    /// Backend read failures and corrupt JSON load as an empty collection.
    /// A valid array with some malformed records keeps the records that
    /// still decode. Whenever stored data is not fully readable, a copy is
    /// kept through [`KeyValueBackend::preserve`] before anything can
    /// overwrite it. This never fails.
    #[must_use]
    pub fn load_or_default(&self) -> Vec<T> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read '{}', starting empty: {e}", self.key);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                log::debug!("Loaded {} record(s) from '{}'", records.len(), self.key);
                records
            }
            Err(e) => {
                log::warn!("Data under '{}' is unreadable: {e}", self.key);
                if let Err(e) = self.backend.preserve(&self.key) {
                    log::error!("Could not keep a copy of '{}': {e}", self.key);
                }
                self.salvage(&raw)
            }
        }
    }

    fn salvage(&self, raw: &str) -> Vec<T> {
        let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
            log::warn!("'{}' is not a JSON array, starting empty", self.key);
            return Vec::new();
        };

        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                serde_json::from_value(value)
                    .map_err(|e| log::warn!("Skipping record {index} of '{}': {e}", self.key))
                    .ok()
            })
            .collect();

        log::warn!(
            "Recovered {} of {total} record(s) from '{}'",
            records.len(),
            self.key
        );
        records
    }

    /// Serializes `records` and overwrites the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the backend write
    /// fails. The previously stored value is left in place in that case.
    pub fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(&self.key, &raw)?;
        log::debug!("Saved {} record(s) to '{}'", records.len(), self.key);
        Ok(())
    }
}
