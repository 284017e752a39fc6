//! In-memory collection mirrored to a [`RecordStore`].
//!
//! Every mutation rewrites the whole stored array before it returns. If
//! the write fails the in-memory change is rolled back, so the collection
//! and the store never disagree.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{RecordStore, ResolveError, StorageError, StoredRecord};

/// An ordered, persisted collection of records addressed by id.
///
/// Insertion order is preserved and is the order records are listed in.
#[derive(Debug)]
pub struct Collection<T> {
    store: RecordStore<T>,
    records: Vec<T>,
}

impl<T> Collection<T>
where
    T: StoredRecord + Serialize + DeserializeOwned,
{
    /// Creates the collection and loads its contents once from `store`.
    ///
    /// Missing stored data yields an empty collection. Damaged data is
    /// handled by [`RecordStore::load_or_default`].
    #[must_use]
    pub fn init(store: RecordStore<T>) -> Self {
        let records = store.load_or_default();
        Self { store, records }
    }

    /// Returns the records in stored order.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Returns the record with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Finds a record by its full id or by a unique id prefix.
    ///
    /// An exact id match always wins over prefix matches.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if nothing matches and
    /// [`ResolveError::Ambiguous`] if the prefix matches several records.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&T, ResolveError> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(ResolveError::NotFound(id_or_prefix.to_string()));
        }

        if let Some(exact) = self.get(needle) {
            return Ok(exact);
        }

        let mut matches = self.records.iter().filter(|r| r.id().starts_with(needle));
        match (matches.next(), matches.count()) {
            (None, _) => Err(ResolveError::NotFound(needle.to_string())),
            (Some(found), 0) => Ok(found),
            (Some(_), rest) => Err(ResolveError::Ambiguous {
                prefix: needle.to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Returns `true` if a record with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    /// Appends a record and persists the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the record is not
    /// added in that case.
    pub fn push(&mut self, record: T) -> Result<(), StorageError> {
        self.records.push(record);
        if let Err(e) = self.store.save(&self.records) {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Replaces the record with the same id as `record`, keeping its
    /// position, and persists the collection.
    ///
    /// Returns `Ok(false)` without writing if no record has that id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the previous record
    /// is restored in that case.
    pub fn replace(&mut self, record: T) -> Result<bool, StorageError> {
        let Some(index) = self.position(record.id()) else {
            return Ok(false);
        };

        let previous = std::mem::replace(&mut self.records[index], record);
        if let Err(e) = self.store.save(&self.records) {
            self.records[index] = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Removes the record with the given id and persists the collection.
    ///
    /// Returns `Ok(None)` without writing if no record has that id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the record is put
    /// back in its original position in that case.
    pub fn remove(&mut self, id: &str) -> Result<Option<T>, StorageError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let removed = self.records.remove(index);
        if let Err(e) = self.store.save(&self.records) {
            self.records.insert(index, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    /// Removes every record and persists the empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the records are
    /// restored in that case.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let previous = std::mem::take(&mut self.records);
        if let Err(e) = self.store.save(&self.records) {
            self.records = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Discards the in-memory copy and reloads from the store.
    pub fn reload(&mut self) {
        self.records = self.store.load_or_default();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyValueBackend, MemoryBackend};
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        label: String,
    }

    impl StoredRecord for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, label: &str) -> Item {
        Item {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    fn collection(backend: Arc<dyn KeyValueBackend>) -> Collection<Item> {
        Collection::init(RecordStore::new(backend, "items"))
    }

    #[test]
    fn push_is_visible_to_a_fresh_load() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());

        items.push(item("a", "alpha")).unwrap();
        items.push(item("b", "beta")).unwrap();

        let reloaded = collection(backend);
        assert_eq!(reloaded.records(), items.records());
        assert_eq!(reloaded.records()[0].id, "a");
    }

    #[test]
    fn replace_keeps_position() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());
        items.push(item("a", "alpha")).unwrap();
        items.push(item("b", "beta")).unwrap();

        assert!(items.replace(item("a", "ALPHA")).unwrap());
        assert_eq!(collection(backend).records()[0], item("a", "ALPHA"));
    }

    #[test]
    fn replace_unknown_id_is_noop() {
        let backend = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());
        assert!(!items.replace(item("zzz", "none")).unwrap());
        assert!(backend.get("items").unwrap().is_none());
    }

    #[test]
    fn remove_unknown_id_does_not_write() {
        let backend = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());
        items.push(item("a", "alpha")).unwrap();
        let before = backend.get("items").unwrap();

        assert!(items.remove("missing").unwrap().is_none());
        assert_eq!(items.len(), 1);
        assert_eq!(backend.get("items").unwrap(), before);
    }

    #[test]
    fn clear_persists_empty_array() {
        let backend = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());
        items.push(item("a", "alpha")).unwrap();

        items.clear().unwrap();
        assert!(items.is_empty());
        assert_eq!(backend.get("items").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn failed_push_leaves_memory_and_store_unchanged() {
        let backend = Arc::new(MemoryBackend::with_quota(48));
        let mut items = collection(backend.clone());
        items.push(item("a", "x")).unwrap();
        let before = backend.get("items").unwrap();

        let err = items
            .push(item("b", "a label long enough to blow the quota"))
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(items.len(), 1);
        assert_eq!(backend.get("items").unwrap(), before);
    }

    #[test]
    fn resolves_exact_ids_and_unique_prefixes() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut items = collection(backend);
        items.push(item("abc123", "first")).unwrap();
        items.push(item("abd456", "second")).unwrap();
        items.push(item("abc", "exact")).unwrap();

        assert_eq!(items.resolve("abc").unwrap().label, "exact");
        assert_eq!(items.resolve("abd").unwrap().label, "second");
        assert_eq!(
            items.resolve("ab"),
            Err(ResolveError::Ambiguous {
                prefix: "ab".to_string(),
                count: 3,
            })
        );
        assert_eq!(items.resolve("zz"), Err(ResolveError::NotFound("zz".to_string())));
        assert!(items.resolve("  ").is_err());
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut items = collection(backend.clone());
        backend
            .set("items", r#"[{"id":"x","label":"external"}]"#)
            .unwrap();

        items.reload();
        assert_eq!(items.get("x").map(|i| i.label.as_str()), Some("external"));
    }
}
