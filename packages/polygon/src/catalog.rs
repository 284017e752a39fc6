//! The persisted collection of finalized polygons.

use std::sync::Arc;

use polymap_polygon_models::{POLYGONS_KEY, Polygon};
use polymap_storage::{Collection, KeyValueBackend, RecordStore, ResolveError, StorageError};

/// Saved polygons in insertion order, mirrored to storage on every
/// mutation.
#[derive(Debug)]
pub struct PolygonCatalog {
    polygons: Collection<Polygon>,
}

impl PolygonCatalog {
    /// Creates the catalog over `store` and loads it once.
    ///
    /// Missing or corrupt stored data yields an empty catalog.
    #[must_use]
    pub fn init(store: RecordStore<Polygon>) -> Self {
        let polygons = Collection::init(store);
        log::debug!("Polygon catalog loaded with {} polygon(s)", polygons.len());
        Self { polygons }
    }

    /// Creates the catalog over the standard [`POLYGONS_KEY`] of `backend`.
    #[must_use]
    pub fn open(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::init(RecordStore::new(backend, POLYGONS_KEY))
    }

    /// Lists polygons whose name contains `name_filter`, ignoring case and
    /// surrounding whitespace.
    ///
    /// A missing or blank filter lists everything. Results keep stored
    /// order.
    #[must_use]
    pub fn list(&self, name_filter: Option<&str>) -> Vec<&Polygon> {
        let needle = name_filter.map(str::trim).unwrap_or_default().to_lowercase();

        if needle.is_empty() {
            return self.polygons.records().iter().collect();
        }

        self.polygons
            .records()
            .iter()
            .filter(|p| p.name_contains(&needle))
            .collect()
    }

    /// All polygons in stored order.
    #[must_use]
    pub fn all(&self) -> &[Polygon] {
        self.polygons.records()
    }

    /// Returns the polygon with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    /// Finds a polygon by full id or unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if nothing or more than one polygon
    /// matches.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&Polygon, ResolveError> {
        self.polygons.resolve(id_or_prefix)
    }

    /// Number of saved polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if no polygons are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Appends a polygon and persists the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the catalog is
    /// unchanged in that case.
    pub fn add(&mut self, polygon: Polygon) -> Result<(), StorageError> {
        let id = polygon.id.clone();
        self.polygons.push(polygon)?;
        log::info!("Saved polygon {id} ({} total)", self.polygons.len());
        Ok(())
    }

    /// Deletes the polygon with the given id and persists the catalog.
    ///
    /// Deleting an unknown id is a no-op that returns `Ok(false)` and does
    /// not touch storage. Callers are expected to confirm with the user
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the polygon is kept
    /// in that case.
    pub fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let removed = self.polygons.remove(id)?;
        if let Some(polygon) = &removed {
            log::info!("Deleted polygon {} '{}'", polygon.id, polygon.name);
        } else {
            log::debug!("Delete ignored, no polygon with id {id}");
        }
        Ok(removed.is_some())
    }

    /// Deletes every polygon and persists the empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting fails; the polygons are kept
    /// in that case.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let count = self.polygons.len();
        self.polygons.clear()?;
        log::info!("Cleared {count} polygon(s)");
        Ok(())
    }

    /// Generates an identifier not used by any saved polygon.
    pub(crate) fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !self.polygons.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};
    use polymap_polygon_models::Point;
    use polymap_storage::MemoryBackend;

    fn polygon(id: &str, name: &str) -> Polygon {
        Polygon {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            points: vec![
                Point::new(41.31, 69.27),
                Point::new(41.32, 69.28),
                Point::new(41.30, 69.29),
            ],
        }
    }

    fn seeded(backend: Arc<dyn KeyValueBackend>) -> PolygonCatalog {
        let mut catalog = PolygonCatalog::open(backend);
        catalog.add(polygon("1", "Delivery Zone North")).unwrap();
        catalog.add(polygon("2", "Warehouse")).unwrap();
        catalog.add(polygon("3", "zone south")).unwrap();
        catalog
    }

    fn ids(polygons: &[&Polygon]) -> Vec<String> {
        polygons.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let catalog = seeded(Arc::new(MemoryBackend::new()));
        assert_eq!(ids(&catalog.list(Some("zone"))), ["1", "3"]);
        assert_eq!(ids(&catalog.list(Some("ZONE"))), ["1", "3"]);
        assert_eq!(ids(&catalog.list(Some("  house "))), ["2"]);
        assert!(catalog.list(Some("garage")).is_empty());
    }

    #[test]
    fn blank_or_missing_filter_lists_all_in_stored_order() {
        let catalog = seeded(Arc::new(MemoryBackend::new()));
        assert_eq!(ids(&catalog.list(None)), ["1", "2", "3"]);
        assert_eq!(ids(&catalog.list(Some(""))), ["1", "2", "3"]);
        assert_eq!(ids(&catalog.list(Some("   "))), ["1", "2", "3"]);
    }

    #[test]
    fn list_is_a_pure_read() {
        let catalog = seeded(Arc::new(MemoryBackend::new()));
        let first = ids(&catalog.list(Some("zone")));
        let second = ids(&catalog.list(Some("zone")));
        assert_eq!(first, second);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn add_is_immediately_persisted() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut catalog = PolygonCatalog::open(backend.clone());
        catalog.add(polygon("a", "Fresh")).unwrap();

        let reloaded = PolygonCatalog::open(backend);
        assert_eq!(reloaded.all(), catalog.all());
    }

    #[test]
    fn delete_removes_and_persists() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut catalog = seeded(backend.clone());

        assert!(catalog.delete("2").unwrap());
        assert_eq!(ids(&catalog.list(None)), ["1", "3"]);
        assert_eq!(ids(&PolygonCatalog::open(backend).list(None)), ["1", "3"]);
    }

    #[test]
    fn delete_unknown_id_changes_nothing() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut catalog = seeded(backend.clone());
        let stored_before = backend.get(POLYGONS_KEY).unwrap();

        assert!(!catalog.delete("missing").unwrap());
        assert_eq!(catalog.len(), 3);
        assert_eq!(backend.get(POLYGONS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn clear_persists_empty_catalog() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut catalog = seeded(backend.clone());

        catalog.clear().unwrap();
        assert!(catalog.is_empty());
        assert!(PolygonCatalog::open(backend).is_empty());
    }

    #[test]
    fn corrupt_storage_opens_empty() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        backend.set(POLYGONS_KEY, "{not json").unwrap();
        assert!(PolygonCatalog::open(backend.clone()).is_empty());

        let kept = polymap_storage::paths::corrupt_key(POLYGONS_KEY);
        assert_eq!(backend.get(&kept).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn resolves_by_id_prefix() {
        let mut catalog = PolygonCatalog::open(Arc::new(MemoryBackend::new()));
        catalog.add(polygon("7f3a-1", "A")).unwrap();
        catalog.add(polygon("8b20-2", "B")).unwrap();
        assert_eq!(catalog.resolve("8b").unwrap().name, "B");
        assert!(catalog.resolve("99").is_err());
    }

    #[test]
    fn fresh_ids_are_uuids() {
        let catalog = PolygonCatalog::open(Arc::new(MemoryBackend::new()));
        let id = catalog.fresh_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn full_precision_coordinates_reload_exactly() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let mut catalog = PolygonCatalog::open(backend.clone());

        let mut shape = polygon("precise", "Precise");
        shape.points = vec![
            Point::new(21.877_423_353_265_442, -114.359_322_767_211_35),
            Point::new(-0.1 - 0.2, 179.999_999_999_999_97),
            Point::new(f64::MIN_POSITIVE, -89.999_999_999_999_99),
        ];
        catalog.add(shape).unwrap();

        for i in 1..200_u32 {
            let t = f64::from(i).sqrt();
            let mut p = polygon(&format!("p{i}"), "Swept");
            p.points = vec![
                Point::new((t * 37.137_281_093).sin() * 90.0, (t * 11.719_331).cos() * 180.0),
                Point::new(t.ln() * 17.3, -t * std::f64::consts::PI),
                Point::new(1.0 / t, t.exp().recip() * 100.0),
            ];
            catalog.add(p).unwrap();
        }

        let reloaded = PolygonCatalog::open(backend);
        assert_eq!(reloaded.all(), catalog.all());
    }
}
