#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point and polygon record types.
//!
//! These are the shapes persisted under [`POLYGONS_KEY`]:
//!
//! ```json
//! [{ "id": "…", "name": "…", "createdAt": "2024-05-01T09:30:00.000Z",
//!    "points": [{ "lat": 41.31, "lng": 69.27 }, …] }]
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use polymap_storage_models::{StoredRecord, iso8601};
use serde::{Deserialize, Serialize};

/// Storage key for the polygon catalog.
pub const POLYGONS_KEY: &str = "app_polygons_v1";

/// Minimum number of vertices a finalized polygon must have.
pub const MIN_VERTICES: usize = 3;

/// A map coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Point {
    /// Creates a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// A finalized, named polygon.
///
/// Points are kept in drawing order. The ring is not closed: the last
/// point is not a repeat of the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Display name.
    pub name: String,
    /// When the polygon was finalized.
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    /// Vertices in drawing order.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the name contains `needle_lower`, which must
    /// already be lowercase.
    #[must_use]
    pub fn name_contains(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

impl StoredRecord for Polygon {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn sample() -> Polygon {
        Polygon {
            id: "9b2c".to_string(),
            name: "Delivery zone".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            points: vec![
                Point::new(41.31, 69.27),
                Point::new(41.32, 69.28),
                Point::new(41.30, 69.29),
            ],
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T09:30:00.000Z");
        assert_eq!(json["points"][0]["lat"], 41.31);
        assert_eq!(json["points"][0]["lng"], 69.27);
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn reads_documents_written_by_the_browser_app() {
        let raw = r#"{
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "name": "Зона доставки",
            "createdAt": "2024-05-01T09:30:00.123Z",
            "points": [{"lat": 41.3, "lng": 69.2}, {"lat": 41.4, "lng": 69.3}, {"lat": 41.5, "lng": 69.1}]
        }"#;
        let polygon: Polygon = serde_json::from_str(raw).unwrap();
        assert_eq!(polygon.vertex_count(), 3);
        assert_eq!(polygon.points[2], Point::new(41.5, 69.1));
    }

    #[test]
    fn name_match_is_case_insensitive_for_cyrillic() {
        let mut polygon = sample();
        polygon.name = "Зона Доставки".to_string();
        assert!(polygon.name_contains("доставки"));
        assert!(!polygon.name_contains("склад"));
    }

    #[test]
    fn detects_non_finite_points() {
        assert!(Point::new(41.0, 69.0).is_finite());
        assert!(!Point::new(f64::NAN, 69.0).is_finite());
        assert!(!Point::new(41.0, f64::INFINITY).is_finite());
    }
}
