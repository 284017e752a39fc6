//! `GeoJSON` export of saved polygons.
//!
//! Stored polygons keep an open ring in `lat`/`lng` order; `GeoJSON`
//! wants a closed ring of `[lng, lat]` positions. Conversion goes through
//! [`geo::Polygon`], which closes the ring, and the `geojson` crate's
//! `geo-types` conversions.

use chrono::SecondsFormat;
use geo::{Centroid as _, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use polymap_polygon_models::Polygon;
use serde_json::json;

/// Converts a saved polygon to a [`geo::Polygon`] with `x = lng`,
/// `y = lat`.
#[must_use]
pub fn to_geo(polygon: &Polygon) -> geo::Polygon<f64> {
    let exterior: LineString<f64> = polygon
        .points
        .iter()
        .map(|p| (p.lng, p.lat))
        .collect::<Vec<_>>()
        .into();
    geo::Polygon::new(exterior, vec![])
}

/// Converts a saved polygon to a `GeoJSON` feature.
///
/// The feature id is the polygon id. Properties carry the name, creation
/// time, vertex count and centroid (`[lng, lat]`, omitted for degenerate
/// shapes).
#[must_use]
pub fn to_feature(polygon: &Polygon) -> Feature {
    let shape = to_geo(polygon);

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(polygon.name));
    properties.insert(
        "createdAt".to_string(),
        json!(polygon.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    properties.insert("vertexCount".to_string(), json!(polygon.vertex_count()));
    if let Some(centroid) = shape.centroid() {
        properties.insert("centroid".to_string(), json!([centroid.x(), centroid.y()]));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&shape))),
        id: Some(Id::String(polygon.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Renders polygons as a `GeoJSON` `FeatureCollection`, preserving order.
#[must_use]
pub fn feature_collection<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: polygons.into_iter().map(to_feature).collect(),
        foreign_members: None,
    }
}
