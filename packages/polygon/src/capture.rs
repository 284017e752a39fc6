//! The in-progress polygon.
//!
//! ```text
//! Empty --add_point--> Drawing --finalize (>= 3 points)--> (cleared, polygon committed)
//!                      Drawing --reset--> Empty
//!                      Drawing --finalize (< 3 points)--> Drawing (rejected)
//! ```

use chrono::{DateTime, Utc};
use polymap_i18n::{MessageKey, MessageLookup};
use polymap_polygon_models::{MIN_VERTICES, Point, Polygon};
use polymap_storage_models::now_millis;

use crate::{PolygonCatalog, PolygonError, ValidationError};

/// Where a capture session is in the drawing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No points yet.
    Empty,
    /// At least one point has been placed.
    Drawing,
}

/// Vertices accumulated for the polygon currently being drawn, plus the
/// name typed so far.
///
/// Nothing here is persisted until [`CaptureSession::finalize`] succeeds.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    points: Vec<Point>,
    pending_name: String,
}

impl CaptureSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Points placed so far, in drawing order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points placed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        if self.points.is_empty() {
            CaptureState::Empty
        } else {
            CaptureState::Drawing
        }
    }

    /// Returns `true` if enough points exist to finalize.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        self.points.len() >= MIN_VERTICES
    }

    /// The outline to draw while the user is still placing points.
    ///
    /// Available once at least two points exist.
    #[must_use]
    pub fn preview(&self) -> Option<&[Point]> {
        (self.points.len() >= 2).then_some(self.points.as_slice())
    }

    /// Appends a vertex and returns the new point count.
    ///
    /// Coincident points are kept; there is no upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteCoordinate`] if either
    /// coordinate is NaN or infinite. The session is unchanged.
    pub fn add_point(&mut self, point: Point) -> Result<usize, ValidationError> {
        if !point.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate {
                lat: point.lat,
                lng: point.lng,
            });
        }

        self.points.push(point);
        Ok(self.points.len())
    }

    /// Discards all placed points. The pending name is kept.
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// The name typed so far.
    #[must_use]
    pub fn pending_name(&self) -> &str {
        &self.pending_name
    }

    /// Replaces the pending name.
    pub fn set_pending_name(&mut self, name: impl Into<String>) {
        self.pending_name = name.into();
    }

    /// Turns the placed points into a polygon named `name` and commits it
    /// to `catalog`.
    ///
    /// A blank `name` falls back to the localized default. On success the
    /// polygon has been appended and persisted, and the session's points
    /// and pending name are cleared.
    ///
    /// # Errors
    ///
    /// * [`PolygonError::Validation`] if fewer than [`MIN_VERTICES`]
    ///   points have been placed.
    /// * [`PolygonError::Storage`] if the catalog could not be persisted.
    ///
    /// In both cases neither the session nor the catalog changes.
    pub fn finalize(
        &mut self,
        catalog: &mut PolygonCatalog,
        name: &str,
        messages: &impl MessageLookup,
    ) -> Result<Polygon, PolygonError> {
        self.finalize_at(catalog, name, messages, now_millis())
    }

    /// [`CaptureSession::finalize`] using the pending name.
    ///
    /// # Errors
    ///
    /// See [`CaptureSession::finalize`].
    pub fn finalize_pending(
        &mut self,
        catalog: &mut PolygonCatalog,
        messages: &impl MessageLookup,
    ) -> Result<Polygon, PolygonError> {
        let name = self.pending_name.clone();
        self.finalize(catalog, &name, messages)
    }

    fn finalize_at(
        &mut self,
        catalog: &mut PolygonCatalog,
        name: &str,
        messages: &impl MessageLookup,
        created_at: DateTime<Utc>,
    ) -> Result<Polygon, PolygonError> {
        if !self.can_finalize() {
            return Err(ValidationError::TooFewVertices {
                count: self.points.len(),
                min: MIN_VERTICES,
            }
            .into());
        }

        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            messages.message(MessageKey::PolygonDefaultName)
        } else {
            trimmed.to_string()
        };

        let polygon = Polygon {
            id: catalog.fresh_id(),
            name,
            created_at,
            points: self.points.clone(),
        };

        catalog.add(polygon.clone())?;

        self.points.clear();
        self.pending_name.clear();

        Ok(polygon)
    }
}
