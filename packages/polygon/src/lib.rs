#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon drawing and persistence.
//!
//! A [`CaptureSession`] accumulates clicked vertices for the polygon being
//! drawn. Finalizing it turns the vertices into a named [`Polygon`] that is
//! appended to the [`PolygonCatalog`] and written to storage in the same
//! call. The catalog is the single source of truth for saved polygons and
//! can be exported as `GeoJSON` via [`export`].

pub mod capture;
pub mod catalog;
pub mod export;

pub use capture::{CaptureSession, CaptureState};
pub use catalog::PolygonCatalog;
pub use polymap_polygon_models::{MIN_VERTICES, POLYGONS_KEY, Point, Polygon};

use polymap_i18n::{MessageKey, MessageLookup};
use polymap_storage::{ResolveError, StorageError};
use thiserror::Error;

/// Input rejected before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    /// Finalize was attempted with fewer than [`MIN_VERTICES`] points.
    #[error("A polygon needs at least {min} vertices, got {count}")]
    TooFewVertices {
        /// Points accumulated so far.
        count: usize,
        /// Required minimum.
        min: usize,
    },

    /// A vertex had a NaN or infinite coordinate.
    #[error("Coordinate is not finite: ({lat}, {lng})")]
    NonFiniteCoordinate {
        /// Latitude as given.
        lat: f64,
        /// Longitude as given.
        lng: f64,
    },
}

impl ValidationError {
    /// Returns the message shown to the user for this error.
    #[must_use]
    pub const fn message_key(&self) -> MessageKey {
        match self {
            Self::TooFewVertices { .. } => MessageKey::PolygonTooFewVertices,
            Self::NonFiniteCoordinate { .. } => MessageKey::PolygonNonFiniteCoordinate,
        }
    }
}

/// Errors that can occur during polygon operations.
#[derive(Debug, Error)]
pub enum PolygonError {
    /// The operation was rejected by validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisting the catalog failed. Nothing was changed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No polygon matched the given id.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl PolygonError {
    /// Renders the error as a localized, user-facing message.
    #[must_use]
    pub fn localized(&self, messages: &impl MessageLookup) -> String {
        match self {
            Self::Validation(e) => messages.message(e.message_key()),
            Self::Storage(e) => {
                messages.message_with(MessageKey::StorageWriteFailed, &[("error", &e.to_string())])
            }
            Self::Resolve(_) => messages.message(MessageKey::PolygonNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polymap_i18n::Locale;

    #[test]
    fn too_few_vertices_localizes() {
        let err = PolygonError::from(ValidationError::TooFewVertices { count: 2, min: 3 });
        assert_eq!(err.localized(&Locale::Ru), "Для полигона нужно минимум 3 точки");
        assert_eq!(err.to_string(), "A polygon needs at least 3 vertices, got 2");
    }

    #[test]
    fn storage_errors_carry_the_cause() {
        let err = PolygonError::from(StorageError::QuotaExceeded {
            key: POLYGONS_KEY.to_string(),
            needed: 10,
            available: 5,
        });
        let text = err.localized(&Locale::En);
        assert!(text.starts_with("Could not save data: "));
        assert!(text.contains("quota"));
    }
}
