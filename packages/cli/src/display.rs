//! Text input parsing and table rows for the terminal.

use polymap_i18n::{Locale, MessageKey, MessageLookup, format_date, format_timestamp_date};
use polymap_polygon::{Point, Polygon};
use polymap_user::{Gender, User};
use thiserror::Error;

/// A vertex typed as text could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected a point as 'lat,lng', got '{0}'")]
pub struct PointParseError(pub String);

impl PointParseError {
    /// Renders the error in the user's language.
    #[must_use]
    pub fn localized(&self, messages: &impl MessageLookup) -> String {
        messages.message_with(MessageKey::PointParseFailed, &[("input", &self.0)])
    }
}

/// Parses `"lat,lng"` (spaces allowed around either number).
///
/// # Errors
///
/// Returns [`PointParseError`] unless the text is exactly two numbers
/// separated by a comma.
pub fn parse_point(text: &str) -> Result<Point, PointParseError> {
    let err = || PointParseError(text.to_string());

    let (lat, lng) = text.split_once(',').ok_or_else(err)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| err())?;
    let lng = lng.trim().parse::<f64>().map_err(|_| err())?;
    Ok(Point::new(lat, lng))
}

/// Shortens an id to its first block for display.
#[must_use]
pub fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// Cuts `text` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// One line of the polygon table: id, name, vertex count, creation date.
#[must_use]
pub fn polygon_row(polygon: &Polygon, locale: Locale) -> String {
    let points = locale.message_with(
        MessageKey::PolygonPoints,
        &[("count", &polygon.vertex_count().to_string())],
    );
    format!(
        "{:<10} {:<32} {:<12} {}",
        short_id(&polygon.id),
        truncate(&polygon.name, 32),
        points,
        format_timestamp_date(locale, polygon.created_at)
    )
}

/// Localized label for a gender.
#[must_use]
pub fn gender_label(gender: Gender, locale: Locale) -> String {
    locale.message(match gender {
        Gender::Male => MessageKey::GenderMale,
        Gender::Female => MessageKey::GenderFemale,
    })
}

/// One line of the user table: id, full name, birthdate, gender.
#[must_use]
pub fn user_row(user: &User, locale: Locale) -> String {
    format!(
        "{:<10} {:<40} {:<12} {}",
        short_id(&user.id),
        truncate(&user.full_name(), 40),
        format_date(locale, user.birthdate),
        gender_label(user.gender, locale)
    )
}
