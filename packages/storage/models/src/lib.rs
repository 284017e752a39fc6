#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for records persisted in the local key-value store.
//!
//! Every persisted collection (polygons, users) is a JSON array of records
//! that carry a string identifier and an ISO-8601 creation timestamp. This
//! crate defines the [`StoredRecord`] trait the generic collection code
//! relies on, plus the [`iso8601`] serde helpers that keep timestamps in
//! the same millisecond-precision `Z` form the stored documents use.

use chrono::{DateTime, SubsecRound as _, Utc};

/// A record that lives in a persisted collection and is addressed by a
/// string identifier.
pub trait StoredRecord {
    /// Returns the record's unique identifier.
    fn id(&self) -> &str;
}

/// Returns the current instant truncated to millisecond precision.
///
/// Stored timestamps only carry milliseconds, so truncating at creation
/// keeps a freshly created record equal to its reloaded copy.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Serde helpers for `DateTime<Utc>` fields stored as ISO-8601 strings
/// with millisecond precision (e.g. `2024-05-01T09:30:00.000Z`).
///
/// Use with `#[serde(with = "polymap_storage_models::iso8601")]`.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize as _, Deserializer, Serializer};

    /// Serializes a timestamp as an RFC 3339 string with milliseconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Parses an RFC 3339 timestamp with any offset and converts it to UTC.
    ///
    /// # Errors
    ///
    /// Returns a deserializer error if the string is not valid RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Timelike as _};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "iso8601")]
        at: DateTime<Utc>,
    }

    #[test]
    fn serializes_with_millis_and_z_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T09:30:00.000Z"}"#);
    }

    #[test]
    fn parses_offset_timestamps_into_utc() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-05-01T14:30:00+05:00"}"#).unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_non_timestamp_strings() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }

    #[test]
    fn now_millis_has_no_sub_millisecond_component() {
        let now = now_millis();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }
}
