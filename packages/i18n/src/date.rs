//! Locale-aware date display.

use chrono::{DateTime, NaiveDate, Utc};

use crate::Locale;

/// Formats a calendar date the way the locale writes short dates.
///
/// Uzbek and Russian use `dd.mm.yyyy`; English uses `m/d/yyyy`.
#[must_use]
pub fn format_date(locale: Locale, date: NaiveDate) -> String {
    let pattern = match locale {
        Locale::Uz | Locale::Ru => "%d.%m.%Y",
        Locale::En => "%-m/%-d/%Y",
    };
    date.format(pattern).to_string()
}

/// Formats the calendar date of a UTC timestamp.
#[must_use]
pub fn format_timestamp_date(locale: Locale, timestamp: DateTime<Utc>) -> String {
    format_date(locale, timestamp.date_naive())
}
