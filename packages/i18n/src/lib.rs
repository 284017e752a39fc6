#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Localization for polymap.
//!
//! Message text lives in per-locale TOML catalogs embedded at compile time
//! (see [`catalog`]). Domain code never holds message text itself: it
//! produces a [`MessageKey`] and resolves it through a [`MessageLookup`],
//! which is implemented by [`Locale`] and by any `Fn(MessageKey) -> String`
//! closure.

pub mod catalog;
pub mod date;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

pub use date::{format_date, format_timestamp_date};

/// A supported display language.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    /// Uzbek (Latin script). Fallback for unknown languages.
    #[default]
    Uz,
    /// Russian.
    Ru,
    /// English.
    En,
}

impl Locale {
    /// Picks the locale for a BCP 47 language tag such as `ru-RU` or
    /// `en_US.UTF-8`, falling back to the default for unknown languages.
    #[must_use]
    pub fn negotiate(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .trim();
        primary.parse().unwrap_or_default()
    }
}

/// Every user-visible message.
///
/// The `snake_case` form of each variant is its key in the locale
/// catalogs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    PolygonDefaultName,
    PolygonTooFewVertices,
    PolygonNonFiniteCoordinate,
    PolygonSaved,
    PolygonDeleted,
    PolygonsCleared,
    PolygonNotFound,
    ConfirmDeletePolygon,
    ConfirmClearPolygons,
    NoPolygons,
    /// Takes `{count}`.
    CurrentPoints,
    /// Takes `{count}`.
    PolygonPoints,
    FirstNameTooShort,
    FirstNameTooLong,
    LastNameTooShort,
    LastNameTooLong,
    BirthdateRequired,
    BirthdateInvalid,
    BirthdateInFuture,
    GenderRequired,
    GenderMale,
    GenderFemale,
    DeleteReasonTooShort,
    ConfirmDeleteUser,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserNotFound,
    NoUsers,
    /// Takes `{error}`.
    StorageWriteFailed,
    FieldFirstName,
    FieldLastName,
    FieldBirthdate,
    FieldGender,
    MenuListPolygons,
    MenuDrawPolygon,
    MenuDeletePolygon,
    MenuClearPolygons,
    MenuExportPolygons,
    MenuListUsers,
    MenuAddUser,
    MenuEditUser,
    MenuDeleteUser,
    MenuQuit,
    PromptPolygonFilter,
    PromptUserSearch,
    PromptPoint,
    PromptPolygonName,
    PromptBirthdate,
    PromptDeleteReason,
    DrawInstructions,
    /// Takes `{input}`.
    PointParseFailed,
    ConfirmKeepDrawing,
    ConfirmRetrySave,
    ConfirmTryAgain,
    SelectPolygon,
    SelectUser,
    Cancel,
}

/// Resolves message keys to display text.
pub trait MessageLookup {
    /// Returns the text for `key`.
    fn message(&self, key: MessageKey) -> String;

    /// Returns the text for `key` with `{name}` placeholders filled in.
    fn message_with(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        fill(&self.message(key), args)
    }
}

impl MessageLookup for Locale {
    fn message(&self, key: MessageKey) -> String {
        catalog::lookup(*self, key).to_string()
    }
}

impl<F> MessageLookup for F
where
    F: Fn(MessageKey) -> String,
{
    fn message(&self, key: MessageKey) -> String {
        self(key)
    }
}

/// Replaces each `{name}` placeholder in `template` with its value.
///
/// Unknown placeholders are left untouched.
#[must_use]
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiates_region_and_encoding_suffixes() {
        assert_eq!(Locale::negotiate("ru-RU"), Locale::Ru);
        assert_eq!(Locale::negotiate("en_US.UTF-8"), Locale::En);
        assert_eq!(Locale::negotiate("UZ"), Locale::Uz);
    }

    #[test]
    fn unknown_languages_fall_back_to_uzbek() {
        assert_eq!(Locale::negotiate("de-DE"), Locale::Uz);
        assert_eq!(Locale::negotiate(""), Locale::Uz);
    }

    #[test]
    fn locale_round_trips_through_strings() {
        assert_eq!(Locale::Ru.to_string(), "ru");
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
    }

    #[test]
    fn message_keys_use_snake_case() {
        assert_eq!(MessageKey::PolygonTooFewVertices.as_ref(), "polygon_too_few_vertices");
    }

    #[test]
    fn closures_act_as_lookups() {
        let lookup = |key: MessageKey| format!("<{key}>");
        assert_eq!(lookup.message(MessageKey::NoUsers), "<no_users>");
    }

    #[test]
    fn fills_placeholders() {
        let text = Locale::En.message_with(MessageKey::CurrentPoints, &[("count", "4")]);
        assert_eq!(text, "Current points: 4");
        assert_eq!(fill("{a} and {b}", &[("a", "1")]), "1 and {b}");
    }
}
