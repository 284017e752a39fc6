//! Compile-time registry of locale message catalogs.
//!
//! Each entry is a `(locale, toml_content)` pair embedded via
//! `include_str!`. Adding a language requires a TOML file in `locales/`,
//! a [`Locale`] variant and an entry here.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::{Locale, MessageKey};

/// Embedded TOML catalogs.
const LOCALE_TOMLS: &[(Locale, &str)] = &[
    (Locale::Uz, include_str!("../locales/uz.toml")),
    (Locale::Ru, include_str!("../locales/ru.toml")),
    (Locale::En, include_str!("../locales/en.toml")),
];

type Catalog = BTreeMap<String, String>;

static CATALOGS: LazyLock<BTreeMap<Locale, Catalog>> = LazyLock::new(|| {
    LOCALE_TOMLS
        .iter()
        .map(|(locale, toml_str)| {
            let catalog: Catalog = toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse locale catalog '{locale}': {e}"));
            (*locale, catalog)
        })
        .collect()
});

/// Returns the text for `key` in `locale`.
///
/// Falls back to the default locale, then to the key name itself, logging
/// a warning for each miss.
///
/// # Panics
///
/// Panics on first use if any embedded TOML file fails to parse. Since
/// these are compile-time constants, parse failures indicate a development
/// error and are caught by the tests below.
#[must_use]
pub fn lookup(locale: Locale, key: MessageKey) -> &'static str {
    if let Some(text) = get(locale, key) {
        return text;
    }

    log::warn!("Missing message '{key}' for locale '{locale}'");

    if locale != Locale::default() {
        if let Some(text) = get(Locale::default(), key) {
            return text;
        }
    }

    key.into()
}

fn get(locale: Locale, key: MessageKey) -> Option<&'static str> {
    let name: &'static str = key.into();
    CATALOGS
        .get(&locale)
        .and_then(|catalog| catalog.get(name))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn every_locale_has_a_catalog() {
        for locale in Locale::iter() {
            assert!(CATALOGS.contains_key(&locale), "No catalog for {locale}");
        }
    }

    #[test]
    fn every_key_resolves_in_every_locale() {
        for locale in Locale::iter() {
            for key in MessageKey::iter() {
                let text = get(locale, key);
                assert!(
                    text.is_some_and(|t| !t.is_empty()),
                    "Locale {locale} is missing message '{key}'"
                );
            }
        }
    }

    #[test]
    fn catalogs_have_no_unknown_keys() {
        for (locale, catalog) in CATALOGS.iter() {
            for name in catalog.keys() {
                assert!(
                    name.parse::<MessageKey>().is_ok(),
                    "Locale {locale} defines unknown message '{name}'"
                );
            }
        }
    }

    #[test]
    fn russian_default_polygon_name() {
        assert_eq!(lookup(Locale::Ru, MessageKey::PolygonDefaultName), "Новый полигон");
    }
}
