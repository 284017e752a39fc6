//! Runtime configuration for the `polymap` binary.
//!
//! Each setting is taken from the first source that provides it:
//! command-line flag, environment variable, TOML config file, built-in
//! default.

use std::path::{Path, PathBuf};

use polymap_i18n::Locale;
use polymap_storage::paths::default_data_dir;
use serde::Deserialize;
use thiserror::Error;

/// Config file read from the working directory when `--config` is not
/// given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "polymap.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "POLYMAP_DATA_DIR";

/// Environment variable overriding the display language.
pub const LOCALE_ENV: &str = "POLYMAP_LOCALE";

/// Errors from resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`FileConfig`].
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// `--locale` named an unsupported language.
    #[error("Unsupported locale '{0}' (expected uz, ru or en)")]
    UnknownLocale(String),
}

/// Settings as written in `polymap.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    /// Directory holding the JSON record files.
    pub data_dir: Option<PathBuf>,
    /// Display language.
    pub locale: Option<Locale>,
}

impl FileConfig {
    /// Parses config file contents.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if `text` is malformed or has unknown keys.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(text)
    }

    /// Loads `path`. When `required` is `false` a missing file yields the
    /// empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        log::debug!("Loaded config file {}", path.display());
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--data-dir`.
    pub data_dir: Option<PathBuf>,
    /// `--locale`.
    pub locale: Option<String>,
    /// `--config`.
    pub config: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the JSON record files.
    pub data_dir: PathBuf,
    /// Display language.
    pub locale: Locale,
}

impl AppConfig {
    /// Resolves configuration from flags, the process environment and the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file is unreadable or
    /// malformed, or `--locale` is unsupported.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let (path, required) = overrides
            .config
            .clone()
            .map_or_else(|| (PathBuf::from(DEFAULT_CONFIG_FILE), false), |p| (p, true));
        let file = FileConfig::load(&path, required)?;

        Self::resolve(overrides, |name| std::env::var(name).ok(), &file)
    }

    /// Merges the sources, highest priority first.
    ///
    /// The locale environment variable is matched loosely (`ru_RU.UTF-8`
    /// selects Russian); `--locale` must name a supported language
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLocale`] for an unsupported
    /// `--locale`.
    pub fn resolve(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        file: &FileConfig,
    ) -> Result<Self, ConfigError> {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()).map(PathBuf::from))
            .or_else(|| file.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        let locale = match &overrides.locale {
            Some(tag) => tag
                .trim()
                .parse::<Locale>()
                .map_err(|_| ConfigError::UnknownLocale(tag.clone()))?,
            None => env(LOCALE_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(|v| Locale::negotiate(&v))
                .or(file.locale)
                .unwrap_or_default(),
        };

        Ok(Self { data_dir, locale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::resolve(&Overrides::default(), no_env, &FileConfig::default()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.locale, Locale::Uz);
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let file = FileConfig::parse("data_dir = \"from-file\"\nlocale = \"en\"\n").unwrap();
        let env = |name: &str| match name {
            DATA_DIR_ENV => Some("from-env".to_string()),
            LOCALE_ENV => Some("ru_RU.UTF-8".to_string()),
            _ => None,
        };

        let config = AppConfig::resolve(&Overrides::default(), env, &file).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-env"));
        assert_eq!(config.locale, Locale::Ru);

        let flags = Overrides {
            data_dir: Some(PathBuf::from("from-flag")),
            locale: Some("EN".to_string()),
            config: None,
        };
        let config = AppConfig::resolve(&flags, env, &file).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-flag"));
        assert_eq!(config.locale, Locale::En);

        let config = AppConfig::resolve(&Overrides::default(), no_env, &file).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-file"));
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn unknown_locale_flag_is_rejected() {
        let flags = Overrides {
            locale: Some("de".to_string()),
            ..Overrides::default()
        };
        let err = AppConfig::resolve(&flags, no_env, &FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLocale(tag) if tag == "de"));
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        assert!(FileConfig::parse("colour = \"blue\"").is_err());
        assert!(FileConfig::parse("locale = \"fr\"").is_err());
    }

    #[test]
    fn missing_optional_file_is_empty_but_required_one_fails() {
        let path = std::env::temp_dir().join("polymap_config_test_missing.toml");
        assert_eq!(FileConfig::load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Read { .. })
        ));
    }
}
