//! Canonical file paths for the on-disk data directory.
//!
//! The file backend stores each key as `<data_dir>/<key>.json`.

use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Returns the default `data/` directory path.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Returns the file that holds the value stored under `key`.
#[must_use]
pub fn key_path(data_dir: &Path, key: &str) -> PathBuf {
    data_dir.join(format!("{key}.json"))
}

/// Key under which an unreadable value for `key` is kept.
#[must_use]
pub fn corrupt_key(key: &str) -> String {
    format!("{key}.corrupt")
}

/// File that keeps a copy of an unreadable `<key>.json`.
#[must_use]
pub fn corrupt_path(data_dir: &Path, key: &str) -> PathBuf {
    data_dir.join(format!("{key}.json.corrupt"))
}

/// Returns `true` if `key` can be used as a file stem.
///
/// Keys are restricted to ASCII alphanumerics, `_`, `-` and `.` and may
/// not start with a dot.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_path_appends_json_extension() {
        let path = key_path(Path::new("data"), "app_polygons_v1");
        assert_eq!(path, PathBuf::from("data/app_polygons_v1.json"));
    }

    #[test]
    fn corrupt_copies_sit_beside_the_original() {
        assert_eq!(corrupt_key("app_users"), "app_users.corrupt");
        assert!(is_valid_key(&corrupt_key("app_users")));
        assert_eq!(
            corrupt_path(Path::new("data"), "app_users"),
            PathBuf::from("data/app_users.json.corrupt")
        );
    }

    #[test]
    fn accepts_storage_keys() {
        assert!(is_valid_key("app_users"));
        assert!(is_valid_key("app_polygons_v1"));
        assert!(is_valid_key("backup-2024.01"));
    }

    #[test]
    fn rejects_path_like_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../secrets"));
        assert!(!is_valid_key("nested/key"));
        assert!(!is_valid_key(".hidden"));
    }
}
