#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! User directory.
//!
//! A flat, persisted list of [`User`] records with create, update, delete
//! and name search. Form input is checked by [`validation::UserSchema`]
//! before anything is written; the schema reports violations as data and
//! leaves wording to a [`polymap_i18n::MessageLookup`].

pub mod directory;
pub mod validation;

pub use directory::UserDirectory;
pub use polymap_user_models::{Gender, USERS_KEY, User, UserForm};
pub use validation::{
    FieldViolation, UserField, UserSchema, ValidatedUser, ValidationErrors, Violation, check_delete_reason,
};

use polymap_i18n::{MessageKey, MessageLookup};
use polymap_storage::{ResolveError, StorageError};
use thiserror::Error;

/// Errors that can occur during user directory operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Form input failed validation. Nothing was changed.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The deletion reason was too short. Nothing was changed.
    #[error("Deletion reason must be at least {min} characters")]
    ReasonTooShort {
        /// Required minimum length.
        min: usize,
    },

    /// No user has the given id.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Id lookup failed (unknown or ambiguous prefix).
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Persisting the directory failed. Nothing was changed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl UserError {
    /// Renders the error as localized, user-facing lines (one per field
    /// violation for validation errors).
    #[must_use]
    pub fn localized(&self, messages: &impl MessageLookup) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.localized_lines(messages),
            Self::ReasonTooShort { .. } => vec![messages.message(MessageKey::DeleteReasonTooShort)],
            Self::NotFound(_) | Self::Resolve(_) => vec![messages.message(MessageKey::UserNotFound)],
            Self::Storage(e) => vec![messages.message_with(
                MessageKey::StorageWriteFailed,
                &[("error", &e.to_string())],
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polymap_i18n::Locale;

    #[test]
    fn reason_too_short_localizes() {
        let err = UserError::ReasonTooShort { min: 5 };
        assert_eq!(
            err.localized(&Locale::Ru),
            ["Пожалуйста, укажите причину (минимум 5 символов)"]
        );
    }

    #[test]
    fn validation_errors_localize_field_names() {
        let form = UserForm {
            first_name: "A".to_string(),
            last_name: "Karimov".to_string(),
            birthdate: "1990-03-08".to_string(),
            gender: "male".to_string(),
        };
        let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let err = UserError::from(UserSchema::default().validate(&form, today).unwrap_err());

        let lines = err.localized(&Locale::Ru);
        assert_eq!(lines, ["Имя: Минимум 2 символа"]);
        assert!(!lines[0].contains("firstName"));
    }

    #[test]
    fn not_found_localizes() {
        let err = UserError::NotFound("x".to_string());
        assert_eq!(err.localized(&Locale::En), ["User not found"]);
    }
}
