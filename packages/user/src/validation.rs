//! Form validation for user records.
//!
//! Rules and wording are kept apart: [`UserSchema::validate`] returns
//! [`FieldViolation`] values describing *what* is wrong, and
//! [`ValidationErrors::localized`] turns them into text through whichever
//! [`MessageLookup`] the caller supplies. Switching language therefore
//! never requires rebuilding the schema.

use chrono::NaiveDate;
use polymap_i18n::{MessageKey, MessageLookup};
use polymap_user_models::{Gender, UserForm};
use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;

/// Minimum length of first and last names, in characters.
pub const NAME_MIN_CHARS: usize = 2;

/// Maximum length of first and last names, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Minimum length of the reason given when deleting a user.
pub const REASON_MIN_CHARS: usize = 5;

/// Date format accepted for birthdates.
pub const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// A field of the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum UserField {
    FirstName,
    LastName,
    Birthdate,
    Gender,
}

impl UserField {
    /// Key of the field's display label.
    #[must_use]
    pub const fn label_key(self) -> MessageKey {
        match self {
            Self::FirstName => MessageKey::FieldFirstName,
            Self::LastName => MessageKey::FieldLastName,
            Self::Birthdate => MessageKey::FieldBirthdate,
            Self::Gender => MessageKey::FieldGender,
        }
    }

    /// Localized display label.
    #[must_use]
    pub fn label(self, messages: &impl MessageLookup) -> String {
        messages.message(self.label_key())
    }
}

/// What is wrong with a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// Fewer than `min` characters.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum allowed.
        min: usize,
    },
    /// More than `max` characters.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed.
        max: usize,
    },
    /// Empty where a value is mandatory.
    #[error("is required")]
    Required,
    /// Not a valid `YYYY-MM-DD` date.
    #[error("is not a valid YYYY-MM-DD date")]
    InvalidDate,
    /// A date after today.
    #[error("cannot be in the future")]
    InFuture,
    /// Not one of the allowed options.
    #[error("is not an allowed option")]
    InvalidChoice,
}

/// A violation attached to the field it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    /// Offending field.
    pub field: UserField,
    /// What is wrong with it.
    pub violation: Violation,
}

impl FieldViolation {
    /// Returns the message shown under the field.
    #[must_use]
    pub const fn message_key(&self) -> MessageKey {
        match (self.field, self.violation) {
            (UserField::FirstName, Violation::TooLong { .. }) => MessageKey::FirstNameTooLong,
            (UserField::FirstName, _) => MessageKey::FirstNameTooShort,
            (UserField::LastName, Violation::TooLong { .. }) => MessageKey::LastNameTooLong,
            (UserField::LastName, _) => MessageKey::LastNameTooShort,
            (UserField::Birthdate, Violation::Required) => MessageKey::BirthdateRequired,
            (UserField::Birthdate, Violation::InFuture) => MessageKey::BirthdateInFuture,
            (UserField::Birthdate, _) => MessageKey::BirthdateInvalid,
            (UserField::Gender, _) => MessageKey::GenderRequired,
        }
    }
}

/// All violations found in one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", describe(.0))]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// The individual violations.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Returns `true` if there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The violation for `field`, if any.
    #[must_use]
    pub fn get(&self, field: UserField) -> Option<&FieldViolation> {
        self.0.iter().find(|v| v.field == field)
    }

    /// Localized message for `field`, if it has a violation.
    #[must_use]
    pub fn message_for(&self, field: UserField, messages: &impl MessageLookup) -> Option<String> {
        self.get(field).map(|v| messages.message(v.message_key()))
    }

    /// Every violation as `(field, localized message)`.
    #[must_use]
    pub fn localized(&self, messages: &impl MessageLookup) -> Vec<(UserField, String)> {
        self.0
            .iter()
            .map(|v| (v.field, messages.message(v.message_key())))
            .collect()
    }

    /// Every violation as `"{field label}: {message}"`, both localized.
    #[must_use]
    pub fn localized_lines(&self, messages: &impl MessageLookup) -> Vec<String> {
        self.localized(messages)
            .into_iter()
            .map(|(field, text)| format!("{}: {text}", field.label(messages)))
            .collect()
    }

    fn push(&mut self, field: UserField, violation: Violation) {
        self.0.push(FieldViolation { field, violation });
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.violation))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Typed values from a form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    /// Trimmed given name.
    pub first_name: String,
    /// Trimmed family name.
    pub last_name: String,
    /// Date of birth, not after the validation date.
    pub birthdate: NaiveDate,
    /// Gender.
    pub gender: Gender,
}

/// Validation rules for the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSchema {
    /// Minimum name length in characters.
    pub name_min: usize,
    /// Maximum name length in characters.
    pub name_max: usize,
}

impl Default for UserSchema {
    fn default() -> Self {
        Self {
            name_min: NAME_MIN_CHARS,
            name_max: NAME_MAX_CHARS,
        }
    }
}

impl UserSchema {
    /// Checks every field of `form` and returns typed values, or all the
    /// violations found.
    ///
    /// Names are trimmed before their length is checked. `today` is the
    /// latest acceptable birthdate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each invalid field.
    pub fn validate(&self, form: &UserForm, today: NaiveDate) -> Result<ValidatedUser, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let first_name = self.check_name(UserField::FirstName, &form.first_name, &mut errors);
        let last_name = self.check_name(UserField::LastName, &form.last_name, &mut errors);
        let birthdate = check_birthdate(&form.birthdate, today, &mut errors);
        let gender = check_gender(&form.gender, &mut errors);

        match (birthdate, gender) {
            (Some(birthdate), Some(gender)) if errors.is_empty() => Ok(ValidatedUser {
                first_name,
                last_name,
                birthdate,
                gender,
            }),
            _ => Err(errors),
        }
    }

    fn check_name(&self, field: UserField, raw: &str, errors: &mut ValidationErrors) -> String {
        let value = raw.trim();
        let len = value.chars().count();

        if len < self.name_min {
            errors.push(field, Violation::TooShort { min: self.name_min });
        } else if len > self.name_max {
            errors.push(field, Violation::TooLong { max: self.name_max });
        }

        value.to_string()
    }
}

fn check_birthdate(raw: &str, today: NaiveDate, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let value = raw.trim();

    if value.is_empty() {
        errors.push(UserField::Birthdate, Violation::Required);
        return None;
    }

    let Ok(date) = NaiveDate::parse_from_str(value, BIRTHDATE_FORMAT) else {
        errors.push(UserField::Birthdate, Violation::InvalidDate);
        return None;
    };

    if date > today {
        errors.push(UserField::Birthdate, Violation::InFuture);
        return None;
    }

    Some(date)
}

fn check_gender(raw: &str, errors: &mut ValidationErrors) -> Option<Gender> {
    let parsed = raw.trim().parse::<Gender>().ok();
    if parsed.is_none() {
        errors.push(UserField::Gender, Violation::InvalidChoice);
    }
    parsed
}

/// Checks the free-text reason required to delete a user and returns it
/// trimmed.
///
/// # Errors
///
/// Returns [`Violation::TooShort`] if the trimmed reason has fewer than
/// [`REASON_MIN_CHARS`] characters.
pub fn check_delete_reason(reason: &str) -> Result<&str, Violation> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < REASON_MIN_CHARS {
        return Err(Violation::TooShort {
            min: REASON_MIN_CHARS,
        });
    }
    Ok(trimmed)
}
