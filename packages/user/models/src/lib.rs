#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! User record types.
//!
//! [`User`] is the persisted shape stored under [`USERS_KEY`]. [`UserForm`]
//! holds raw, unvalidated input as typed into the create/edit form.

use chrono::{DateTime, NaiveDate, Utc};
use polymap_storage_models::{StoredRecord, iso8601};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Storage key for the user directory.
pub const USERS_KEY: &str = "app_users";

/// Gender as stored in the user record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth, stored as `YYYY-MM-DD`.
    pub birthdate: NaiveDate,
    /// Gender.
    pub gender: Gender,
    /// When the record was created.
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// `"{last_name} {first_name}"`, the form searched by the user list.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

impl StoredRecord for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Raw form input for creating or editing a user.
///
/// Every field is free text; validation turns it into typed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    /// Given name as typed.
    pub first_name: String,
    /// Family name as typed.
    pub last_name: String,
    /// Date of birth as typed, expected `YYYY-MM-DD`.
    pub birthdate: String,
    /// `"male"` or `"female"`.
    pub gender: String,
}

impl UserForm {
    /// A blank form with the default gender preselected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            gender: Gender::Male.to_string(),
            ..Self::default()
        }
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birthdate: user.birthdate.format("%Y-%m-%d").to_string(),
            gender: user.gender.to_string(),
        }
    }
}
