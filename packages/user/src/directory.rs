//! The persisted user directory.

use std::sync::Arc;

use chrono::NaiveDate;
use polymap_storage::{Collection, KeyValueBackend, RecordStore, ResolveError};
use polymap_storage_models::now_millis;
use polymap_user_models::{USERS_KEY, User, UserForm};

use crate::UserError;
use crate::validation::{REASON_MIN_CHARS, UserSchema, ValidatedUser, check_delete_reason};

/// Users in insertion order, mirrored to storage on every mutation.
#[derive(Debug)]
pub struct UserDirectory {
    users: Collection<User>,
    schema: UserSchema,
}

impl UserDirectory {
    /// Creates the directory over `store` and loads it once.
    ///
    /// Missing or corrupt stored data yields an empty directory.
    #[must_use]
    pub fn init(store: RecordStore<User>) -> Self {
        let users = Collection::init(store);
        log::debug!("User directory loaded with {} user(s)", users.len());
        Self {
            users,
            schema: UserSchema::default(),
        }
    }

    /// Creates the directory over the standard [`USERS_KEY`] of `backend`.
    #[must_use]
    pub fn open(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::init(RecordStore::new(backend, USERS_KEY))
    }

    /// Replaces the validation rules used by [`Self::create`] and
    /// [`Self::update`].
    #[must_use]
    pub fn with_schema(mut self, schema: UserSchema) -> Self {
        self.schema = schema;
        self
    }

    /// The validation rules in use.
    #[must_use]
    pub const fn schema(&self) -> &UserSchema {
        &self.schema
    }

    /// Lists users whose `"{last_name} {first_name}"` contains `search`,
    /// ignoring case and surrounding whitespace.
    ///
    /// A missing or blank search lists everyone in stored order.
    #[must_use]
    pub fn list(&self, search: Option<&str>) -> Vec<&User> {
        let needle = search.map(str::trim).unwrap_or_default().to_lowercase();

        self.users
            .records()
            .iter()
            .filter(|u| needle.is_empty() || u.full_name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Returns the user with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// Finds a user by full id or unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if nothing or more than one user matches.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&User, ResolveError> {
        self.users.resolve(id_or_prefix)
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Validates `form` and appends a new user.
    ///
    /// # Errors
    ///
    /// * [`UserError::Validation`] if any field is invalid
    /// * [`UserError::Storage`] if persisting fails
    ///
    /// Nothing is stored in either case.
    pub fn create(&mut self, form: &UserForm, today: NaiveDate) -> Result<User, UserError> {
        let valid = self.schema.validate(form, today)?;
        let user = build_user(self.fresh_id(), valid, now_millis());

        self.users.push(user.clone())?;
        log::info!("Created user {} '{}'", user.id, user.full_name());
        Ok(user)
    }

    /// Validates `form` and overwrites the editable fields of user `id`.
    ///
    /// The id and creation time are kept.
    ///
    /// # Errors
    ///
    /// * [`UserError::NotFound`] if no user has that id
    /// * [`UserError::Validation`] if any field is invalid
    /// * [`UserError::Storage`] if persisting fails
    ///
    /// The stored user is unchanged in every error case.
    pub fn update(&mut self, id: &str, form: &UserForm, today: NaiveDate) -> Result<User, UserError> {
        let existing = self
            .users
            .get(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        let created_at = existing.created_at;

        let valid = self.schema.validate(form, today)?;
        let user = build_user(id.to_string(), valid, created_at);

        self.users.replace(user.clone())?;
        log::info!("Updated user {} '{}'", user.id, user.full_name());
        Ok(user)
    }

    /// Deletes user `id`, recording `reason` in the log.
    ///
    /// The reason is checked before the lookup. Deleting an unknown id
    /// returns `Ok(false)` and does not touch storage.
    ///
    /// # Errors
    ///
    /// * [`UserError::ReasonTooShort`] if the trimmed reason is shorter
    ///   than five characters
    /// * [`UserError::Storage`] if persisting fails; the user is kept
    pub fn delete(&mut self, id: &str, reason: &str) -> Result<bool, UserError> {
        let reason = check_delete_reason(reason).map_err(|_| UserError::ReasonTooShort {
            min: REASON_MIN_CHARS,
        })?;

        let removed = self.users.remove(id)?;
        if let Some(user) = &removed {
            log::info!("Deleted user {} '{}': {reason}", user.id, user.full_name());
        } else {
            log::debug!("Delete ignored, no user with id {id}");
        }
        Ok(removed.is_some())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !self.users.contains(&id) {
                return id;
            }
        }
    }
}

fn build_user(id: String, valid: ValidatedUser, created_at: chrono::DateTime<chrono::Utc>) -> User {
    User {
        id,
        first_name: valid.first_name,
        last_name: valid.last_name,
        birthdate: valid.birthdate,
        gender: valid.gender,
        created_at,
    }
}
