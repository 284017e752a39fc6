//! Handlers for the non-interactive subcommands.

use std::sync::Arc;

use chrono::NaiveDate;
use dialoguer::Confirm;
use polymap_i18n::{Locale, MessageKey, MessageLookup};
use polymap_polygon::{CaptureSession, PolygonCatalog, PolygonError, export};
use polymap_storage::{FileBackend, KeyValueBackend, StorageError};
use polymap_user::{UserDirectory, UserError, UserForm};

use crate::config::AppConfig;
use crate::display::{parse_point, polygon_row, user_row};

/// Loaded state shared by every command.
#[derive(Debug)]
pub struct App {
    /// Display language.
    pub locale: Locale,
    /// Saved polygons.
    pub polygons: PolygonCatalog,
    /// Saved users.
    pub users: UserDirectory,
}

impl App {
    /// Opens both collections from the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the data directory cannot be created.
    pub fn open(config: &AppConfig) -> Result<Self, StorageError> {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(FileBackend::open(&config.data_dir)?);
        Ok(Self::with_backend(backend, config.locale))
    }

    /// Opens both collections from `backend`.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn KeyValueBackend>, locale: Locale) -> Self {
        Self {
            locale,
            polygons: PolygonCatalog::open(backend.clone()),
            users: UserDirectory::open(backend),
        }
    }
}

/// Field values given on the command line for `users add` and
/// `users update`. Unset fields keep the form's current value.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UserFields {
    /// Given name
    #[arg(long)]
    pub first_name: Option<String>,
    /// Family name
    #[arg(long)]
    pub last_name: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub birthdate: Option<String>,
    /// male or female
    #[arg(long)]
    pub gender: Option<String>,
}

impl UserFields {
    /// Overlays the given fields onto `form`.
    #[must_use]
    pub fn apply(self, mut form: UserForm) -> UserForm {
        if let Some(v) = self.first_name {
            form.first_name = v;
        }
        if let Some(v) = self.last_name {
            form.last_name = v;
        }
        if let Some(v) = self.birthdate {
            form.birthdate = v;
        }
        if let Some(v) = self.gender {
            form.gender = v;
        }
        form
    }
}

/// Today's date in the local time zone, the latest valid birthdate.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Prints `lines` to stderr and exits with status 1.
pub fn fail(lines: impl IntoIterator<Item = String>) -> ! {
    for line in lines {
        eprintln!("{line}");
    }
    std::process::exit(1);
}

/// Asks a yes/no question, defaulting to "no". Skipped when `assume_yes`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn confirm(prompt: String, assume_yes: bool) -> Result<bool, dialoguer::Error> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new().with_prompt(prompt).default(false).interact()
}

/// Prints the polygon table.
pub fn list_polygons(app: &App, filter: Option<&str>) {
    let polygons = app.polygons.list(filter);

    if polygons.is_empty() {
        println!("{}", app.locale.message(MessageKey::NoPolygons));
        return;
    }

    for polygon in &polygons {
        println!("{}", polygon_row(polygon, app.locale));
    }
    println!("\n{} / {}", polygons.len(), app.polygons.len());
}

/// Saves a polygon from `lat,lng` vertex strings. A blank name falls back
/// to the localized default.
pub fn add_polygon(app: &mut App, name: Option<&str>, points: &[String]) {
    let mut session = CaptureSession::new();

    for text in points {
        let point = parse_point(text).unwrap_or_else(|e| fail([e.localized(&app.locale)]));
        if let Err(e) = session.add_point(point) {
            fail([app.locale.message(e.message_key())]);
        }
    }

    match session.finalize(&mut app.polygons, name.unwrap_or_default(), &app.locale) {
        Ok(polygon) => println!("{}: {}", app.locale.message(MessageKey::PolygonSaved), polygon.id),
        Err(e) => fail([e.localized(&app.locale)]),
    }
}

/// Deletes one polygon after confirmation.
///
/// # Errors
///
/// Returns an error if the confirmation prompt fails.
pub fn delete_polygon(app: &mut App, id: &str, assume_yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let polygon = app
        .polygons
        .resolve(id)
        .map_err(PolygonError::from)
        .unwrap_or_else(|e| fail([e.localized(&app.locale)]));
    let (id, name) = (polygon.id.clone(), polygon.name.clone());

    let prompt = format!("{} ({name})", app.locale.message(MessageKey::ConfirmDeletePolygon));
    if !confirm(prompt, assume_yes)? {
        return Ok(());
    }

    match app.polygons.delete(&id) {
        Ok(true) => println!("{}", app.locale.message(MessageKey::PolygonDeleted)),
        Ok(false) => fail([app.locale.message(MessageKey::PolygonNotFound)]),
        Err(e) => fail([PolygonError::from(e).localized(&app.locale)]),
    }
    Ok(())
}

/// Deletes every polygon after confirmation.
///
/// # Errors
///
/// Returns an error if the confirmation prompt fails.
pub fn clear_polygons(app: &mut App, assume_yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm(app.locale.message(MessageKey::ConfirmClearPolygons), assume_yes)? {
        return Ok(());
    }

    if let Err(e) = app.polygons.clear() {
        fail([PolygonError::from(e).localized(&app.locale)]);
    }
    println!("{}", app.locale.message(MessageKey::PolygonsCleared));
    Ok(())
}

/// Prints the matching polygons as a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_polygons(app: &App, filter: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let collection = export::feature_collection(app.polygons.list(filter));
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}

/// Prints the user table.
pub fn list_users(app: &App, search: Option<&str>) {
    let users = app.users.list(search);

    if users.is_empty() {
        println!("{}", app.locale.message(MessageKey::NoUsers));
        return;
    }

    for user in &users {
        println!("{}", user_row(user, app.locale));
    }
    println!("\n{} / {}", users.len(), app.users.len());
}

/// Creates a user from command-line fields.
pub fn add_user(app: &mut App, fields: UserFields) {
    let form = fields.apply(UserForm::blank());

    match app.users.create(&form, today()) {
        Ok(user) => println!("{}: {}", app.locale.message(MessageKey::UserCreated), user.id),
        Err(e) => fail(e.localized(&app.locale)),
    }
}

/// Updates the given fields of a user.
pub fn update_user(app: &mut App, id: &str, fields: UserFields) {
    let existing = app
        .users
        .resolve(id)
        .map_err(UserError::from)
        .unwrap_or_else(|e| fail(e.localized(&app.locale)));
    let (id, form) = (existing.id.clone(), fields.apply(UserForm::from(existing)));

    match app.users.update(&id, &form, today()) {
        Ok(user) => println!("{}: {}", app.locale.message(MessageKey::UserUpdated), user.full_name()),
        Err(e) => fail(e.localized(&app.locale)),
    }
}

/// Deletes a user after confirmation, recording `reason`.
///
/// # Errors
///
/// Returns an error if the confirmation prompt fails.
pub fn delete_user(app: &mut App, id: &str, reason: &str, assume_yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let user = app
        .users
        .resolve(id)
        .map_err(UserError::from)
        .unwrap_or_else(|e| fail(e.localized(&app.locale)));
    let (id, name) = (user.id.clone(), user.full_name());

    if let Err(violation) = polymap_user::check_delete_reason(reason) {
        log::debug!("Rejected deletion reason: {violation}");
        fail([app.locale.message(MessageKey::DeleteReasonTooShort)]);
    }

    let prompt = format!("{} ({name})", app.locale.message(MessageKey::ConfirmDeleteUser));
    if !confirm(prompt, assume_yes)? {
        return Ok(());
    }

    match app.users.delete(&id, reason) {
        Ok(true) => println!("{}", app.locale.message(MessageKey::UserDeleted)),
        Ok(false) => fail([app.locale.message(MessageKey::UserNotFound)]),
        Err(e) => fail(e.localized(&app.locale)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polymap_storage::MemoryBackend;

    fn app() -> App {
        App::with_backend(Arc::new(MemoryBackend::new()), Locale::En)
    }

    #[test]
    fn fields_overlay_only_what_was_given() {
        let base = UserForm {
            first_name: "Olga".to_string(),
            last_name: "Petrova".to_string(),
            birthdate: "1985-12-24".to_string(),
            gender: "female".to_string(),
        };
        let fields = UserFields {
            last_name: Some("Ivanova".to_string()),
            ..UserFields::default()
        };

        let form = fields.apply(base.clone());
        assert_eq!(form.last_name, "Ivanova");
        assert_eq!(form.first_name, base.first_name);
        assert_eq!(form.birthdate, base.birthdate);
    }

    #[test]
    fn add_polygon_saves_through_the_catalog() {
        let mut app = app();
        let points = ["41.31,69.27", "41.32,69.28", "41.30,69.29"].map(String::from);

        add_polygon(&mut app, Some("  "), &points);

        assert_eq!(app.polygons.len(), 1);
        assert_eq!(app.polygons.all()[0].name, "New polygon");
    }

    #[test]
    fn add_user_and_update_by_prefix() {
        let mut app = app();
        add_user(
            &mut app,
            UserFields {
                first_name: Some("Olga".to_string()),
                last_name: Some("Petrova".to_string()),
                birthdate: Some("1985-12-24".to_string()),
                gender: Some("female".to_string()),
            },
        );
        let id = app.users.list(None)[0].id.clone();

        update_user(
            &mut app,
            &id[..8],
            UserFields {
                last_name: Some("Ivanova".to_string()),
                ..UserFields::default()
            },
        );
        assert_eq!(app.users.get(&id).unwrap().full_name(), "Ivanova Olga");
    }

    #[test]
    fn confirm_is_skipped_with_assume_yes() {
        assert!(confirm("unused".to_string(), true).unwrap());
    }
}
