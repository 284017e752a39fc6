//! Menu-driven mode used when `polymap` runs without a subcommand.
//!
//! Polygons are drawn by typing one `lat,lng` vertex per line into a
//! [`CaptureSession`]; users are edited through a prompt-per-field form
//! that re-asks until the schema accepts it.

use dialoguer::{Input, Select};
use polymap_i18n::{MessageKey, MessageLookup};
use polymap_polygon::{CaptureSession, PolygonError};
use polymap_user::{Gender, UserError, UserField, UserForm};
use strum::IntoEnumIterator as _;

use crate::commands::{self, App, confirm, today};
use crate::display::{gender_label, parse_point, polygon_row, user_row};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Top-level actions in the interactive menu.
enum Action {
    ListPolygons,
    DrawPolygon,
    DeletePolygon,
    ClearPolygons,
    ExportPolygons,
    ListUsers,
    AddUser,
    EditUser,
    DeleteUser,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ListPolygons,
        Self::DrawPolygon,
        Self::DeletePolygon,
        Self::ClearPolygons,
        Self::ExportPolygons,
        Self::ListUsers,
        Self::AddUser,
        Self::EditUser,
        Self::DeleteUser,
        Self::Quit,
    ];

    #[must_use]
    const fn label_key(&self) -> MessageKey {
        match self {
            Self::ListPolygons => MessageKey::MenuListPolygons,
            Self::DrawPolygon => MessageKey::MenuDrawPolygon,
            Self::DeletePolygon => MessageKey::MenuDeletePolygon,
            Self::ClearPolygons => MessageKey::MenuClearPolygons,
            Self::ExportPolygons => MessageKey::MenuExportPolygons,
            Self::ListUsers => MessageKey::MenuListUsers,
            Self::AddUser => MessageKey::MenuAddUser,
            Self::EditUser => MessageKey::MenuEditUser,
            Self::DeleteUser => MessageKey::MenuDeleteUser,
            Self::Quit => MessageKey::MenuQuit,
        }
    }
}

/// Runs the interactive menu until the user quits.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails or export serialization
/// fails. Validation and storage failures are reported and the menu
/// continues.
pub fn run(app: &mut App) -> CliResult {
    let labels: Vec<String> = Action::ALL
        .iter()
        .map(|a| app.locale.message(a.label_key()))
        .collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("polymap")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ListPolygons => handle_list_polygons(app)?,
            Action::DrawPolygon => draw(app)?,
            Action::DeletePolygon => handle_delete_polygon(app)?,
            Action::ClearPolygons => handle_clear(app)?,
            Action::ExportPolygons => commands::export_polygons(app, None)?,
            Action::ListUsers => handle_list_users(app)?,
            Action::AddUser => handle_user_form(app, None)?,
            Action::EditUser => handle_edit_user(app)?,
            Action::DeleteUser => handle_delete_user(app)?,
            Action::Quit => return Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Polygons
// ---------------------------------------------------------------------------

fn handle_list_polygons(app: &App) -> CliResult {
    let filter: String = Input::new()
        .with_prompt(app.locale.message(MessageKey::PromptPolygonFilter))
        .allow_empty(true)
        .interact_text()?;
    commands::list_polygons(app, Some(&filter));
    Ok(())
}

/// Collects vertices until a blank line, then names and saves the
/// polygon. Typing `reset` discards the points placed so far.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub fn draw(app: &mut App) -> CliResult {
    let mut session = CaptureSession::new();
    println!("{}", app.locale.message(MessageKey::DrawInstructions));

    loop {
        println!(
            "{}",
            app.locale.message_with(
                MessageKey::CurrentPoints,
                &[("count", &session.len().to_string())]
            )
        );

        let line: String = Input::new()
            .with_prompt(app.locale.message(MessageKey::PromptPoint))
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        if line.is_empty() {
            if session.can_finalize() {
                break;
            }
            eprintln!("{}", app.locale.message(MessageKey::PolygonTooFewVertices));
            if !confirm(app.locale.message(MessageKey::ConfirmKeepDrawing), false)? {
                return Ok(());
            }
            continue;
        }

        if line.eq_ignore_ascii_case("reset") {
            session.reset();
            continue;
        }

        match parse_point(line) {
            Ok(point) => {
                if let Err(e) = session.add_point(point) {
                    eprintln!("{}", app.locale.message(e.message_key()));
                }
            }
            Err(e) => eprintln!("{}", e.localized(&app.locale)),
        }
    }

    let name: String = Input::new()
        .with_prompt(app.locale.message(MessageKey::PromptPolygonName))
        .default(app.locale.message(MessageKey::PolygonDefaultName))
        .interact_text()?;
    session.set_pending_name(name);

    loop {
        match session.finalize_pending(&mut app.polygons, &app.locale) {
            Ok(polygon) => {
                println!("{}: {}", app.locale.message(MessageKey::PolygonSaved), polygon.name);
                return Ok(());
            }
            Err(e) => {
                eprintln!("{}", e.localized(&app.locale));
                if !confirm(app.locale.message(MessageKey::ConfirmRetrySave), false)? {
                    return Ok(());
                }
            }
        }
    }
}

fn pick_polygon(app: &App) -> CliResult<Option<String>> {
    if app.polygons.is_empty() {
        println!("{}", app.locale.message(MessageKey::NoPolygons));
        return Ok(None);
    }

    let mut labels: Vec<String> = app
        .polygons
        .all()
        .iter()
        .map(|p| polygon_row(p, app.locale))
        .collect();
    labels.push(app.locale.message(MessageKey::Cancel));

    let idx = Select::new()
        .with_prompt(app.locale.message(MessageKey::SelectPolygon))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(app.polygons.all().get(idx).map(|p| p.id.clone()))
}

fn handle_delete_polygon(app: &mut App) -> CliResult {
    let Some(id) = pick_polygon(app)? else {
        return Ok(());
    };

    if !confirm(app.locale.message(MessageKey::ConfirmDeletePolygon), false)? {
        return Ok(());
    }

    match app.polygons.delete(&id) {
        Ok(_) => println!("{}", app.locale.message(MessageKey::PolygonDeleted)),
        Err(e) => eprintln!("{}", PolygonError::from(e).localized(&app.locale)),
    }
    Ok(())
}

fn handle_clear(app: &mut App) -> CliResult {
    if app.polygons.is_empty() {
        println!("{}", app.locale.message(MessageKey::NoPolygons));
        return Ok(());
    }

    if !confirm(app.locale.message(MessageKey::ConfirmClearPolygons), false)? {
        return Ok(());
    }

    match app.polygons.clear() {
        Ok(()) => println!("{}", app.locale.message(MessageKey::PolygonsCleared)),
        Err(e) => eprintln!("{}", PolygonError::from(e).localized(&app.locale)),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn handle_list_users(app: &App) -> CliResult {
    let search: String = Input::new()
        .with_prompt(app.locale.message(MessageKey::PromptUserSearch))
        .allow_empty(true)
        .interact_text()?;
    commands::list_users(app, Some(&search));
    Ok(())
}

fn pick_user(app: &App) -> CliResult<Option<String>> {
    let users = app.users.list(None);
    if users.is_empty() {
        println!("{}", app.locale.message(MessageKey::NoUsers));
        return Ok(None);
    }

    let mut labels: Vec<String> = users.iter().map(|u| user_row(u, app.locale)).collect();
    labels.push(app.locale.message(MessageKey::Cancel));

    let idx = Select::new()
        .with_prompt(app.locale.message(MessageKey::SelectUser))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(users.get(idx).map(|u| u.id.clone()))
}

fn handle_edit_user(app: &mut App) -> CliResult {
    match pick_user(app)? {
        Some(id) => handle_user_form(app, Some(&id)),
        None => Ok(()),
    }
}

fn prompt_text(label: String, initial: &str) -> CliResult<String> {
    Ok(Input::new()
        .with_prompt(label)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?)
}

/// Prompts for every field, then creates (`id == None`) or updates the
/// user. Rejected input is shown next to each field and asked for again.
fn handle_user_form(app: &mut App, id: Option<&str>) -> CliResult {
    let mut form = id
        .and_then(|id| app.users.get(id))
        .map_or_else(UserForm::blank, UserForm::from);

    let genders: Vec<Gender> = Gender::iter().collect();
    let gender_labels: Vec<String> = genders.iter().map(|g| gender_label(*g, app.locale)).collect();

    loop {
        form.first_name = prompt_text(UserField::FirstName.label(&app.locale), &form.first_name)?;
        form.last_name = prompt_text(UserField::LastName.label(&app.locale), &form.last_name)?;
        form.birthdate = prompt_text(app.locale.message(MessageKey::PromptBirthdate), &form.birthdate)?;

        let current = genders
            .iter()
            .position(|g| g.as_ref() == form.gender)
            .unwrap_or_default();
        let idx = Select::new()
            .with_prompt(UserField::Gender.label(&app.locale))
            .items(&gender_labels)
            .default(current)
            .interact()?;
        form.gender = genders[idx].to_string();

        let result = match id {
            Some(id) => app
                .users
                .update(id, &form, today())
                .map(|_| MessageKey::UserUpdated),
            None => app.users.create(&form, today()).map(|_| MessageKey::UserCreated),
        };

        match result {
            Ok(key) => {
                println!("{}", app.locale.message(key));
                return Ok(());
            }
            Err(UserError::Validation(errors)) => {
                for line in errors.localized_lines(&app.locale) {
                    eprintln!("  {line}");
                }
            }
            Err(e) => {
                for line in e.localized(&app.locale) {
                    eprintln!("{line}");
                }
                if !matches!(e, UserError::Storage(_)) {
                    return Ok(());
                }
            }
        }

        if !confirm(app.locale.message(MessageKey::ConfirmTryAgain), false)? {
            return Ok(());
        }
    }
}

fn handle_delete_user(app: &mut App) -> CliResult {
    let Some(id) = pick_user(app)? else {
        return Ok(());
    };

    if !confirm(app.locale.message(MessageKey::ConfirmDeleteUser), false)? {
        return Ok(());
    }

    loop {
        let reason: String = Input::new()
            .with_prompt(app.locale.message(MessageKey::PromptDeleteReason))
            .allow_empty(true)
            .interact_text()?;

        match app.users.delete(&id, &reason) {
            Ok(_) => {
                println!("{}", app.locale.message(MessageKey::UserDeleted));
                return Ok(());
            }
            Err(UserError::ReasonTooShort { .. }) => {
                eprintln!("{}", app.locale.message(MessageKey::DeleteReasonTooShort));
            }
            Err(e) => {
                for line in e.localized(&app.locale) {
                    eprintln!("{line}");
                }
                return Ok(());
            }
        }
    }
}
