#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for drawing map polygons and managing users.
//!
//! ```text
//! polymap polygons list [--filter <text>]
//! polymap polygons add [--name <name>] --point <lat,lng> --point ...
//! polymap polygons draw
//! polymap polygons delete <id> [--yes]
//! polymap polygons clear [--yes]
//! polymap polygons export [--filter <text>]
//! polymap users list [--search <text>]
//! polymap users add --first-name .. --last-name .. --birthdate .. --gender ..
//! polymap users update <id> [--first-name ..] ...
//! polymap users delete <id> --reason <text> [--yes]
//! ```
//!
//! Running `polymap` with no subcommand enters interactive mode. Ids may
//! be given as any unique prefix.

mod commands;
mod config;
mod display;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{App, UserFields};
use crate::config::{AppConfig, Overrides};

#[derive(Parser)]
#[command(name = "polymap", about = "Draw map polygons and manage users")]
struct Cli {
    /// Directory holding the JSON data files [env: POLYMAP_DATA_DIR]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Display language: uz, ru or en [env: POLYMAP_LOCALE]
    #[arg(long, global = true)]
    locale: Option<String>,

    /// TOML config file (defaults to ./polymap.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Saved map polygons
    #[command(subcommand)]
    Polygons(PolygonCommand),
    /// User directory
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Subcommand)]
enum PolygonCommand {
    /// List saved polygons
    List {
        /// Only show polygons whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Save a polygon from vertices given on the command line
    Add {
        /// Polygon name (blank uses the default name)
        #[arg(long)]
        name: Option<String>,
        /// Vertex as 'lat,lng'; repeat for each vertex, in order
        #[arg(long = "point", allow_hyphen_values = true)]
        points: Vec<String>,
    },
    /// Draw a polygon by entering vertices one at a time
    Draw,
    /// Delete a polygon
    Delete {
        /// Polygon ID (UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every polygon
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print polygons as a GeoJSON FeatureCollection
    Export {
        /// Only export polygons whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// List users
    List {
        /// Only show users whose "last first" name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a user
    Add {
        #[command(flatten)]
        fields: UserFields,
    },
    /// Change fields of a user
    Update {
        /// User ID (UUID or prefix)
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user
    Delete {
        /// User ID (UUID or prefix)
        id: String,
        /// Why the user is being deleted (at least 5 characters)
        #[arg(long)]
        reason: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(&Overrides {
        data_dir: cli.data_dir,
        locale: cli.locale,
        config: cli.config,
    })?;
    log::debug!(
        "Using data directory {} with locale {}",
        config.data_dir.display(),
        config.locale
    );

    let mut app = App::open(&config)?;

    let Some(command) = cli.command else {
        return interactive::run(&mut app);
    };

    match command {
        Commands::Polygons(command) => match command {
            PolygonCommand::List { filter } => commands::list_polygons(&app, filter.as_deref()),
            PolygonCommand::Add { name, points } => {
                commands::add_polygon(&mut app, name.as_deref(), &points);
            }
            PolygonCommand::Draw => interactive::draw(&mut app)?,
            PolygonCommand::Delete { id, yes } => commands::delete_polygon(&mut app, &id, yes)?,
            PolygonCommand::Clear { yes } => commands::clear_polygons(&mut app, yes)?,
            PolygonCommand::Export { filter } => {
                commands::export_polygons(&app, filter.as_deref())?;
            }
        },
        Commands::Users(command) => match command {
            UserCommand::List { search } => commands::list_users(&app, search.as_deref()),
            UserCommand::Add { fields } => commands::add_user(&mut app, fields),
            UserCommand::Update { id, fields } => commands::update_user(&mut app, &id, fields),
            UserCommand::Delete { id, reason, yes } => {
                commands::delete_user(&mut app, &id, &reason, yes)?;
            }
        },
    }

    Ok(())
}
