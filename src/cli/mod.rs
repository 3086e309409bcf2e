pub mod context;
pub mod calling_commands;
pub mod import_commands;
pub mod admin_commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::debug;

use crate::config::AppConfig;
use crate::db::schema;
use crate::error::TrackResult;
use crate::import::ImportKind;
use admin_commands::{OrgCommand, PositionCommand, UnitCommand, UserCommand};
use calling_commands::CallingCommand;
use context::CliContext;

#[derive(Debug, Parser)]
#[command(name = "calltrack")]
#[command(about = "Track callings from approval through sustaining, setting apart and release")]
pub struct Cli {
    /// Database file path (overrides CALLTRACK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Username to act as
    #[arg(long = "as", global = true, value_name = "USER", env = "CALLTRACK_USER")]
    pub acting_user: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema
    Init,

    /// Import open callings from a CSV export
    Import { file: PathBuf },

    /// Import completed callings from a CSV export
    ImportCompleted { file: PathBuf },

    /// Create or refresh the permission groups
    CreateGroups,

    /// Remove members whose names are dates
    CleanupMembers,

    #[command(subcommand)]
    User(UserCommand),

    #[command(subcommand)]
    Unit(UnitCommand),

    #[command(subcommand)]
    Org(OrgCommand),

    #[command(subcommand)]
    Position(PositionCommand),

    #[command(subcommand)]
    Calling(CallingCommand),

    /// Summary counts, recent callings and upcoming events
    Dashboard,
}

pub fn run(cli: Cli, config: &AppConfig) -> TrackResult<()> {
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let conn = open_database(&db_path)?;
    let ctx = CliContext::new(conn, cli.acting_user, cli.json, config.page_size);

    match cli.command {
        Command::Init => {
            println!("Database ready at {}", db_path.display());
            Ok(())
        }
        Command::Import { file } => import_commands::import(&ctx, &file, ImportKind::Open),
        Command::ImportCompleted { file } => {
            import_commands::import(&ctx, &file, ImportKind::Completed)
        }
        Command::CreateGroups => admin_commands::create_groups(&ctx),
        Command::CleanupMembers => admin_commands::cleanup_members(&ctx),
        Command::User(cmd) => admin_commands::user(&ctx, cmd),
        Command::Unit(cmd) => admin_commands::unit(&ctx, cmd),
        Command::Org(cmd) => admin_commands::org(&ctx, cmd),
        Command::Position(cmd) => admin_commands::position(&ctx, cmd),
        Command::Calling(cmd) => calling_commands::run(&ctx, cmd),
        Command::Dashboard => calling_commands::dashboard(&ctx),
    }
}

/// Opens (creating if needed) the database file and brings the schema up to date.
pub fn open_database(path: &Path) -> TrackResult<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    debug!(path = %path.display(), "opening database");
    let conn = Connection::open(path)?;
    schema::initialize(&conn)?;
    Ok(conn)
}
