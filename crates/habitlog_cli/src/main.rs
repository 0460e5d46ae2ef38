//! Command-line front end for HabitLog.
//!
//! # Responsibility
//! - Render the list, detail and add-form screens as subcommands.
//! - Resolve storage (SQLite file or key-value directory) and logging options.
//!
//! # Invariants
//! - Each invocation loads the store once and exits after at most one
//!   mutation.
//! - Output rendering goes through the core view models only.

use clap::{Parser, Subcommand};
use habitlog_core::db::{open_db, DbError};
use habitlog_core::{
    default_log_level, init_logging, ActivityDetailView, ActivityId, ActivityListView,
    ActivityStore, AddActivityForm, FileKeyValueStore, KeyValueStore, LoggingError,
    SqliteKeyValueStore, StorageError, StoreError,
};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "habitlog.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "habitlog", version, about = "Track how often you keep your habits.")]
struct Cli {
    /// SQLite database holding the habit snapshot.
    #[arg(long, global = true, env = "HABITLOG_DB_PATH", conflicts_with = "kv_dir")]
    db: Option<PathBuf>,

    /// Store the snapshot as a JSON file in this directory instead of SQLite.
    #[arg(long, global = true)]
    kv_dir: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "HABITLOG_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List every habit with its counter.
    List,
    /// Show one habit.
    Show { id: ActivityId },
    /// Mark a habit as done once more.
    Increase { id: ActivityId },
    /// Add a new habit.
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Storage(StorageError),
    Store(StoreError),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging setup failed: {err}"),
            Self::Db(err) => write!(f, "cannot open habit database: {err}"),
            Self::Storage(err) => write!(f, "cannot open habit storage: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StorageError> for CliError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("habitlog: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let mut stdout = std::io::stdout().lock();
    if let Some(kv_dir) = cli.kv_dir {
        let storage = FileKeyValueStore::open(kv_dir)?;
        return execute(cli.command, storage, &mut stdout);
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let conn = open_db(db_path)?;
    let storage = SqliteKeyValueStore::try_new(&conn)?;
    execute(cli.command, storage, &mut stdout)
}

fn execute<S: KeyValueStore>(
    command: Command,
    storage: S,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut store = ActivityStore::initialize(storage);

    match command {
        Command::List => render_list(&store, out)?,
        Command::Show { id } => {
            let detail = ActivityDetailView::open(&store, id).ok_or(StoreError::NotFound(id))?;
            render_detail(&detail, out)?;
        }
        Command::Increase { id } => {
            let mut detail =
                ActivityDetailView::open(&store, id).ok_or(StoreError::NotFound(id))?;
            detail.increase(&mut store)?;
            render_detail(&detail, out)?;
        }
        Command::Add { title, description } => {
            let mut form = AddActivityForm::new();
            form.set_title(title);
            form.set_description(description);
            let created = form.confirm(&mut store);
            writeln!(out, "Added {}", created.id)?;
        }
    }

    if let Some(err) = store.last_persist_error() {
        warn!("event=cli_persist module=cli status=error error={err}");
        eprintln!("habitlog: warning: changes were not saved: {err}");
    }
    Ok(())
}

fn render_list<S: KeyValueStore>(
    store: &ActivityStore<S>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "{}", habitlog_core::view::list::LIST_TITLE)?;
    let rows = ActivityListView::rows(store);
    if rows.is_empty() {
        return writeln!(out, "  (no habits yet)");
    }
    for row in rows {
        writeln!(out, "  {}  {}  [{}]", row.id, first_line(&row.title), row.times)?;
        if !row.description.is_empty() {
            writeln!(out, "      {}", first_line(&row.description))?;
        }
    }
    Ok(())
}

fn render_detail(detail: &ActivityDetailView, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", detail.title())?;
    writeln!(out, "{}", detail.description_line())?;
    writeln!(out, "{}", detail.times_line())
}

// List rows are single-line, like the mobile list cells.
fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
