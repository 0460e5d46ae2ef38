//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the list, detail and add-form actions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call loads the store from the database and persists on mutation;
//!   no store instance outlives one call.
//! - Store calls are serialized within the process.

use habitlog_core::db::open_db;
use habitlog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Activity, ActivityDetailView, ActivityId, ActivityListView, ActivityRow, ActivityStore,
    AddActivityForm, SqliteKeyValueStore,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const HABIT_DB_FILE_NAME: &str = "habitlog_ffi.sqlite3";
const HABIT_DB_PATH_ENV: &str = "HABITLOG_DB_PATH";
static HABIT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
// Load-mutate-persist rewrites the whole snapshot; calls must not interleave.
static HABIT_STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One habit as shown in list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    /// Stable activity ID in string form.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Counter value; `u64` is exposed as Dart `BigInt` by FRB.
    pub times: u64,
}

/// List response envelope for the habits screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListResponse {
    pub ok: bool,
    /// Habits in insertion order; empty on failure.
    pub items: Vec<HabitItem>,
    pub message: String,
}

/// Action response envelope for add/increase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    pub ok: bool,
    /// Habit state after the action on success.
    pub item: Option<HabitItem>,
    pub message: String,
}

impl HabitActionResponse {
    fn success(message: impl Into<String>, activity: &Activity) -> Self {
        Self {
            ok: true,
            item: Some(HabitItem::from(activity)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

impl From<ActivityRow> for HabitItem {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            description: row.description,
            times: row.times,
        }
    }
}

impl From<&Activity> for HabitItem {
    fn from(activity: &Activity) -> Self {
        Self::from(ActivityRow::from(activity))
    }
}

/// Lists all habits in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_list() -> HabitListResponse {
    let result = with_activity_store(|store| {
        Ok(ActivityListView::rows(store)
            .into_iter()
            .map(HabitItem::from)
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No habits yet.".to_string()
            } else {
                format!("Loaded {} habit(s).", items.len())
            };
            HabitListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => HabitListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("habits_list failed: {err}"),
        },
    }
}

/// Adds a habit from the add-form.
///
/// Title and description are stored verbatim; empty values are accepted.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created habit on success.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_add(title: String, description: String) -> HabitActionResponse {
    let result = with_activity_store(|store| {
        let form = AddActivityForm { title, description };
        Ok(form.confirm(store))
    });
    match result {
        Ok(activity) => HabitActionResponse::success("Habit added.", &activity),
        Err(err) => HabitActionResponse::failure(format!("habit_add failed: {err}")),
    }
}

/// Raises the counter of the habit with `id` by one.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unknown or malformed ids produce a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_increase(id: String) -> HabitActionResponse {
    let activity_id = match parse_activity_id(&id) {
        Ok(activity_id) => activity_id,
        Err(err) => return HabitActionResponse::failure(format!("habit_increase failed: {err}")),
    };

    let result = with_activity_store(|store| {
        let mut detail = ActivityDetailView::open(store, activity_id)
            .ok_or_else(|| format!("activity not found: {activity_id}"))?;
        detail.increase(store).map_err(|err| err.to_string())?;
        Ok(detail.snapshot().clone())
    });
    match result {
        Ok(activity) => HabitActionResponse::success("Habit increased.", &activity),
        Err(err) => HabitActionResponse::failure(format!("habit_increase failed: {err}")),
    }
}

fn parse_activity_id(raw: &str) -> Result<ActivityId, String> {
    let trimmed = raw.trim();
    ActivityId::parse_str(trimmed).map_err(|err| format!("invalid activity id `{trimmed}`: {err}"))
}

fn resolve_habit_db_path() -> PathBuf {
    HABIT_DB_PATH
        .get_or_init(|| db_path_from_env(std::env::var(HABIT_DB_PATH_ENV).ok()))
        .clone()
}

fn db_path_from_env(raw: Option<String>) -> PathBuf {
    match raw.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => PathBuf::from(trimmed),
        _ => std::env::temp_dir().join(HABIT_DB_FILE_NAME),
    }
}

fn with_activity_store<T>(
    f: impl FnOnce(&mut ActivityStore<SqliteKeyValueStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = HABIT_STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let db_path = resolve_habit_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("habit DB open failed: {err}"))?;
    let storage = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("habit storage init failed: {err}"))?;
    let mut store = ActivityStore::initialize(storage);
    let value = f(&mut store)?;
    if let Some(err) = store.last_persist_error() {
        warn!("event=ffi_persist module=ffi status=error error={err}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, db_path_from_env, habit_add, habit_increase, habits_list, init_logging,
        ping, resolve_habit_db_path,
    };
    use habitlog_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/habitlog-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn habit_add_then_list_contains_created_item() {
        let title = unique_token("ffi-add");
        let created = habit_add(title.clone(), "Daily 5k".to_string());
        assert!(created.ok, "{}", created.message);
        let item = created.item.expect("add should return the habit");
        assert_eq!(item.title, title);
        assert_eq!(item.times, 0);

        let listed = habits_list();
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|candidate| candidate == &item));
    }

    #[test]
    fn habit_increase_persists_new_counter() {
        let created = habit_add(unique_token("ffi-increase"), String::new());
        let id = created.item.expect("add should return the habit").id;

        let first = habit_increase(id.clone());
        assert!(first.ok, "{}", first.message);
        let second = habit_increase(format!("  {id}  "));
        assert!(second.ok, "{}", second.message);
        assert_eq!(second.item.as_ref().map(|item| item.times), Some(2));

        let stored = habits_list()
            .items
            .into_iter()
            .find(|item| item.id == id)
            .expect("increased habit should be listed");
        assert_eq!(stored.times, 2);
    }

    #[test]
    fn habit_increase_rejects_malformed_and_unknown_ids() {
        let malformed = habit_increase("not-a-uuid".to_string());
        assert!(!malformed.ok);
        assert!(malformed.message.contains("invalid activity id"));

        let unknown = habit_increase(uuid::Uuid::new_v4().to_string());
        assert!(!unknown.ok);
        assert!(unknown.message.contains("activity not found"));
    }

    #[test]
    fn snapshot_is_stored_under_activities_key() {
        habit_add(unique_token("ffi-key"), String::new());

        let conn = open_db(resolve_habit_db_path()).expect("open db");
        let value: Vec<u8> = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = 'activities'",
                [],
                |row| row.get(0),
            )
            .expect("query snapshot row");
        let decoded = habitlog_core::decode_activities(&value).expect("decode snapshot");
        assert!(!decoded.is_empty());
    }

    #[test]
    fn default_db_path_is_separate_from_cli_default() {
        let fallback = db_path_from_env(None);
        assert_eq!(fallback, std::env::temp_dir().join("habitlog_ffi.sqlite3"));
        assert_ne!(fallback, std::env::temp_dir().join("habitlog.sqlite3"));
        assert_eq!(db_path_from_env(Some("   ".to_string())), fallback);
        assert_eq!(
            db_path_from_env(Some(" /data/habits.db ".to_string())),
            std::path::PathBuf::from("/data/habits.db")
        );
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
