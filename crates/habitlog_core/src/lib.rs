//! Core domain logic for HabitLog.
//! This crate is the single source of truth for habit-tracking invariants.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use codec::{decode_activities, encode_activities, CodecError, CodecResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityId, ActivityValidationError};
pub use storage::file_kv::FileKeyValueStore;
pub use storage::memory_kv::InMemoryKeyValueStore;
pub use storage::sqlite_kv::SqliteKeyValueStore;
pub use storage::{KeyValueStore, StorageError, StorageResult};
pub use store::activity_store::{
    ActivityStore, LoadSource, PersistError, StoreError, StoreResult, SubscriptionId,
    ACTIVITIES_KEY,
};
pub use view::add_form::AddActivityForm;
pub use view::detail::ActivityDetailView;
pub use view::list::{ActivityListView, ActivityRow};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
