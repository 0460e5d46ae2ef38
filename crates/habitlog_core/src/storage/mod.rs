//! Local key-value storage contracts and backends.
//!
//! # Responsibility
//! - Model the device-local "one blob per well-known key" persistence slot.
//! - Keep backend details (SQLite, files, memory) behind one trait.
//!
//! # Invariants
//! - `set` overwrites any previous value for the key as a whole.
//! - `get` returns `Ok(None)` for absent keys; absence is not an error.
//! - Keys are validated identically by every backend.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

pub mod file_kv;
pub mod memory_kv;
pub mod sqlite_kv;

const MAX_KEY_LEN: usize = 128;

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value storage failure.
#[derive(Debug)]
pub enum StorageError {
    /// Key is empty, too long, or contains characters outside `[A-Za-z0-9._-]`.
    InvalidKey(String),
    Db(DbError),
    Io(std::io::Error),
    /// Backend was opened against a database missing the key-value schema.
    SchemaMissing(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "storage io error: {err}"),
            Self::SchemaMissing(table) => write!(f, "storage table `{table}` is missing"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidKey(_) | Self::SchemaMissing(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Device-local key-value persistence slot.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()>;
}

macro_rules! forward_key_value_store {
    ($($wrapper:ty),+ $(,)?) => {
        $(
            impl<T: KeyValueStore + ?Sized> KeyValueStore for $wrapper {
                fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
                    (**self).get(key)
                }

                fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
                    (**self).set(key, value)
                }
            }
        )+
    };
}

forward_key_value_store!(&T, Box<T>, Rc<T>, Arc<T>);

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
