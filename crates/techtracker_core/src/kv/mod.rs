//! Key-value storage contract and backends.
//!
//! # Responsibility
//! - Model the host platform's string-keyed persistent storage primitive.
//! - Provide an in-memory backend (with optional quota) and a SQLite backend.
//!
//! # Invariants
//! - Values are opaque strings; callers own (de)serialization.
//! - `remove` of an absent key is not an error.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

/// Key holding the JSON array of technology records.
pub const TECHNOLOGIES_KEY: &str = "technologies";
/// Key holding the JSON boolean theme preference.
pub const DARK_MODE_KEY: &str = "darkMode";

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    /// Write would exceed the backend's storage budget.
    QuotaExceeded { key: String, limit_bytes: usize },
    Sqlite(rusqlite::Error),
    /// Database file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { key, limit_bytes } => {
                write!(f, "storage quota of {limit_bytes} bytes exceeded writing `{key}`")
            }
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "storage schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-keyed persistent storage.
pub trait KvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&self, key: &str) -> KvResult<()>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        (**self).remove(key)
    }
}
