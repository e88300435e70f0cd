//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Every constructor upgrades the schema before handing out a store, so
//!   reads and writes never hit a missing table.
//! - `set` is an upsert; `updated_at` tracks the last write in epoch ms.

use super::schema;
use super::{KvError, KvResult, KvStore};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens the database file at `path`, creating it when missing.
    ///
    /// # Side effects
    /// - Emits `kv_open` events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::bootstrap("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> KvResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    /// Takes over an already opened connection, upgrading its schema.
    pub fn from_connection(mut conn: Connection) -> KvResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::upgrade(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> KvResult<u32> {
        schema::schema_version(&self.conn)
    }

    fn bootstrap(
        mode: &'static str,
        open: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> KvResult<Self> {
        let started_at = Instant::now();
        let result = open().map_err(KvError::from).and_then(Self::from_connection);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => {
                info!("event=kv_open module=kv status=ok mode={mode} duration_ms={duration_ms}")
            }
            Err(err) => error!(
                "event=kv_open module=kv status=error mode={mode} duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::kv::schema::latest_schema_version;
    use crate::kv::KvStore;
    use rusqlite::Connection;

    #[test]
    fn set_overwrites_existing_value() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("darkMode", "false").unwrap();
        store.set("darkMode", "true").unwrap();
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn from_connection_upgrades_blank_database() {
        let conn = Connection::open_in_memory().unwrap();
        let store = SqliteKvStore::from_connection(conn).unwrap();
        assert_eq!(store.schema_version().unwrap(), latest_schema_version());
        assert!(store.get("technologies").unwrap().is_none());
    }
}
