//! Table layout of the SQLite backend.
//!
//! # Invariants
//! - Step `n` (1-based) of `STEPS` produces schema version `n`; the version
//!   lives in `PRAGMA user_version`.
//! - Pending steps and the version bump commit together or not at all.
//! - A file stamped with a version this build does not know is never touched.

use super::{KvError, KvResult};
use log::info;
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("sql/0001_kv_entries.sql")];

/// Schema version written by this build.
pub fn latest_schema_version() -> u32 {
    STEPS.len() as u32
}

pub fn schema_version(conn: &Connection) -> KvResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Runs every pending step and returns the resulting version.
///
/// # Errors
/// - `KvError::SchemaTooNew` when the file was written by a newer build.
pub fn upgrade(conn: &mut Connection) -> KvResult<u32> {
    let found = schema_version(conn)?;
    let supported = latest_schema_version();
    if found > supported {
        return Err(KvError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(found);
    }

    let tx = conn.transaction()?;
    for ddl in STEPS.iter().skip(found as usize) {
        tx.execute_batch(ddl)?;
    }
    tx.pragma_update(None, "user_version", supported)?;
    tx.commit()?;

    info!("event=kv_schema module=kv status=upgraded from={found} to={supported}");
    Ok(supported)
}
