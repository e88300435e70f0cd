//! Core domain logic for TechTracker.
//! This crate is the single source of truth for record invariants and the
//! persistence/import-export contract.

pub mod clock;
pub mod kv;
pub mod logging;
pub mod model;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kv::{KvError, KvResult, KvStore, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::technology::{
    Category, Difficulty, NewTechnology, TechId, TechStatus, TechnologyPatch, TechnologyRecord,
};
pub use model::validation::{FieldIssue, ValidationError};
pub use service::preferences::Preferences;
pub use service::record_store::{PersistenceWarning, RecordStore, StoreError, StoreResult};
pub use service::stats::ProgressStats;
pub use service::transfer::{
    build_export, export_file_name, export_store, import_into, to_pretty_json, ExportDocument,
    ExportStats, ImportError, EXPORT_FORMAT_VERSION,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
