//! JSON export/import of the technology list.
//!
//! # Responsibility
//! - Build the versioned export document with summary stats.
//! - Parse uploaded documents and hand `technologies` to the record store.
//!
//! # Invariants
//! - A rejected import never mutates the store.
//! - Every import failure is reported as an "invalid format" `ImportError`.

use crate::clock::Clock;
use crate::kv::KvStore;
use crate::model::technology::TechnologyRecord;
use crate::model::validation::ValidationError;
use crate::service::record_store::RecordStore;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";
const EXPORT_FILE_PREFIX: &str = "tech-tracker-export";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub technologies: Vec<TechnologyRecord>,
    pub exported_at: String,
    pub stats: ExportStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub total: usize,
    pub completed: usize,
}

/// Import failure. Displayed uniformly as an invalid-format message.
#[derive(Debug)]
pub enum ImportError {
    /// Payload is not JSON.
    Parse(serde_json::Error),
    /// Payload is JSON but has no `technologies` array.
    MissingTechnologies,
    /// `technologies` failed record shape validation.
    Rejected(ValidationError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid format: {err}"),
            Self::MissingTechnologies => {
                write!(f, "invalid format: expected a `technologies` array")
            }
            Self::Rejected(err) => write!(f, "invalid format: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MissingTechnologies => None,
            Self::Rejected(err) => Some(err),
        }
    }
}

/// Builds the export document for `records` stamped at `exported_at`.
pub fn build_export(records: &[TechnologyRecord], exported_at: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        version: EXPORT_FORMAT_VERSION.to_string(),
        technologies: records.to_vec(),
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        stats: ExportStats {
            total: records.len(),
            completed: records.iter().filter(|record| record.is_completed()).count(),
        },
    }
}

/// Exports the store's current list using the store's clock.
pub fn export_store<S: KvStore, C: Clock>(store: &RecordStore<S, C>) -> ExportDocument {
    let document = build_export(store.list(), store.clock().now());
    info!(
        "event=export module=transfer status=ok total={} completed={}",
        document.stats.total, document.stats.completed
    );
    document
}

/// Renders the document as two-space indented JSON.
pub fn to_pretty_json(document: &ExportDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Download file name for an export taken at `exported_at`.
pub fn export_file_name(exported_at: DateTime<Utc>) -> String {
    format!(
        "{EXPORT_FILE_PREFIX}-{}.json",
        exported_at.format("%Y-%m-%d")
    )
}

/// Replaces the store's list with the records in `payload`.
///
/// Returns the number of imported records.
///
/// # Errors
/// - `ImportError::Parse` when `payload` is not JSON.
/// - `ImportError::MissingTechnologies` when `technologies` is absent or not
///   an array.
/// - `ImportError::Rejected` when any record lacks the required shape.
pub fn import_into<S: KvStore, C: Clock>(
    store: &mut RecordStore<S, C>,
    payload: &[u8],
) -> Result<usize, ImportError> {
    let result = parse_technologies(payload).and_then(|technologies| {
        store
            .replace_all(technologies)
            .map_err(ImportError::Rejected)
    });

    match &result {
        Ok(count) => info!("event=import module=transfer status=ok count={count}"),
        Err(err) => warn!("event=import module=transfer status=rejected error={err}"),
    }
    result
}

fn parse_technologies(payload: &[u8]) -> Result<Value, ImportError> {
    let document: Value = serde_json::from_slice(payload).map_err(ImportError::Parse)?;
    let Value::Object(mut fields) = document else {
        return Err(ImportError::MissingTechnologies);
    };
    match fields.remove("technologies") {
        Some(technologies @ Value::Array(_)) => Ok(technologies),
        _ => Err(ImportError::MissingTechnologies),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_export, export_file_name, parse_technologies, ImportError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn file_name_uses_export_date() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(export_file_name(at), "tech-tracker-export-2026-03-09.json");
    }

    #[test]
    fn empty_export_has_zero_stats() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let document = build_export(&[], at);
        assert_eq!(document.version, "1.0");
        assert_eq!(document.exported_at, "2026-01-01T00:00:00.000Z");
        assert_eq!(document.stats.total, 0);
        assert_eq!(document.stats.completed, 0);
    }

    #[test]
    fn parse_rejects_non_object_and_non_array_payloads() {
        assert!(matches!(
            parse_technologies(b"[1, 2]"),
            Err(ImportError::MissingTechnologies)
        ));
        assert!(matches!(
            parse_technologies(br#"{"technologies": {"id": 1}}"#),
            Err(ImportError::MissingTechnologies)
        ));
        assert!(matches!(
            parse_technologies(b"{not json"),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn every_import_error_reads_as_invalid_format() {
        let err = parse_technologies(b"").unwrap_err();
        assert!(err.to_string().starts_with("invalid format"));
        assert!(ImportError::MissingTechnologies
            .to_string()
            .starts_with("invalid format"));
    }
}
