//! Technology record store.
//!
//! # Responsibility
//! - Own the ordered in-memory list of technology records.
//! - Mirror the full list to the `technologies` key after every mutation.
//!
//! # Invariants
//! - `id` is unique across the list at all times.
//! - Insertion order is preserved; only `replace_all` reorders (by replacing).
//! - In-memory state is authoritative: a failed load starts empty and a
//!   failed persist is recorded as a warning, never rolled back or raised.
//! - A rejected operation leaves both memory and storage untouched.

use crate::clock::{Clock, SystemClock};
use crate::kv::{KvStore, TECHNOLOGIES_KEY};
use crate::model::technology::{
    NewTechnology, TechId, TechStatus, TechnologyPatch, TechnologyRecord,
};
use crate::model::validation::{IssueCollector, ValidationError};
use crate::service::stats::ProgressStats;
use chrono::SecondsFormat;
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const REQUIRED_IMPORT_FIELDS: [&str; 4] = ["id", "title", "description", "status"];
/// Optional text fields. A value of another JSON type is carried in `extra`
/// instead of failing the record.
const OPTIONAL_TEXT_FIELDS: [&str; 5] =
    ["category", "difficulty", "deadline", "notes", "createdAt"];

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound(TechId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "technology not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Storage write that did not land. The in-memory mutation still stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub key: &'static str,
    pub reason: String,
}

impl Display for PersistenceWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "changes were not saved to `{}`: {}", self.key, self.reason)
    }
}

/// Record store over an injected key-value backend and clock.
pub struct RecordStore<S: KvStore, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    records: Vec<TechnologyRecord>,
    persistence_warning: Option<PersistenceWarning>,
}

impl<S: KvStore> RecordStore<S> {
    /// Loads the persisted list using the wall clock.
    pub fn load(storage: S) -> Self {
        Self::load_with_clock(storage, SystemClock)
    }
}

impl<S: KvStore, C: Clock> RecordStore<S, C> {
    /// Loads the persisted list.
    ///
    /// A missing, unreadable or unparsable entry yields an empty list, as
    /// does a stored list that fails the import shape checks (duplicate ids
    /// included). The failure is logged and never returned.
    pub fn load_with_clock(storage: S, clock: C) -> Self {
        let records = match storage.get(TECHNOLOGIES_KEY) {
            Ok(Some(raw)) => match parse_stored(&raw) {
                Ok(records) => {
                    info!(
                        "event=store_load module=store status=ok count={}",
                        records.len()
                    );
                    records
                }
                Err((error_code, detail)) => {
                    warn!(
                        "event=store_load module=store status=error error_code={error_code} error={detail}"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("event=store_load module=store status=ok count=0 source=empty");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=read_failed error={err}"
                );
                Vec::new()
            }
        };

        Self {
            storage,
            clock,
            records,
            persistence_warning: None,
        }
    }

    /// Full ordered list.
    pub fn list(&self) -> &[TechnologyRecord] {
        &self.records
    }

    pub fn get(&self, id: TechId) -> Option<&TechnologyRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records currently in progress, in list order.
    pub fn active(&self) -> impl Iterator<Item = &TechnologyRecord> {
        self.by_status(TechStatus::InProgress)
    }

    pub fn by_status(&self, status: TechStatus) -> impl Iterator<Item = &TechnologyRecord> {
        self.records
            .iter()
            .filter(move |record| record.status == status)
    }

    pub fn stats(&self) -> ProgressStats {
        ProgressStats::from_records(&self.records)
    }

    /// Warning from the most recent persist, if that write failed.
    pub fn persistence_warning(&self) -> Option<&PersistenceWarning> {
        self.persistence_warning.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Validates input and appends a new `not-started` record.
    ///
    /// # Errors
    /// - `StoreError::Validation` naming every invalid field.
    pub fn create(&mut self, input: NewTechnology) -> StoreResult<TechnologyRecord> {
        input.validate()?;

        let now = self.clock.now();
        let id = self.next_free_id(now.timestamp_millis());
        let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let record = TechnologyRecord::from_new(id, created_at, input);

        self.records.push(record.clone());
        info!("event=tech_create module=store status=ok id={id}");
        self.persist();
        Ok(record)
    }

    /// Merges `patch` into the record, keeping `id`, `created_at` and `status`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no record has `id`.
    /// - `StoreError::Validation` when present title/description fields fail.
    pub fn update(&mut self, id: TechId, patch: TechnologyPatch) -> StoreResult<TechnologyRecord> {
        let index = self.index_of(id)?;
        patch.validate()?;

        let record = &mut self.records[index];
        record.apply(patch);
        let updated = record.clone();
        info!("event=tech_update module=store status=ok id={id}");
        self.persist();
        Ok(updated)
    }

    /// Removes the record when present. Unknown ids are a no-op.
    pub fn delete(&mut self, id: TechId) {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        let removed = before - self.records.len();
        info!("event=tech_delete module=store status=ok id={id} removed={removed}");
        self.persist();
    }

    /// Replaces only the status, given in wire form.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no record has `id`.
    /// - `StoreError::Validation` on `status` when the text is not a known
    ///   status.
    pub fn set_status(&mut self, id: TechId, status: &str) -> StoreResult<TechnologyRecord> {
        let index = self.index_of(id)?;
        let status = TechStatus::parse(status).ok_or_else(|| {
            ValidationError::single(
                "status",
                "must be one of not-started, in-progress, completed",
            )
        })?;
        Ok(self.apply_status(index, status))
    }

    /// Moves the record one step along not-started -> in-progress ->
    /// completed -> not-started.
    pub fn advance_status(&mut self, id: TechId) -> StoreResult<TechnologyRecord> {
        let index = self.index_of(id)?;
        let next = self.records[index].status.next();
        Ok(self.apply_status(index, next))
    }

    /// Empties the list. Confirmation is the caller's job.
    pub fn clear(&mut self) {
        let removed = self.records.len();
        self.records.clear();
        info!("event=store_clear module=store status=ok removed={removed}");
        self.persist();
    }

    /// Replaces the whole list with imported records.
    ///
    /// Every element must be an object with at least an integer `id`, string
    /// `title` and `description`, and a known `status`; ids must be unique.
    /// Other fields are accepted as-is.
    ///
    /// # Errors
    /// - `ValidationError` listing each offending element; the current list
    ///   is left untouched.
    pub fn replace_all(&mut self, technologies: Value) -> Result<usize, ValidationError> {
        let records = match decode_records(technologies) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=store_replace module=store status=rejected issues={}",
                    err.issues().len()
                );
                return Err(err);
            }
        };

        let count = records.len();
        self.records = records;
        info!("event=store_replace module=store status=ok count={count}");
        self.persist();
        Ok(count)
    }

    fn apply_status(&mut self, index: usize, status: TechStatus) -> TechnologyRecord {
        let record = &mut self.records[index];
        record.status = status;
        let updated = record.clone();
        info!(
            "event=tech_status module=store status=ok id={} to={}",
            updated.id, status
        );
        self.persist();
        updated
    }

    fn index_of(&self, id: TechId) -> StoreResult<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn next_free_id(&self, preferred: TechId) -> TechId {
        let taken: HashSet<TechId> = self.records.iter().map(|record| record.id).collect();
        let mut candidate = preferred;
        while taken.contains(&candidate) {
            candidate += 1;
        }
        candidate
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.records)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.storage
                    .set(TECHNOLOGIES_KEY, &raw)
                    .map_err(|err| err.to_string())
            });

        self.persistence_warning = match result {
            Ok(()) => None,
            Err(reason) => {
                warn!(
                    "event=store_persist module=store status=error key={TECHNOLOGIES_KEY} error={reason}"
                );
                Some(PersistenceWarning {
                    key: TECHNOLOGIES_KEY,
                    reason,
                })
            }
        };
    }
}

fn parse_stored(raw: &str) -> Result<Vec<TechnologyRecord>, (&'static str, String)> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| ("parse_failed", err.to_string()))?;
    decode_records(value).map_err(|err| ("invalid_records", err.to_string()))
}

/// Checks the minimum record shape and decodes every element.
fn decode_records(technologies: Value) -> Result<Vec<TechnologyRecord>, ValidationError> {
    let Value::Array(items) = technologies else {
        return Err(ValidationError::single("technologies", "must be an array"));
    };

    let mut issues = IssueCollector::default();
    let mut seen_ids = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let path = format!("technologies[{index}]");
        let Value::Object(mut object) = item else {
            issues.push(path, "must be an object");
            continue;
        };

        let missing: Vec<&str> = REQUIRED_IMPORT_FIELDS
            .into_iter()
            .filter(|field| !object.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            for field in missing {
                issues.push(format!("{path}.{field}"), "is required");
            }
            continue;
        }

        match object.get("id").and_then(Value::as_i64) {
            Some(id) if !seen_ids.insert(id) => {
                issues.push(format!("{path}.id"), "duplicates an earlier record id");
                continue;
            }
            Some(_) => {}
            None => {
                issues.push(format!("{path}.id"), "must be an integer");
                continue;
            }
        }

        match object.get("status").and_then(Value::as_str) {
            Some(status) if TechStatus::parse(status).is_some() => {}
            _ => {
                issues.push(
                    format!("{path}.status"),
                    "must be one of not-started, in-progress, completed",
                );
                continue;
            }
        }

        let mut untyped = Map::new();
        for field in OPTIONAL_TEXT_FIELDS {
            if object.get(field).is_some_and(|value| !value.is_string()) {
                if let Some(value) = object.remove(field) {
                    untyped.insert(field.to_string(), value);
                }
            }
        }

        match serde_json::from_value::<TechnologyRecord>(Value::Object(object)) {
            Ok(mut record) => {
                record.extra.extend(untyped);
                records.push(record);
            }
            Err(err) => issues.push(path, format!("has an unexpected shape: {err}")),
        }
    }

    issues.finish()?;
    Ok(records)
}
