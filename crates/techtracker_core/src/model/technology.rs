//! Technology record domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted under the `technologies` key.
//! - Define create/patch inputs and the status lifecycle.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - Unknown category/difficulty strings and unknown record fields are
//!   preserved verbatim so imported data round-trips unchanged.
//!
//! # See also
//! - `service::record_store` for the mutation contract.

use super::validation::{IssueCollector, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Stable record identifier: creation time in epoch milliseconds.
pub type TechId = i64;

/// Learning lifecycle stage of a technology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TechStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Parses the wire form (`not-started|in-progress|completed`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Next stage in the card toggle cycle; `Completed` wraps to `NotStarted`.
    pub fn next(self) -> Self {
        match self {
            Self::NotStarted => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::NotStarted,
        }
    }
}

impl Display for TechStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Technology area. Unknown values are kept as `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Frontend,
    Backend,
    Mobile,
    Devops,
    Database,
    Tools,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Mobile => "mobile",
            Self::Devops => "devops",
            Self::Database => "database",
            Self::Tools => "tools",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "frontend" => Self::Frontend,
            "backend" => Self::Backend,
            "mobile" => Self::Mobile,
            "devops" => Self::Devops,
            "database" => Self::Database,
            "tools" => Self::Tools,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-assessed difficulty. Unknown values are kept as `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Difficulty {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical persisted record.
///
/// `category`, `difficulty` and `created_at` are optional only because older
/// exports may lack them; records created by the store always carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyRecord {
    pub id: TechId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: TechStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields this version does not model, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TechnologyRecord {
    /// Builds a fresh record from validated input.
    pub(crate) fn from_new(id: TechId, created_at: String, input: NewTechnology) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: Some(input.category),
            difficulty: Some(input.difficulty),
            deadline: non_blank(input.deadline),
            notes: non_blank(input.notes),
            status: TechStatus::NotStarted,
            created_at: Some(created_at),
            extra: Map::new(),
        }
    }

    /// Merges present patch fields. Caller validates the patch first.
    ///
    /// A patched field replaces any untyped value of the same name in `extra`.
    pub(crate) fn apply(&mut self, patch: TechnologyPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
            self.extra.remove("category");
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = Some(difficulty);
            self.extra.remove("difficulty");
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = non_blank(deadline);
            self.extra.remove("deadline");
        }
        if let Some(notes) = patch.notes {
            self.notes = non_blank(notes);
            self.extra.remove("notes");
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TechStatus::Completed
    }
}

/// Input for creating a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTechnology {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub deadline: Option<String>,
    pub notes: Option<String>,
}

impl NewTechnology {
    /// Creates input with default category (`frontend`) and difficulty
    /// (`beginner`).
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<Difficulty>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = IssueCollector::default();
        issues.check_title(&self.title);
        issues.check_description(&self.description);
        issues.finish()
    }
}

/// Partial update. `None` leaves a field untouched; for `deadline` and
/// `notes`, `Some(None)` clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TechnologyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub deadline: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl TechnologyPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = IssueCollector::default();
        if let Some(title) = &self.title {
            issues.check_title(title);
        }
        if let Some(description) = &self.description {
            issues.check_description(description);
        }
        issues.finish()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        Category, Difficulty, NewTechnology, TechStatus, TechnologyPatch, TechnologyRecord,
    };
    use serde_json::json;

    #[test]
    fn status_cycle_wraps_after_completed() {
        assert_eq!(TechStatus::NotStarted.next(), TechStatus::InProgress);
        assert_eq!(TechStatus::InProgress.next(), TechStatus::Completed);
        assert_eq!(TechStatus::Completed.next(), TechStatus::NotStarted);
    }

    #[test]
    fn status_parse_rejects_unknown_text() {
        assert_eq!(TechStatus::parse("in-progress"), Some(TechStatus::InProgress));
        assert_eq!(TechStatus::parse("done"), None);
        assert_eq!(TechStatus::parse("In-Progress"), None);
    }

    #[test]
    fn unknown_category_is_preserved() {
        let category = Category::from("embedded");
        assert_eq!(category, Category::Other("embedded".to_string()));
        assert_eq!(String::from(category), "embedded");
        assert_eq!(Category::from("devops"), Category::Devops);
        assert_eq!(Difficulty::from("expert").as_str(), "expert");
    }

    #[test]
    fn new_technology_defaults_match_form_defaults() {
        let input = NewTechnology::new("Rust", "Systems programming language");
        assert_eq!(input.category, Category::Frontend);
        assert_eq!(input.difficulty, Difficulty::Beginner);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = TechnologyPatch {
            notes: Some(Some("x".to_string())),
            ..TechnologyPatch::default()
        };
        assert!(patch.validate().is_ok());

        let patch = TechnologyPatch {
            description: Some("tiny".to_string()),
            ..TechnologyPatch::default()
        };
        let err = patch.validate().expect_err("short description must fail");
        assert!(err.has_field("description"));
        assert!(!err.has_field("title"));
    }

    #[test]
    fn patch_is_empty_only_without_fields() {
        assert!(TechnologyPatch::default().is_empty());
        let clear_notes = TechnologyPatch {
            notes: Some(None),
            ..TechnologyPatch::default()
        };
        assert!(!clear_notes.is_empty());
    }

    #[test]
    fn patched_field_replaces_untyped_value() {
        let input = NewTechnology::new("Rust", "Systems programming language");
        let mut record = TechnologyRecord::from_new(1, "2026-01-01T00:00:00.000Z".into(), input);
        record.category = None;
        record.extra.insert("category".to_string(), json!(3));

        record.apply(TechnologyPatch {
            category: Some(Category::Tools),
            ..TechnologyPatch::default()
        });

        assert!(record.extra.is_empty());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["category"], "tools");
    }
}
