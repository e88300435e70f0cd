//! Field-level validation rules for technology input.
//!
//! # Invariants
//! - `title`: non-empty after trim, at most `TITLE_MAX_CHARS` characters.
//! - `description`: non-empty after trim, at least `DESCRIPTION_MIN_CHARS`
//!   characters.
//! - Lengths are counted in Unicode scalar values, not bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// One rejected field together with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failure naming every offending field.
///
/// Issues for record-level input (imports) use `technologies[<index>].<field>`
/// paths so callers can point at the failing element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns whether any issue targets `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed")?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{} {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Accumulates issues so every bad field is reported at once.
#[derive(Debug, Default)]
pub(crate) struct IssueCollector {
    issues: Vec<FieldIssue>,
}

impl IssueCollector {
    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    pub(crate) fn check_title(&mut self, title: &str) {
        if title.trim().is_empty() {
            self.push("title", "is required");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            self.push(
                "title",
                format!("must be at most {TITLE_MAX_CHARS} characters"),
            );
        }
    }

    pub(crate) fn check_description(&mut self, description: &str) {
        if description.trim().is_empty() {
            self.push("description", "is required");
        } else if description.chars().count() < DESCRIPTION_MIN_CHARS {
            self.push(
                "description",
                format!("must be at least {DESCRIPTION_MIN_CHARS} characters"),
            );
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
