//! Aggregate learning progress.

use crate::model::technology::{TechStatus, TechnologyRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    /// `completed / total` as a whole percentage, rounded half up; 0 when
    /// there are no records.
    pub progress_percent: u8,
}

impl ProgressStats {
    pub fn from_records(records: &[TechnologyRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.status {
                TechStatus::NotStarted => stats.not_started += 1,
                TechStatus::InProgress => stats.in_progress += 1,
                TechStatus::Completed => stats.completed += 1,
            }
        }
        stats.progress_percent = percent_rounded(stats.completed, stats.total);
        stats
    }
}

fn percent_rounded(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part * 200 + whole) / (whole * 2);
    u8::try_from(scaled.min(100)).unwrap_or(100)
}
