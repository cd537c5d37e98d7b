// Flattened submission rows and per-class tab counts for the instructor view

use crate::record::{ClassRecord, Hypothesis, RecordId, SubmissionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One (submission, condition) row of the submissions table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRow {
    pub record_id: RecordId,
    pub created_at: Option<DateTime<Utc>>,
    pub class_code: String,
    pub group_name: String,
    /// Member names joined with ", "
    pub members: String,
    pub hypothesis: Option<Hypothesis>,
    pub label: String,
    pub mass: Option<f64>,
    pub trials: Vec<Option<f64>>,
    pub avg: Option<f64>,
    pub sd: Option<f64>,
}

/// Flatten filtered submissions into one row per condition
pub fn submission_rows(filtered: &[&SubmissionRecord]) -> Vec<SubmissionRow> {
    filtered
        .iter()
        .flat_map(|record| {
            let members = record.members.join(", ");
            record.conditions.iter().map(move |c| SubmissionRow {
                record_id: record.id.clone(),
                created_at: record.created_at,
                class_code: record.class_code.clone(),
                group_name: record.group_name.clone(),
                members: members.clone(),
                hypothesis: record.hypothesis,
                label: c.label.clone(),
                mass: c.mass,
                trials: c.trials.clone(),
                avg: c.avg(),
                sd: c.sd(),
            })
        })
        .collect()
}

/// Class selector entry with its submission count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassTab {
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// The ALL tab plus one tab per known class, sorted by code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassTabs {
    pub all: usize,
    pub classes: Vec<ClassTab>,
}

/// Count submissions per known class
pub fn class_tabs(records: &[SubmissionRecord], classes: &[ClassRecord]) -> ClassTabs {
    let mut tabs: Vec<ClassTab> = classes
        .iter()
        .map(|class| ClassTab {
            code: class.code.clone(),
            name: class.display_name().to_string(),
            count: records.iter().filter(|r| r.class_code == class.code).count(),
        })
        .collect();
    tabs.sort_by(|a, b| a.code.cmp(&b.code));

    ClassTabs {
        all: records.len(),
        classes: tabs,
    }
}
