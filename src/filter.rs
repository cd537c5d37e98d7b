//! Class filtering for the instructor view
//!
//! Supports:
//! - All classes: `ALL`
//! - A single class code: `P2`, `P7`, ...
//!
//! A code that no class record knows about is still a valid filter; it just
//! matches nothing until submissions for it arrive.

use crate::record::SubmissionRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector value that means "every class"
pub const ALL_CLASSES: &str = "ALL";

/// Which submissions the dashboard currently looks at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveFilter {
    #[default]
    All,
    Class(String),
}

impl ActiveFilter {
    /// Parse a selector value: `ALL` or a class code
    pub fn from_selection(selection: &str) -> Self {
        let selection = selection.trim();
        if selection.is_empty() || selection == ALL_CLASSES {
            Self::All
        } else {
            Self::Class(selection.to_string())
        }
    }

    /// Selected class code, if narrowed to one class
    pub fn class_code(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Class(code) => Some(code),
        }
    }

    /// Check if a class code is included
    pub fn includes_class(&self, class_code: &str) -> bool {
        match self {
            Self::All => true,
            Self::Class(code) => code == class_code,
        }
    }

    /// Check if a submission is included
    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        self.includes_class(&record.class_code)
    }

    /// Narrow `records` to the matching ones, keeping source order
    pub fn apply<'a>(&self, records: &'a [SubmissionRecord]) -> Vec<&'a SubmissionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CLASSES),
            Self::Class(code) => f.write_str(code),
        }
    }
}

/// Holder of the single interactive selection that feeds aggregation
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    active: ActiveFilter,
}

impl FilterController {
    pub fn new(active: ActiveFilter) -> Self {
        Self { active }
    }

    pub fn active(&self) -> &ActiveFilter {
        &self.active
    }

    /// Replace the selection; returns `true` if it changed
    pub fn set(&mut self, filter: ActiveFilter) -> bool {
        if self.active == filter {
            return false;
        }
        self.active = filter;
        true
    }
}
