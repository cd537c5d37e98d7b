//! Submission drafts and write eligibility
//!
//! A draft holds the raw text a group typed in. [`SubmissionDraft::validate`]
//! is all-or-nothing: either every condition parses cleanly and a
//! [`NewSubmission`] payload comes out, or nothing is eligible for writing.

use crate::numeric::parse_numeric;
use crate::record::{
    condition_averages, ConditionAverage, ConditionSample, Hypothesis, DEFAULT_CONDITION_LABELS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Trials recorded per condition on a fresh draft
pub const TRIALS_PER_CONDITION: usize = 3;

/// Reasons a draft cannot be written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No class selected")]
    MissingClass,

    #[error("Group name is required")]
    MissingGroupName,

    #[error("Submission has no conditions")]
    NoConditions,

    #[error("Condition '{label}' appears more than once")]
    DuplicateLabel { label: String },

    #[error("Condition '{label}': cart mass is not a number")]
    InvalidMass { label: String },

    #[error("Condition '{label}': no trials recorded")]
    MissingTrials { label: String },

    #[error("Condition '{label}': trial {trial} is not a number")]
    InvalidTrial { label: String, trial: usize },
}

/// Raw text for one condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDraft {
    pub label: String,
    pub mass: String,
    pub trials: Vec<String>,
}

impl ConditionDraft {
    /// Empty condition with [`TRIALS_PER_CONDITION`] blank trial fields
    pub fn blank(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            mass: String::new(),
            trials: vec![String::new(); TRIALS_PER_CONDITION],
        }
    }

    /// Live preview while typing: whatever currently parses
    pub fn preview(&self) -> ConditionSample {
        ConditionSample::new(
            self.label.clone(),
            parse_numeric(&self.mass),
            self.trials.iter().map(|t| parse_numeric(t)).collect(),
        )
    }

    fn validate(&self) -> Result<ConditionSample, ValidationError> {
        let mass = parse_numeric(&self.mass).ok_or_else(|| ValidationError::InvalidMass {
            label: self.label.clone(),
        })?;
        if self.trials.is_empty() {
            return Err(ValidationError::MissingTrials {
                label: self.label.clone(),
            });
        }
        let trials = self
            .trials
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                parse_numeric(raw).map(Some).ok_or(ValidationError::InvalidTrial {
                    label: self.label.clone(),
                    trial: i + 1,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConditionSample::new(self.label.clone(), Some(mass), trials))
    }
}

/// Everything a group has entered before pressing submit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub class_code: String,
    pub group_name: String,
    /// Comma-separated member names
    pub members: String,
    pub hypothesis: Hypothesis,
    pub conditions: Vec<ConditionDraft>,
}

impl SubmissionDraft {
    /// Draft seeded with the canonical conditions
    pub fn with_default_conditions() -> Self {
        Self {
            conditions: DEFAULT_CONDITION_LABELS
                .iter()
                .map(|label| ConditionDraft::blank(*label))
                .collect(),
            ..Self::default()
        }
    }

    /// Check eligibility and build the write payload
    pub fn validate(&self) -> Result<NewSubmission, ValidationError> {
        let class_code = self.class_code.trim().to_uppercase();
        if class_code.is_empty() {
            return Err(ValidationError::MissingClass);
        }
        let group_name = self.group_name.trim();
        if group_name.is_empty() {
            return Err(ValidationError::MissingGroupName);
        }
        if self.conditions.is_empty() {
            return Err(ValidationError::NoConditions);
        }

        let mut seen = HashSet::new();
        for condition in &self.conditions {
            if !seen.insert(condition.label.as_str()) {
                return Err(ValidationError::DuplicateLabel {
                    label: condition.label.clone(),
                });
            }
        }

        let conditions = self
            .conditions
            .iter()
            .map(ConditionDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewSubmission {
            class_code,
            group_name: group_name.to_string(),
            members: parse_members(&self.members),
            hypothesis: self.hypothesis,
            conditions,
        })
    }

    pub fn is_eligible(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Split a comma-separated member list, dropping blanks
pub fn parse_members(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

/// Validated payload for the write sink; the store assigns `id` and `createdAt`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub class_code: String,
    pub group_name: String,
    pub members: Vec<String>,
    pub hypothesis: Hypothesis,
    pub conditions: Vec<ConditionSample>,
}

impl NewSubmission {
    /// Per-condition averages for the confirmation view
    pub fn condition_averages(&self) -> Vec<ConditionAverage> {
        condition_averages(&self.conditions)
    }
}
