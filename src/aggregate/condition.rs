// Per-condition statistics and raw strip-plot samples

use crate::numeric::{confidence_interval, mean, standard_error, ConfidenceInterval};
use crate::record::SubmissionRecord;
use serde::Serialize;

/// Summary of one condition's group averages within the filtered set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionStats {
    pub label: String,
    /// Mean of the contributing group averages
    pub mean: Option<f64>,
    pub standard_error: Option<f64>,
    pub confidence_interval: Option<ConfidenceInterval>,
    /// Number of group averages that contributed
    pub n: usize,
}

/// One raw trial value, tagged with its condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripSample {
    pub label: String,
    pub value: f64,
}

/// Present `avg` values of every condition named `label`, in source order
pub(crate) fn averages_for_label(records: &[&SubmissionRecord], label: &str) -> Vec<f64> {
    records
        .iter()
        .flat_map(|r| r.conditions.iter())
        .filter(|c| c.label == label)
        .filter_map(|c| c.avg())
        .collect()
}

/// Statistics for each label over the filtered records.
///
/// Every label gets a row, even when no filtered submission uses it (then
/// `n` is 0 and all statistics are missing).
pub fn per_condition_stats(
    filtered: &[&SubmissionRecord],
    labels: &[String],
    z: f64,
) -> Vec<ConditionStats> {
    labels
        .iter()
        .map(|label| {
            let averages = averages_for_label(filtered, label);
            ConditionStats {
                label: label.clone(),
                mean: mean(&averages),
                standard_error: standard_error(&averages),
                confidence_interval: confidence_interval(&averages, z),
                n: averages.len(),
            }
        })
        .collect()
}

/// Every present trial value of every condition of every filtered record
pub fn strip_plot_samples(filtered: &[&SubmissionRecord]) -> Vec<StripSample> {
    filtered
        .iter()
        .flat_map(|r| r.conditions.iter())
        .flat_map(|c| {
            c.observed_trials().map(move |value| StripSample {
                label: c.label.clone(),
                value,
            })
        })
        .collect()
}
