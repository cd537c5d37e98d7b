// Precision ranking: groups ordered by the spread of their raw trials
//
// Each submission's trials are pooled across all of its conditions into one
// sample; a lower standard deviation ranks higher. Ties keep the source
// order (newest first), and submissions with fewer than two trial values
// cannot be ranked.

use crate::numeric::sample_std_dev;
use crate::record::{RecordId, SubmissionRecord};
use serde::Serialize;

/// One ranked submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecisionEntry {
    pub id: RecordId,
    pub class_code: String,
    pub group_name: String,
    /// Dispersion of all trial values pooled across conditions
    pub sd: f64,
    /// Number of trial values pooled
    pub trials: usize,
}

/// Rank filtered submissions by pooled trial dispersion, keeping `top_n`
pub fn precision_ranking(filtered: &[&SubmissionRecord], top_n: usize) -> Vec<PrecisionEntry> {
    let mut entries: Vec<PrecisionEntry> = filtered
        .iter()
        .filter_map(|record| {
            let trials = record.all_trials();
            let sd = sample_std_dev(&trials)?;
            Some(PrecisionEntry {
                id: record.id.clone(),
                class_code: record.class_code.clone(),
                group_name: record.group_name.clone(),
                sd,
                trials: trials.len(),
            })
        })
        .collect();

    // Vec::sort_by is stable
    entries.sort_by(|a, b| a.sd.total_cmp(&b.sd));
    entries.truncate(top_n);
    entries
}
