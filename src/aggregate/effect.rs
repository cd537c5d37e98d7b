// Effect sizes of each condition relative to the control condition
//
// The control is the first label (in label-universe order) whose text
// contains the configured marker, case-insensitively. Each group contributes
// its condition `avg`; Cohen's d is computed control-vs-condition over the
// filtered set.

use super::condition::averages_for_label;
use crate::config::EngineConfig;
use crate::numeric::cohens_d;
use crate::record::SubmissionRecord;
use serde::Serialize;

/// Standardized difference of one condition from the control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSize {
    pub label: String,
    /// Positive when the condition rolls further than the control
    pub cohens_d: Option<f64>,
}

/// All effect sizes, empty when no control condition exists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectSizes {
    pub control_label: Option<String>,
    pub effects: Vec<EffectSize>,
}

/// Compare every non-control label against the control
pub fn effect_sizes_vs_control(
    filtered: &[&SubmissionRecord],
    labels: &[String],
    config: &EngineConfig,
) -> EffectSizes {
    let Some(control) = labels.iter().find(|l| config.is_control_label(l)) else {
        return EffectSizes::default();
    };

    let control_averages = averages_for_label(filtered, control);
    let effects = labels
        .iter()
        .filter(|label| *label != control)
        .map(|label| EffectSize {
            label: label.clone(),
            cohens_d: cohens_d(&control_averages, &averages_for_label(filtered, label)),
        })
        .collect();

    EffectSizes {
        control_label: Some(control.clone()),
        effects,
    }
}
