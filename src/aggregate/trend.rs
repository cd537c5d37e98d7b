// Mass/distance trend and the hypothesis tally scored against it
//
// The trend is pooled across groups: one point per condition label, x = mean
// cart mass, y = mean of the group averages. Each group's stated hypothesis
// is judged against the sign of that pooled slope, not against the group's
// own measurements.

use super::condition::averages_for_label;
use crate::numeric::{linear_regression, mean, LinearFit, Point};
use crate::record::{Hypothesis, SubmissionRecord};
use serde::Serialize;

/// Pooled mean mass and mean distance of one condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub mass: f64,
    pub distance: f64,
}

/// Trend points plus their least-squares fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
    pub fit: LinearFit,
}

impl Trend {
    /// Direction the data supports, `None` for a flat or undetermined slope
    pub fn supported_hypothesis(&self) -> Option<Hypothesis> {
        if self.fit.slope > 0.0 {
            Some(Hypothesis::Increase)
        } else if self.fit.slope < 0.0 {
            Some(Hypothesis::Decrease)
        } else {
            None
        }
    }
}

/// Build one point per label where both means exist, then fit a line
pub fn mass_distance_trend(filtered: &[&SubmissionRecord], labels: &[String]) -> Trend {
    let points: Vec<TrendPoint> = labels
        .iter()
        .filter_map(|label| {
            let masses: Vec<Option<f64>> = filtered
                .iter()
                .flat_map(|r| r.conditions.iter())
                .filter(|c| &c.label == label)
                .map(|c| c.mass)
                .collect();
            let mass = mean(&masses)?;
            let distance = mean(&averages_for_label(filtered, label))?;
            Some(TrendPoint {
                label: label.clone(),
                mass,
                distance,
            })
        })
        .collect();

    let xy: Vec<Point> = points
        .iter()
        .map(|p| Point {
            x: p.mass,
            y: p.distance,
        })
        .collect();

    Trend {
        fit: linear_regression(&xy),
        points,
    }
}

/// Counts of stated hypotheses and how many agree with the trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisTally {
    pub increase: usize,
    pub decrease: usize,
    pub total: usize,
    /// Submissions whose hypothesis matches the sign of the trend slope
    pub correct: usize,
    /// `correct / total`, missing when nothing was tallied
    pub correctness_rate: Option<f64>,
}

/// Tally filtered hypotheses (unset counts as `increase`) against `slope`
pub fn hypothesis_tally(filtered: &[&SubmissionRecord], slope: f64) -> HypothesisTally {
    let mut tally = HypothesisTally {
        increase: 0,
        decrease: 0,
        total: filtered.len(),
        correct: 0,
        correctness_rate: None,
    };

    for record in filtered {
        let hypothesis = record.stated_hypothesis();
        match hypothesis {
            Hypothesis::Increase => tally.increase += 1,
            Hypothesis::Decrease => tally.decrease += 1,
        }
        if hypothesis.agrees_with_slope(slope) {
            tally.correct += 1;
        }
    }

    if tally.total > 0 {
        tally.correctness_rate = Some(tally.correct as f64 / tally.total as f64);
    }
    tally
}
