// Complete dashboard derivation: deriveViews(records, filter) -> views

use super::condition::{per_condition_stats, strip_plot_samples, ConditionStats, StripSample};
use super::effect::{effect_sizes_vs_control, EffectSizes};
use super::labels::{class_code_universe, condition_label_universe};
use super::pivot::{cross_class_comparison, ComparisonTable};
use super::precision::{precision_ranking, PrecisionEntry};
use super::tables::{submission_rows, SubmissionRow};
use super::trend::{hypothesis_tally, mass_distance_trend, HypothesisTally, Trend};
use crate::config::EngineConfig;
use crate::filter::ActiveFilter;
use crate::record::SubmissionRecord;
use serde::Serialize;

/// Every derived view for one (records, filter) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub filter: ActiveFilter,
    pub total_records: usize,
    pub filtered_records: usize,
    /// Condition labels across all records, independent of the filter
    pub condition_labels: Vec<String>,
    /// Class codes across all records, independent of the filter
    pub class_codes: Vec<String>,
    pub condition_stats: Vec<ConditionStats>,
    pub trend: Trend,
    pub hypotheses: HypothesisTally,
    pub precision_ranking: Vec<PrecisionEntry>,
    pub strip_plot: Vec<StripSample>,
    pub effect_sizes: EffectSizes,
    pub comparison: ComparisonTable,
    pub submissions: Vec<SubmissionRow>,
}

impl DashboardViews {
    /// Statistics row for `label`
    pub fn condition(&self, label: &str) -> Option<&ConditionStats> {
        self.condition_stats.iter().find(|s| s.label == label)
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "📊 Dashboard for {} ({} of {} submissions)\n\n",
            self.filter, self.filtered_records, self.total_records
        ));

        report.push_str("Average distance by condition:\n");
        for stats in &self.condition_stats {
            let mean = fmt_value(stats.mean);
            let ci = match stats.confidence_interval {
                Some(ci) => format!("[{:.3}, {:.3}]", ci.low, ci.high),
                None => "–".to_string(),
            };
            report.push_str(&format!(
                "  {:<28} mean={:>7} se={:>7} ci={} n={}\n",
                stats.label,
                mean,
                fmt_value(stats.standard_error),
                ci,
                stats.n
            ));
        }

        report.push_str(&format!(
            "\nTrend: slope={:.5} m/g, intercept={:.3}, r²={:.3} ({} points)\n",
            self.trend.fit.slope,
            self.trend.fit.intercept,
            self.trend.fit.r2,
            self.trend.points.len()
        ));
        if let Some(direction) = self.trend.supported_hypothesis() {
            report.push_str(&format!("Data supports: {}\n", direction));
        }

        let rate = self
            .hypotheses
            .correctness_rate
            .map(|r| format!("{:.0}%", r * 100.0))
            .unwrap_or_else(|| "–".to_string());
        report.push_str(&format!(
            "Hypotheses: increase={} decrease={} correct={}/{} ({})\n",
            self.hypotheses.increase,
            self.hypotheses.decrease,
            self.hypotheses.correct,
            self.hypotheses.total,
            rate
        ));

        if let Some(control) = &self.effect_sizes.control_label {
            report.push_str(&format!("\nEffect sizes vs '{}':\n", control));
            for effect in &self.effect_sizes.effects {
                report.push_str(&format!(
                    "  {:<28} d={}\n",
                    effect.label,
                    fmt_value(effect.cohens_d)
                ));
            }
        }

        if !self.precision_ranking.is_empty() {
            report.push_str("\n🎯 Most precise groups:\n");
            for (rank, entry) in self.precision_ranking.iter().enumerate() {
                report.push_str(&format!(
                    "  {:>2}. {} ({}) sd={:.3} over {} trials\n",
                    rank + 1,
                    entry.group_name,
                    entry.class_code,
                    entry.sd,
                    entry.trials
                ));
            }
        }

        report
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "–".to_string())
}

/// Derive every dashboard view from the full record set and the filter.
///
/// Pure and deterministic: calling it twice with the same inputs yields
/// identical output.
///
/// # Example
/// ```
/// use cartlab::aggregate::derive_views;
/// use cartlab::config::EngineConfig;
/// use cartlab::filter::ActiveFilter;
///
/// let views = derive_views(&[], &ActiveFilter::All, &EngineConfig::default());
/// assert_eq!(views.filtered_records, 0);
/// assert!(views.condition_stats.is_empty());
/// ```
pub fn derive_views(
    records: &[SubmissionRecord],
    filter: &ActiveFilter,
    config: &EngineConfig,
) -> DashboardViews {
    let filtered = filter.apply(records);
    let condition_labels = condition_label_universe(records);
    let class_codes = class_code_universe(records);

    let trend = mass_distance_trend(&filtered, &condition_labels);
    let hypotheses = hypothesis_tally(&filtered, trend.fit.slope);

    DashboardViews {
        filter: filter.clone(),
        total_records: records.len(),
        filtered_records: filtered.len(),
        condition_stats: per_condition_stats(&filtered, &condition_labels, config.confidence_z),
        precision_ranking: precision_ranking(&filtered, config.precision_top_n),
        strip_plot: strip_plot_samples(&filtered),
        effect_sizes: effect_sizes_vs_control(&filtered, &condition_labels, config),
        comparison: cross_class_comparison(records, &condition_labels, &class_codes, filter),
        submissions: submission_rows(&filtered),
        trend,
        hypotheses,
        condition_labels,
        class_codes,
    }
}
