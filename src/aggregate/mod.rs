// Aggregation engine for the instructor dashboard
//
// Turns the full submission set plus the active class filter into every
// derived view the dashboard shows. All functions are pure: the same
// (records, filter, config) triple always yields identical views, and no
// view is stored anywhere except as a snapshot handed to the presentation
// layer.
//
// Views:
// - Per-condition statistics (mean, standard error, 95% CI, n)
// - Mass/distance trend with a least-squares fit
// - Hypothesis tally scored against the pooled trend
// - Precision ranking of groups by trial dispersion
// - Strip-plot samples (raw trial values)
// - Effect sizes of each condition against the control
// - Cross-class comparison table
// - Flattened submission rows and per-class tab counts

mod condition;
mod effect;
mod labels;
mod pivot;
mod precision;
mod tables;
mod trend;
mod views;

pub use condition::{per_condition_stats, strip_plot_samples, ConditionStats, StripSample};
pub use effect::{effect_sizes_vs_control, EffectSize, EffectSizes};
pub use labels::{class_code_universe, condition_label_universe};
pub use pivot::{cross_class_comparison, ComparisonCell, ComparisonRow, ComparisonTable};
pub use precision::{precision_ranking, PrecisionEntry};
pub use tables::{class_tabs, submission_rows, ClassTab, ClassTabs, SubmissionRow};
pub use trend::{hypothesis_tally, mass_distance_trend, HypothesisTally, Trend, TrendPoint};
pub use views::{derive_views, DashboardViews};
