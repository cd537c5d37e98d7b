//! Property-based tests for the numeric helpers and the aggregation engine
//!
//! Core properties:
//! 1. Numeric parsing never yields non-finite values
//! 2. Means stay within the sample range
//! 3. Confidence intervals are symmetric around the mean
//! 4. derive_views is deterministic and its label universe ignores the filter
//! 5. Regression recovers exact lines

use cartlab::aggregate::derive_views;
use cartlab::config::EngineConfig;
use cartlab::filter::ActiveFilter;
use cartlab::numeric::{
    cohens_d, confidence_interval_95, linear_regression, mean, parse_numeric, sample_std_dev,
    Point,
};
use cartlab::record::{ConditionSample, Hypothesis, RecordId, SubmissionRecord};
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = SubmissionRecord> {
    (
        "[a-z]{4}",
        prop::sample::select(vec!["P2", "P3", "P4"]),
        any::<bool>(),
        prop::collection::vec(
            (
                prop::sample::select(vec!["Control", "3 washers", "5 bars"]),
                prop::option::of(200.0f64..400.0),
                prop::collection::vec(prop::option::of(0.0f64..3.0), 0..4),
            ),
            0..3,
        ),
    )
        .prop_map(|(id, class, increase, conditions)| SubmissionRecord {
            id: RecordId::new(id.clone()),
            class_code: class.to_string(),
            group_name: id,
            members: vec![],
            hypothesis: Some(if increase {
                Hypothesis::Increase
            } else {
                Hypothesis::Decrease
            }),
            conditions: conditions
                .into_iter()
                .map(|(label, mass, trials)| ConditionSample::new(label, mass, trials))
                .collect(),
            created_at: None,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_parse_numeric_never_non_finite(raw in ".{0,12}") {
        // Property: parsed values are always usable numbers
        if let Some(v) = parse_numeric(&raw) {
            prop_assert!(v.is_finite());
        }
    }

    #[test]
    fn prop_parse_numeric_accepts_decimal_comma(whole in 0u32..1000, frac in 0u32..100) {
        let dotted = parse_numeric(&format!("{}.{:02}", whole, frac));
        let commaed = parse_numeric(&format!("{},{:02}", whole, frac));
        prop_assert_eq!(dotted, commaed);
        prop_assert!(dotted.is_some());
    }

    #[test]
    fn prop_mean_within_bounds(xs in prop::collection::vec(-1e6f64..1e6, 1..50)) {
        let m = mean(&xs).unwrap();
        let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(m >= lo - 1e-6 && m <= hi + 1e-6);
    }

    #[test]
    fn prop_missing_values_ignored(xs in prop::collection::vec(prop::option::of(0.0f64..10.0), 0..30)) {
        let present: Vec<f64> = xs.iter().filter_map(|x| *x).collect();
        prop_assert_eq!(mean(&xs), mean(&present));
        prop_assert_eq!(sample_std_dev(&xs), sample_std_dev(&present));
    }

    #[test]
    fn prop_std_dev_non_negative(xs in prop::collection::vec(-100.0f64..100.0, 2..30)) {
        prop_assert!(sample_std_dev(&xs).unwrap() >= 0.0);
    }

    #[test]
    fn prop_confidence_interval_symmetric(xs in prop::collection::vec(0.0f64..5.0, 1..30)) {
        let m = mean(&xs).unwrap();
        let ci = confidence_interval_95(&xs).unwrap();
        prop_assert!(ci.low <= m && m <= ci.high);
        prop_assert!(((m - ci.low) - (ci.high - m)).abs() < 1e-9);
    }

    #[test]
    fn prop_regression_recovers_exact_line(
        slope in -5.0f64..5.0,
        intercept in -10.0f64..10.0,
        xs in prop::collection::btree_set(0i32..500, 2..20),
    ) {
        let points: Vec<Point> = xs
            .iter()
            .map(|&x| Point { x: x as f64, y: slope * x as f64 + intercept })
            .collect();
        let fit = linear_regression(&points);
        prop_assert!((fit.slope - slope).abs() < 1e-6);
        prop_assert!((fit.intercept - intercept).abs() < 1e-4);
    }

    #[test]
    fn prop_cohens_d_antisymmetric(
        a in prop::collection::vec(0.0f64..5.0, 2..10),
        b in prop::collection::vec(0.0f64..5.0, 2..10),
    ) {
        match (cohens_d(&a, &b), cohens_d(&b, &a)) {
            (Some(ab), Some(ba)) => prop_assert!((ab + ba).abs() < 1e-9),
            (None, None) => {}
            other => prop_assert!(false, "asymmetric availability: {:?}", other),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_derive_views_deterministic(
        records in prop::collection::vec(record_strategy(), 0..8),
        class in prop::sample::select(vec!["ALL", "P2", "P3", "P9"]),
    ) {
        let filter = ActiveFilter::from_selection(class);
        let config = EngineConfig::default();
        prop_assert_eq!(
            derive_views(&records, &filter, &config),
            derive_views(&records, &filter, &config)
        );
    }

    #[test]
    fn prop_label_universe_ignores_filter(
        records in prop::collection::vec(record_strategy(), 0..8),
        class in prop::sample::select(vec!["P2", "P3", "P9"]),
    ) {
        let config = EngineConfig::default();
        let all = derive_views(&records, &ActiveFilter::All, &config);
        let narrowed = derive_views(&records, &ActiveFilter::from_selection(class), &config);
        prop_assert_eq!(&all.condition_labels, &narrowed.condition_labels);
        prop_assert_eq!(&all.class_codes, &narrowed.class_codes);
        prop_assert!(narrowed.filtered_records <= all.filtered_records);
    }

    #[test]
    fn prop_precision_ranking_sorted_and_bounded(
        records in prop::collection::vec(record_strategy(), 0..15),
    ) {
        let views = derive_views(&records, &ActiveFilter::All, &EngineConfig::default());
        prop_assert!(views.precision_ranking.len() <= 10);
        for pair in views.precision_ranking.windows(2) {
            prop_assert!(pair[0].sd <= pair[1].sd);
        }
    }

    #[test]
    fn prop_hypothesis_tally_consistent(
        records in prop::collection::vec(record_strategy(), 0..10),
    ) {
        let views = derive_views(&records, &ActiveFilter::All, &EngineConfig::default());
        let tally = &views.hypotheses;
        prop_assert_eq!(tally.increase + tally.decrease, tally.total);
        prop_assert!(tally.correct <= tally.total);
        prop_assert_eq!(tally.correctness_rate.is_none(), tally.total == 0);
    }
}
