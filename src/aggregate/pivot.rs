// Cross-class comparison table
//
// One row per condition label, one cell per class code seen anywhere in the
// data. With the ALL filter every cell holds that class's mean; with a
// single-class filter only that class's column is populated and every other
// cell is left missing.

use super::condition::averages_for_label;
use crate::filter::ActiveFilter;
use crate::numeric::mean;
use crate::record::SubmissionRecord;
use serde::Serialize;

/// Mean of group averages for one (label, class) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCell {
    pub class_code: String,
    /// Missing when the filter excludes the class or it has no data for the
    /// label; a bar chart of the table draws missing cells as 0
    pub mean: Option<f64>,
}

/// All class cells for one condition label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub cells: Vec<ComparisonCell>,
}

impl ComparisonRow {
    /// Cell value for `class_code`, missing if unpopulated or unknown
    pub fn get(&self, class_code: &str) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.class_code == class_code)
            .and_then(|c| c.mean)
    }
}

/// Condition × class pivot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    /// Column order, shared by every row
    pub class_codes: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

/// Pivot condition averages by class under the active filter
pub fn cross_class_comparison(
    records: &[SubmissionRecord],
    labels: &[String],
    class_codes: &[String],
    filter: &ActiveFilter,
) -> ComparisonTable {
    let by_class: Vec<(&String, Vec<&SubmissionRecord>)> = class_codes
        .iter()
        .map(|code| {
            let members = if filter.includes_class(code) {
                records.iter().filter(|r| &r.class_code == code).collect()
            } else {
                Vec::new()
            };
            (code, members)
        })
        .collect();

    let rows = labels
        .iter()
        .map(|label| ComparisonRow {
            label: label.clone(),
            cells: by_class
                .iter()
                .map(|(code, members)| ComparisonCell {
                    class_code: (*code).clone(),
                    mean: mean(&averages_for_label(members, label)),
                })
                .collect(),
        })
        .collect();

    ComparisonTable {
        class_codes: class_codes.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ConditionSample, RecordId};

    fn record(class_code: &str, avg: f64) -> SubmissionRecord {
        SubmissionRecord {
            id: RecordId::generate(),
            class_code: class_code.to_string(),
            group_name: String::new(),
            members: vec![],
            hypothesis: None,
            conditions: vec![ConditionSample::new("Control", Some(250.0), vec![Some(avg)])],
            created_at: None,
        }
    }

    fn fixture() -> (Vec<SubmissionRecord>, Vec<String>, Vec<String>) {
        let records = vec![record("P2", 1.0), record("P3", 2.0), record("P2", 1.5)];
        (
            records,
            vec!["Control".to_string(), "5 bars".to_string()],
            vec!["P2".to_string(), "P3".to_string()],
        )
    }

    #[test]
    fn test_all_filter_populates_every_class() {
        let (records, labels, codes) = fixture();
        let table = cross_class_comparison(&records, &labels, &codes, &ActiveFilter::All);
        assert_eq!(table.class_codes, codes);
        assert_eq!(table.rows[0].get("P2"), Some(1.25));
        assert_eq!(table.rows[0].get("P3"), Some(2.0));
        assert_eq!(table.rows[1].get("P2"), None);
    }

    #[test]
    fn test_class_filter_populates_only_that_column() {
        let (records, labels, codes) = fixture();
        let filter = ActiveFilter::Class("P3".to_string());
        let table = cross_class_comparison(&records, &labels, &codes, &filter);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[0].get("P2"), None);
        assert_eq!(table.rows[0].get("P3"), Some(2.0));
    }

    #[test]
    fn test_unknown_filter_leaves_table_empty_but_shaped() {
        let (records, labels, codes) = fixture();
        let filter = ActiveFilter::Class("P9".to_string());
        let table = cross_class_comparison(&records, &labels, &codes, &filter);
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|r| r.cells.iter().all(|c| c.mean.is_none())));
    }
}
