// Distinct condition labels and class codes, in first-seen order
//
// Both universes are computed over the full record set, never the filtered
// one, so dashboard columns stay put while the class filter changes.

use crate::record::SubmissionRecord;
use std::collections::HashSet;

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

/// Every condition label used by any submission
pub fn condition_label_universe(records: &[SubmissionRecord]) -> Vec<String> {
    distinct_in_order(
        records
            .iter()
            .flat_map(|r| r.conditions.iter().map(|c| c.label.as_str())),
    )
}

/// Every class code any submission was filed under
pub fn class_code_universe(records: &[SubmissionRecord]) -> Vec<String> {
    distinct_in_order(records.iter().map(|r| r.class_code.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ConditionSample, RecordId};

    fn record(class_code: &str, labels: &[&str]) -> SubmissionRecord {
        SubmissionRecord {
            id: RecordId::generate(),
            class_code: class_code.to_string(),
            group_name: String::new(),
            members: vec![],
            hypothesis: None,
            conditions: labels
                .iter()
                .map(|l| ConditionSample::new(*l, None, vec![]))
                .collect(),
            created_at: None,
        }
    }

    #[test]
    fn test_labels_deduplicated_first_seen_order() {
        let records = vec![
            record("P2", &["Control", "3 washers"]),
            record("P3", &["5 bars", "Control"]),
        ];
        assert_eq!(
            condition_label_universe(&records),
            vec!["Control", "3 washers", "5 bars"]
        );
    }

    #[test]
    fn test_labels_compared_exactly() {
        let records = vec![record("P2", &["Control", "control", "Control "])];
        assert_eq!(condition_label_universe(&records).len(), 3);
    }

    #[test]
    fn test_class_codes_deduplicated() {
        let records = vec![record("P3", &[]), record("P2", &[]), record("P3", &[])];
        assert_eq!(class_code_universe(&records), vec!["P3", "P2"]);
        assert!(class_code_universe(&[]).is_empty());
    }
}
