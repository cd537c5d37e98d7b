//! Submission and class records
//!
//! These are the shapes exchanged with the record store. Field names on the
//! wire are camelCase (`classCode`, `groupName`, `createdAt`, ...) and form the
//! persisted contract.
//!
//! A condition's `avg` and `sd` are written out on serialization but never
//! stored in [`ConditionSample`]: on read they are discarded and re-derived
//! from `trials`, so the two can never drift apart.

use crate::numeric::{mean, parse_numeric, sample_std_dev};
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Labels every new submission starts with, in display order
pub const DEFAULT_CONDITION_LABELS: [&str; 4] = [
    "Control (no added mass)",
    "3 washers",
    "5 bars",
    "3 washers + 5 bars",
];

/// Opaque record identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Predicted effect of added cart mass on roll distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hypothesis {
    #[default]
    Increase,
    Decrease,
}

impl Hypothesis {
    pub fn as_str(self) -> &'static str {
        match self {
            Hypothesis::Increase => "increase",
            Hypothesis::Decrease => "decrease",
        }
    }

    /// Whether this direction agrees with the sign of an observed slope.
    ///
    /// A flat slope confirms neither direction.
    pub fn agrees_with_slope(self, slope: f64) -> bool {
        match self {
            Hypothesis::Increase => slope > 0.0,
            Hypothesis::Decrease => slope < 0.0,
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One experimental condition: a cart mass and repeated distance trials
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireCondition")]
pub struct ConditionSample {
    pub label: String,
    /// Cart mass in grams
    pub mass: Option<f64>,
    /// Roll distances in metres, in trial order
    pub trials: Vec<Option<f64>>,
}

impl ConditionSample {
    pub fn new(label: impl Into<String>, mass: Option<f64>, trials: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            mass,
            trials,
        }
    }

    /// Mean distance over the finite trials
    pub fn avg(&self) -> Option<f64> {
        mean(&self.trials)
    }

    /// Dispersion of the finite trials (population formula, see [`crate::numeric`])
    pub fn sd(&self) -> Option<f64> {
        sample_std_dev(&self.trials)
    }

    /// Trial values that are present and finite
    pub fn observed_trials(&self) -> impl Iterator<Item = f64> + '_ {
        self.trials.iter().filter_map(|t| *t).filter(|t| t.is_finite())
    }
}

impl Serialize for ConditionSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ConditionSample", 5)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("mass", &self.mass)?;
        state.serialize_field("trials", &self.trials)?;
        state.serialize_field("avg", &self.avg())?;
        state.serialize_field("sd", &self.sd())?;
        state.end()
    }
}

/// Number as it may appear in stored documents: a JSON number, a numeric
/// string, or something unusable
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredNumber {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

impl StoredNumber {
    fn into_value(self) -> Option<f64> {
        match self {
            StoredNumber::Number(n) if n.is_finite() => Some(n),
            StoredNumber::Text(raw) => parse_numeric(&raw),
            _ => None,
        }
    }
}

// Stored `avg`/`sd` are unknown fields here and get dropped
#[derive(Deserialize)]
struct WireCondition {
    label: String,
    #[serde(default)]
    mass: Option<StoredNumber>,
    #[serde(default)]
    trials: Vec<Option<StoredNumber>>,
}

impl From<WireCondition> for ConditionSample {
    fn from(wire: WireCondition) -> Self {
        Self {
            label: wire.label,
            mass: wire.mass.and_then(StoredNumber::into_value),
            trials: wire
                .trials
                .into_iter()
                .map(|t| t.and_then(StoredNumber::into_value))
                .collect(),
        }
    }
}

/// `null` reads the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHypothesis {
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

// Case and surrounding whitespace are ignored; anything else counts as unset
fn lenient_hypothesis<'de, D>(deserializer: D) -> Result<Option<Hypothesis>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<StoredHypothesis>::deserialize(deserializer)?;
    Ok(match stored {
        Some(StoredHypothesis::Text(raw)) => match raw.trim().to_lowercase().as_str() {
            "increase" => Some(Hypothesis::Increase),
            "decrease" => Some(Hypothesis::Decrease),
            _ => None,
        },
        _ => None,
    })
}

/// A group's complete submission, immutable once stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: RecordId,
    /// Uppercase class code, e.g. `P2`
    #[serde(default, deserialize_with = "null_as_default")]
    pub class_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
    /// Stated hypothesis; older documents may not carry one
    #[serde(
        default,
        deserialize_with = "lenient_hypothesis",
        skip_serializing_if = "Option::is_none"
    )]
    pub hypothesis: Option<Hypothesis>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<ConditionSample>,
    /// Server-assigned; pending writes may not have one yet
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    /// Hypothesis used for tallying: unset counts as `increase`
    pub fn stated_hypothesis(&self) -> Hypothesis {
        self.hypothesis.unwrap_or_default()
    }

    /// Every present trial value across all conditions, in order
    pub fn all_trials(&self) -> Vec<f64> {
        self.conditions
            .iter()
            .flat_map(|c| c.observed_trials())
            .collect()
    }

    /// Per-condition averages in condition order (student result view)
    pub fn condition_averages(&self) -> Vec<ConditionAverage> {
        condition_averages(&self.conditions)
    }
}

/// Label and mean distance of one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionAverage {
    pub label: String,
    pub average: Option<f64>,
}

/// Averages of `conditions` in their given order
pub fn condition_averages(conditions: &[ConditionSample]) -> Vec<ConditionAverage> {
    conditions
        .iter()
        .map(|c| ConditionAverage {
            label: c.label.clone(),
            average: c.avg(),
        })
        .collect()
}

/// A class section students submit under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl ClassRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Name for selectors, falling back to the code
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// Preset class sections seeded by the instructor workflow
pub fn default_classes() -> Vec<ClassRecord> {
    ["P2", "P3", "P4", "P6", "P7", "P8"]
        .iter()
        .map(|code| ClassRecord::new(*code, format!("Period {}", &code[1..])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_avg_sd_derived_from_trials() {
        let c = ConditionSample::new("Control", Some(250.0), vec![Some(1.0), Some(1.1), Some(0.9)]);
        assert!((c.avg().unwrap() - 1.0).abs() < 1e-12);
        assert!(c.sd().unwrap() > 0.0);
        // Same trials, same derived values
        assert_eq!(c.avg(), c.clone().avg());
        assert_eq!(c.sd(), c.clone().sd());
    }

    #[test]
    fn test_condition_single_trial_has_no_sd() {
        let c = ConditionSample::new("5 bars", None, vec![Some(0.7), None, None]);
        assert_eq!(c.avg(), Some(0.7));
        assert_eq!(c.sd(), None);
    }

    #[test]
    fn test_condition_serializes_derived_fields() {
        let c = ConditionSample::new("3 washers", Some(280.0), vec![Some(0.8), Some(0.8)]);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["label"], "3 washers");
        assert_eq!(json["mass"], 280.0);
        assert_eq!(json["avg"], 0.8);
        assert_eq!(json["sd"], 0.0);
    }

    #[test]
    fn test_condition_ignores_stored_avg_and_sd() {
        let json = r#"{"label":"Control","mass":250,"trials":[1.0,1.2],"avg":99.0,"sd":{"sd":1}}"#;
        let c: ConditionSample = serde_json::from_str(json).unwrap();
        assert!((c.avg().unwrap() - 1.1).abs() < 1e-12);
        assert!((c.sd().unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_condition_lenient_numbers() {
        let json = r#"{"label":"Control","mass":"250,5","trials":[null,"1,2","",true,0.9]}"#;
        let c: ConditionSample = serde_json::from_str(json).unwrap();
        assert_eq!(c.mass, Some(250.5));
        assert_eq!(c.trials, vec![None, Some(1.2), None, None, Some(0.9)]);
    }

    #[test]
    fn test_submission_wire_field_names() {
        let json = r#"{
            "id": "abc",
            "classCode": "P2",
            "groupName": "Rockets",
            "members": ["Alex", "Bo"],
            "hypothesis": "decrease",
            "conditions": [{"label": "Control", "mass": 250, "trials": [1.0, 1.1, 0.9]}],
            "createdAt": "2026-03-02T10:00:00Z"
        }"#;
        let record: SubmissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "abc");
        assert_eq!(record.class_code, "P2");
        assert_eq!(record.hypothesis, Some(Hypothesis::Decrease));
        assert!(record.created_at.is_some());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["groupName"], "Rockets");
        let avg = back["conditions"][0]["avg"].as_f64().unwrap();
        assert!((avg - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_submission_missing_hypothesis_defaults_to_increase() {
        let json = r#"{"id": "x", "classCode": "P3"}"#;
        let record: SubmissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.hypothesis, None);
        assert_eq!(record.stated_hypothesis(), Hypothesis::Increase);
        assert!(record.conditions.is_empty());
    }

    #[test]
    fn test_submission_tolerates_nulls_and_odd_hypotheses() {
        let json = r#"[
            {"id": "a", "classCode": null, "groupName": null, "members": null, "conditions": null},
            {"id": "b", "classCode": "P2", "hypothesis": "Decrease "},
            {"id": "c", "classCode": "P2", "hypothesis": "sideways"},
            {"id": "d", "classCode": "P2", "hypothesis": 3}
        ]"#;
        let records: Vec<SubmissionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].class_code, "");
        assert_eq!(records[0].group_name, "");
        assert!(records[0].members.is_empty());
        assert!(records[0].conditions.is_empty());

        assert_eq!(records[1].hypothesis, Some(Hypothesis::Decrease));
        assert_eq!(records[2].hypothesis, None);
        assert_eq!(records[2].stated_hypothesis(), Hypothesis::Increase);
        assert_eq!(records[3].hypothesis, None);
    }

    #[test]
    fn test_non_finite_trials_never_observed() {
        let c = ConditionSample::new(
            "Control",
            None,
            vec![Some(1.0), Some(f64::NAN), Some(f64::INFINITY), None, Some(2.0)],
        );
        assert_eq!(c.observed_trials().collect::<Vec<_>>(), vec![1.0, 2.0]);

        let record = SubmissionRecord {
            id: RecordId::new("nan"),
            class_code: "P2".to_string(),
            group_name: String::new(),
            members: vec![],
            hypothesis: None,
            conditions: vec![c],
            created_at: None,
        };
        assert_eq!(record.all_trials(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_hypothesis_agrees_with_slope() {
        assert!(Hypothesis::Increase.agrees_with_slope(0.5));
        assert!(!Hypothesis::Increase.agrees_with_slope(-0.5));
        assert!(Hypothesis::Decrease.agrees_with_slope(-0.01));
        assert!(!Hypothesis::Decrease.agrees_with_slope(0.0));
        assert!(!Hypothesis::Increase.agrees_with_slope(0.0));
    }

    #[test]
    fn test_default_classes() {
        let classes = default_classes();
        let codes: Vec<&str> = classes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["P2", "P3", "P4", "P6", "P7", "P8"]);
        assert_eq!(classes[0].name, "Period 2");
    }

    #[test]
    fn test_class_display_name_falls_back_to_code() {
        assert_eq!(ClassRecord::new("P9", "").display_name(), "P9");
        assert_eq!(ClassRecord::new("P2", "Period 2").display_name(), "Period 2");
    }

    #[test]
    fn test_condition_averages_in_order() {
        let conditions = vec![
            ConditionSample::new("Control", Some(250.0), vec![Some(1.0)]),
            ConditionSample::new("5 bars", Some(400.0), vec![None]),
        ];
        let averages = condition_averages(&conditions);
        assert_eq!(averages[0].label, "Control");
        assert_eq!(averages[0].average, Some(1.0));
        assert_eq!(averages[1].average, None);
    }
}
