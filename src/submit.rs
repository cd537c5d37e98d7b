//! Submission write path
//!
//! Drafts are validated before anything reaches the sink. A failed write is
//! logged once and returned; it is never retried here.

use crate::draft::{NewSubmission, SubmissionDraft, ValidationError};
use crate::record::{default_classes, RecordId};
use crate::stream::{StoreError, SubmissionSink};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Submission is not ready: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to save submission: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a successful submit
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub id: RecordId,
    pub payload: NewSubmission,
}

/// Validate `draft` and write it to `sink`
pub fn submit(sink: &dyn SubmissionSink, draft: &SubmissionDraft) -> Result<Submitted, SubmitError> {
    let payload = draft.validate()?;

    match sink.create_submission(&payload) {
        Ok(id) => {
            info!(id = %id, class = %payload.class_code, group = %payload.group_name, "submission saved");
            Ok(Submitted { id, payload })
        }
        Err(err) => {
            warn!(class = %payload.class_code, group = %payload.group_name, "submission write failed: {}", err);
            Err(err.into())
        }
    }
}

/// Upsert the preset class sections; stops at the first failure
pub fn seed_default_classes(sink: &dyn SubmissionSink) -> Result<usize, StoreError> {
    let classes = default_classes();
    for class in &classes {
        sink.upsert_class(&class.code, &class.name).map_err(|err| {
            warn!(code = %class.code, "class seeding failed: {}", err);
            err
        })?;
    }
    Ok(classes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Sink that records calls and fails on demand
    #[derive(Default)]
    struct RecordingSink {
        submissions: RefCell<Vec<NewSubmission>>,
        classes: RefCell<Vec<(String, String)>>,
        fail: Option<StoreError>,
    }

    impl SubmissionSink for RecordingSink {
        fn create_submission(&self, payload: &NewSubmission) -> Result<RecordId, StoreError> {
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            self.submissions.borrow_mut().push(payload.clone());
            Ok(RecordId::new("written"))
        }

        fn upsert_class(&self, code: &str, name: &str) -> Result<(), StoreError> {
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            self.classes
                .borrow_mut()
                .push((code.to_string(), name.to_string()));
            Ok(())
        }
    }

    fn ready_draft() -> SubmissionDraft {
        let mut draft = SubmissionDraft::with_default_conditions();
        draft.class_code = "P7".to_string();
        draft.group_name = "Team Zoom".to_string();
        for condition in &mut draft.conditions {
            condition.mass = "300".to_string();
            condition.trials = vec!["0.5".into(), "0.6".into(), "0.7".into()];
        }
        draft
    }

    #[test]
    fn test_submit_writes_validated_payload() {
        let sink = RecordingSink::default();
        let submitted = submit(&sink, &ready_draft()).unwrap();
        assert_eq!(submitted.id.as_str(), "written");
        assert_eq!(sink.submissions.borrow().len(), 1);
        assert_eq!(sink.submissions.borrow()[0], submitted.payload);
    }

    #[test]
    fn test_invalid_draft_never_reaches_sink() {
        let sink = RecordingSink::default();
        let mut draft = ready_draft();
        draft.group_name.clear();

        let err = submit(&sink, &draft).unwrap_err();
        assert_eq!(err, SubmitError::Invalid(ValidationError::MissingGroupName));
        assert!(sink.submissions.borrow().is_empty());
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let sink = RecordingSink {
            fail: Some(StoreError::Unavailable("offline".into())),
            ..RecordingSink::default()
        };
        let err = submit(&sink, &ready_draft()).unwrap_err();
        assert!(matches!(err, SubmitError::Store(StoreError::Unavailable(_))));
        assert_eq!(
            err.to_string(),
            "Failed to save submission: Record store unavailable: offline"
        );
    }

    #[test]
    fn test_seed_default_classes() {
        let sink = RecordingSink::default();
        assert_eq!(seed_default_classes(&sink).unwrap(), 6);
        let classes = sink.classes.borrow();
        assert_eq!(classes[0], ("P2".to_string(), "Period 2".to_string()));
        assert_eq!(classes[5].0, "P8");
    }

    #[test]
    fn test_seed_stops_on_failure() {
        let sink = RecordingSink {
            fail: Some(StoreError::Rejected("read-only".into())),
            ..RecordingSink::default()
        };
        assert!(seed_default_classes(&sink).is_err());
        assert!(sink.classes.borrow().is_empty());
    }
}
