#![no_main]

use cartlab::aggregate::derive_views;
use cartlab::config::EngineConfig;
use cartlab::filter::ActiveFilter;
use cartlab::record::SubmissionRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed stored documents must never panic the engine
    if let Ok(records) = serde_json::from_slice::<Vec<SubmissionRecord>>(data) {
        let config = EngineConfig::default();
        let views = derive_views(&records, &ActiveFilter::All, &config);
        assert_eq!(views.total_records, records.len());
        if let Some(first) = records.first() {
            let _ = derive_views(&records, &ActiveFilter::from_selection(&first.class_code), &config);
        }
    }
});
