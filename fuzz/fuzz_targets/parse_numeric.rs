#![no_main]

use cartlab::numeric::parse_numeric;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Anything accepted must be a usable number
        if let Some(value) = parse_numeric(input) {
            assert!(value.is_finite());
        }
    }
});
