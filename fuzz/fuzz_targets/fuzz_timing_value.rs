#![no_main]

use libfuzzer_sys::fuzz_target;
use shadowcue::catalog::timing::parse_value;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(value) = parse_value(raw) {
            assert!(value.is_finite());
        }
    }
});
