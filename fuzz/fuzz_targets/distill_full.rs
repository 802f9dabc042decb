#![no_main]

use std::sync::Arc;

use distill::{DistillerConfig, SafeFilter, distill};
use libfuzzer_sys::fuzz_target;

// Full-document path: must never panic, and sanitizing sanitized output
// must be a fixed point.
fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let config = DistillerConfig::default();
    let once = distill(&input, &config, Arc::new(SafeFilter));
    let twice = distill(&once, &config, Arc::new(SafeFilter));
    assert_eq!(once, twice, "distill must be idempotent");
});
