#![no_main]

use std::sync::Arc;

use distill::{
    DistillerConfig, HtmlFilter, SafeFilter, StripFilter, StrictFilter, UnsafeFilter,
    WordBreakFilter, distill,
};
use libfuzzer_sys::fuzz_target;

// Every policy and config corner must hold up against arbitrary input
// without panicking; whitelist policies must never leak script markup.
fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let filters: [(Arc<dyn HtmlFilter>, bool); 5] = [
        (Arc::new(StripFilter), true),
        (Arc::new(StrictFilter), true),
        (Arc::new(SafeFilter), true),
        (Arc::new(UnsafeFilter), false),
        (Arc::new(WordBreakFilter::new(8, Arc::new(SafeFilter))), true),
    ];

    let mut truncating = DistillerConfig::default();
    truncating.max_length = 32;
    let mut encoding = DistillerConfig::default();
    encoding.encode_non_ascii = true;
    encoding.normalize_whitespace = false;
    let configs = [DistillerConfig::default(), truncating, encoding];

    for (filter, whitelisting) in &filters {
        for config in &configs {
            let out = distill(&input, config, Arc::clone(filter));
            if *whitelisting {
                let lower = out.to_ascii_lowercase();
                assert!(!lower.contains("<script"), "script leaked: {out:?}");
            }
        }
    }
});
