#![no_main]

use std::sync::Arc;

use distill::{Distiller, DistillerConfig, UnsafeFilter, distill};
use libfuzzer_sys::fuzz_target;

// Chunked/incremental path: feeding the input in pieces must match the
// single-shot result exactly. The first byte seeds the chunk width.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let width = usize::from(data[0] % 16) + 1;
    let input = String::from_utf8_lossy(&data[1..]).into_owned();
    let config = DistillerConfig::default();

    let expected = distill(&input, &config, Arc::new(UnsafeFilter));

    let mut distiller = Distiller::new(Arc::new(UnsafeFilter));
    distiller.begin_incremental_parsing();
    let mut rest = input.as_str();
    while !rest.is_empty() {
        let mut cut = width.min(rest.len());
        while !rest.is_char_boundary(cut) {
            cut += 1;
        }
        let (chunk, tail) = rest.split_at(cut);
        distiller.append_source(chunk);
        let _ = distiller.parse();
        rest = tail;
    }
    distiller.end_incremental_parsing();
    let _ = distiller.parse();
    assert_eq!(
        distiller.take_output(),
        expected,
        "chunked parse diverged from single-shot"
    );
});
