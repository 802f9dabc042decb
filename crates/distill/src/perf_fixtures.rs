//! Shared input builders for benches and perf-oriented tests.

/// Repeated block markup with attributes, styles, and text.
pub fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(blocks * 64);
    for i in 0..blocks {
        out.push_str("<div class=box><span style=\"color:red\">item ");
        out.push_str(&i.to_string());
        out.push_str("</span> &amp; more</div>");
    }
    out
}

/// Deeply mismatched nesting to stress the balance-repair path.
pub fn make_mismatched(depth: usize) -> String {
    let mut out = String::with_capacity(depth * 16);
    for _ in 0..depth {
        out.push_str("<b><i><u>");
    }
    out.push_str("text");
    for _ in 0..depth {
        out.push_str("</b></i></u>");
    }
    out
}

/// One long unbroken word, for the word-break and truncation paths.
pub fn make_long_word(len: usize) -> String {
    "x".repeat(len)
}
