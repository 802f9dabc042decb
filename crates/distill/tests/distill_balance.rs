//! Tag-balance repair behavior.

use std::sync::Arc;

use distill::{DistillerConfig, UnsafeFilter, distill};

fn run(input: &str) -> String {
    distill(input, &DistillerConfig::default(), Arc::new(UnsafeFilter))
}

#[test]
fn matched_nesting_passes_through() {
    assert_eq!(run("<b><i>x</i></b>"), "<b><i>x</i></b>");
}

#[test]
fn single_mismatch_is_repaired() {
    assert_eq!(run("<b><i>text</b></i>"), "<b><i>text</i></b><i></i>");
}

#[test]
fn balancing_reopens_multiple_ancestors_in_original_order() {
    // Closing the outermost tag closes u then i synthetically, then
    // reopens them outermost-first.
    assert_eq!(
        run("<b><i><u>x</b>y"),
        "<b><i><u>x</u></i></b><i><u>y</u></i>"
    );
}

#[test]
fn unmatched_end_tags_are_dropped() {
    assert_eq!(run("</b>text</i>"), "text");
    assert_eq!(run("<b>x</b></b>"), "<b>x</b>");
}

#[test]
fn end_tags_for_void_elements_are_dropped() {
    assert_eq!(run("a<br>b</br>c"), "a<br />bc");
}

#[test]
fn open_tags_drain_lifo_at_end() {
    assert_eq!(run("<div><ul><li>x"), "<div><ul><li>x</li></ul></div>");
}

#[test]
fn disabled_balancing_drops_mismatched_end_tags() {
    let mut config = DistillerConfig::default();
    config.balance_tags = false;
    let out = distill("<b><i>x</b></i>y", &config, Arc::new(UnsafeFilter));
    assert_eq!(out, "<b><i>x</i>y</b>");
}

#[test]
fn rendered_begin_and_end_tags_stay_in_balance() {
    let inputs = [
        "<b><i>text</b></i>",
        "<div><p>abc",
        "</div>stray",
        "<ul><li>a<li>b</ul>",
        "<b><i><u>x</b>y</i>z",
        "<a href=x>link",
        "text only",
    ];
    for input in inputs {
        let out = run(input);
        assert_eq!(
            count_begin_tags(&out),
            count_end_tags(&out),
            "unbalanced output for {input:?}: {out:?}"
        );
    }
}

fn count_begin_tags(html: &str) -> usize {
    count_tags(html).0
}

fn count_end_tags(html: &str) -> usize {
    count_tags(html).1
}

/// Count rendered begin/end tags, skipping full tags (`... />`) and
/// comment forms.
fn count_tags(html: &str) -> (usize, usize) {
    let bytes = html.as_bytes();
    let mut begins = 0;
    let mut ends = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let close = match html[i..].find('>') {
            Some(rel) => i + rel,
            None => break,
        };
        if bytes.get(i + 1) == Some(&b'/') {
            ends += 1;
        } else if bytes
            .get(i + 1)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            if bytes[close - 1] != b'/' {
                begins += 1;
            }
        }
        i = close + 1;
    }
    (begins, ends)
}
