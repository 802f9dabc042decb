//! Word-break decorator: injects soft-break markers into overlong
//! unbroken spans of literal text so they cannot blow out a layout.

use std::sync::Arc;

use crate::entities::{EntityScan, scan_entity};
use crate::filter::HtmlFilter;
use crate::tag::Tag;

const DEFAULT_MARKER: &str = "&shy;";

/// Decorates any policy with literal-run word breaking.
///
/// Scans each literal run for non-whitespace spans longer than
/// `max_word_length` and injects the break marker. A well-formed entity
/// counts as one character and is never split.
pub struct WordBreakFilter {
    inner: Arc<dyn HtmlFilter>,
    max_word_length: usize,
    marker: String,
}

impl WordBreakFilter {
    pub fn new(max_word_length: usize, inner: Arc<dyn HtmlFilter>) -> Self {
        Self::with_marker(max_word_length, DEFAULT_MARKER, inner)
    }

    pub fn with_marker(
        max_word_length: usize,
        marker: impl Into<String>,
        inner: Arc<dyn HtmlFilter>,
    ) -> Self {
        Self {
            inner,
            max_word_length,
            marker: marker.into(),
        }
    }
}

impl HtmlFilter for WordBreakFilter {
    fn filter_tag(&self, tag: &mut Tag) -> bool {
        self.inner.filter_tag(tag)
    }

    fn filter_attribute(&self, tag_name: &str, attr_name: &str, value: &mut String) -> bool {
        self.inner.filter_attribute(tag_name, attr_name, value)
    }

    fn filter_style(&self, tag_name: &str, style_name: &str, value: &mut String) -> bool {
        self.inner.filter_style(tag_name, style_name, value)
    }

    fn filter_literal(&self, source: &str, start: usize, end: usize) -> Option<String> {
        let inner_rewrite = self.inner.filter_literal(source, start, end);
        if self.max_word_length == 0 {
            return inner_rewrite;
        }
        match &inner_rewrite {
            Some(rewritten) => Some(
                break_long_runs(rewritten, self.max_word_length, &self.marker)
                    .unwrap_or_else(|| rewritten.clone()),
            ),
            None => break_long_runs(&source[start..end], self.max_word_length, &self.marker),
        }
    }
}

/// Insert `marker` into non-whitespace spans longer than `max` characters.
/// Returns None when no span needed breaking (no allocation on that path).
fn break_long_runs(text: &str, max: usize, marker: &str) -> Option<String> {
    let mut out: Option<String> = None;
    let mut run_len = 0usize;
    let mut i = 0;
    while i < text.len() {
        let ch = text[i..].chars().next().expect("valid utf-8");
        // An already-present marker is a break opportunity; counting it as a
        // span character would double markers on re-sanitized input.
        if !marker.is_empty() && text[i..].starts_with(marker) {
            if let Some(broken) = out.as_mut() {
                broken.push_str(marker);
            }
            run_len = 0;
            i += marker.len();
            continue;
        }
        let step = if ch == '&' {
            match scan_entity(text, i) {
                EntityScan::Entity { len } => len,
                _ => ch.len_utf8(),
            }
        } else {
            ch.len_utf8()
        };
        if ch.is_whitespace() {
            run_len = 0;
        } else {
            if run_len == max {
                let broken = out.get_or_insert_with(|| {
                    let mut s = String::with_capacity(text.len() + marker.len());
                    s.push_str(&text[..i]);
                    s
                });
                broken.push_str(marker);
                run_len = 0;
            }
            run_len += 1;
        }
        if let Some(broken) = out.as_mut() {
            broken.push_str(&text[i..i + step]);
        }
        i += step;
    }
    out
}
