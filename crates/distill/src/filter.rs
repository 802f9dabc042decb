//! Filter policy seam.
//!
//! A policy decides keep/alter/drop for tags, attributes, styles, and
//! literal runs. Policies are stateless and shared across distiller
//! instances (and threads) behind an `Arc`; decorators compose by wrapping
//! an inner policy rather than by inheritance.

use crate::tag::Tag;

/// Content policy consulted for every token the distiller renders.
///
/// Hooks run in rendering order: `filter_tag` once per parsed tag (and may
/// mutate it), `filter_attribute`/`filter_style` per surviving entry while
/// the tag renders, `filter_literal` per flushed literal run. A hook that
/// panics propagates to the `parse()` caller unmodified.
pub trait HtmlFilter: Send + Sync {
    /// Keep (true) or drop (false) a tag; may mutate it first.
    fn filter_tag(&self, tag: &mut Tag) -> bool;

    /// Keep (true) or drop (false) one attribute; may rewrite the value.
    fn filter_attribute(&self, tag_name: &str, attr_name: &str, value: &mut String) -> bool;

    /// Keep (true) or drop (false) one style declaration; may rewrite the
    /// value.
    fn filter_style(&self, tag_name: &str, style_name: &str, value: &mut String) -> bool;

    /// Optionally rewrite the literal run `source[start..end]`. Returning
    /// `None` emits the run as-is without allocating.
    fn filter_literal(&self, source: &str, start: usize, end: usize) -> Option<String> {
        let _ = (source, start, end);
        None
    }
}

/// Drops every tag, attribute, and style; literal text passes through.
#[derive(Clone, Copy, Debug, Default)]
pub struct StripFilter;

impl HtmlFilter for StripFilter {
    fn filter_tag(&self, _tag: &mut Tag) -> bool {
        false
    }

    fn filter_attribute(&self, _tag_name: &str, _attr_name: &str, _value: &mut String) -> bool {
        false
    }

    fn filter_style(&self, _tag_name: &str, _style_name: &str, _value: &mut String) -> bool {
        false
    }
}

/// Keeps everything. Only for pre-trusted content.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsafeFilter;

impl HtmlFilter for UnsafeFilter {
    fn filter_tag(&self, _tag: &mut Tag) -> bool {
        true
    }

    fn filter_attribute(&self, _tag_name: &str, _attr_name: &str, _value: &mut String) -> bool {
        true
    }

    fn filter_style(&self, _tag_name: &str, _style_name: &str, _value: &mut String) -> bool {
        true
    }
}
