//! Output sinks and tag rendering.
//!
//! The driver renders through `OutputSink` so callers can stream distilled
//! output instead of buffering it. `BufferSink` is the default accumulate-
//! into-a-String sink. Attribute/style policy is applied here, during
//! rendering, so a tag stored on the open stack is never mutated by its own
//! emission.

use crate::entities::encode_attribute;
use crate::filter::HtmlFilter;
use crate::tag::{Tag, TagType};

/// Destination for distilled output.
pub trait OutputSink {
    /// Append literal (non-markup) text. The policy's literal hook has
    /// already run by the time this is called.
    fn write_literal(&mut self, text: &str);

    /// Append a single literal char.
    fn write_literal_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.write_literal(ch.encode_utf8(&mut buf));
    }

    /// Append rendered markup.
    fn write_markup(&mut self, text: &str);

    /// Render `tag` through `filter` and append it. Returns false when the
    /// tag renders to nothing (degenerate empty names).
    fn write_tag(&mut self, tag: &Tag, filter: &dyn HtmlFilter) -> bool {
        let mut markup = String::new();
        if !render_tag(&mut markup, tag, filter) {
            return false;
        }
        self.write_markup(&markup);
        true
    }

    /// Char `peek` positions back in the written output (1 = most recent),
    /// or None when the sink cannot look that far back.
    fn prev_char(&self, peek: usize) -> Option<char>;

    /// Discard written output where the sink supports it. Stream sinks may
    /// ignore this; `Distiller::reset` calls it.
    fn clear(&mut self) {}
}

/// Sink that accumulates the distilled document in a `String`.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: String,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputSink for BufferSink {
    fn write_literal(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn write_literal_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    fn write_markup(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn prev_char(&self, peek: usize) -> Option<char> {
        debug_assert!(peek >= 1);
        self.buffer.chars().rev().nth(peek.checked_sub(1)?)
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Render a tag into `markup`, applying attribute/style policy.
///
/// Comment-form tokens reproduce their original delimiters; begin/full tags
/// re-emit surviving attributes with encoded values and the style map as a
/// single trailing `style` attribute.
pub(crate) fn render_tag(markup: &mut String, tag: &Tag, filter: &dyn HtmlFilter) -> bool {
    match tag.tag_type() {
        TagType::Comment => {
            markup.push('<');
            markup.push_str(tag.raw_name());
            markup.push_str(tag.content());
            markup.push_str(tag.end_delim());
            markup.push('>');
        }
        TagType::EndTag => {
            if tag.raw_name().is_empty() {
                return false;
            }
            markup.push_str("</");
            markup.push_str(tag.raw_name());
            markup.push('>');
        }
        TagType::BeginTag | TagType::FullTag => {
            if tag.raw_name().is_empty() {
                return false;
            }
            markup.push('<');
            markup.push_str(tag.raw_name());
            for (name, value) in tag.attributes().iter() {
                let mut value = value.to_string();
                if !filter.filter_attribute(tag.name(), name, &mut value) {
                    continue;
                }
                markup.push(' ');
                markup.push_str(name);
                if !value.is_empty() {
                    markup.push_str("=\"");
                    encode_attribute(&value, markup);
                    markup.push('"');
                }
            }
            let mut style = String::new();
            for (name, value) in tag.styles().iter() {
                let mut value = value.to_string();
                if !filter.filter_style(tag.name(), name, &mut value) {
                    continue;
                }
                style.push_str(name);
                style.push(':');
                style.push_str(&value);
                style.push(';');
            }
            if !style.is_empty() {
                markup.push_str(" style=\"");
                encode_attribute(&style, markup);
                markup.push('"');
            }
            if tag.tag_type() == TagType::FullTag {
                markup.push_str(" />");
            } else {
                markup.push('>');
            }
        }
    }
    true
}
