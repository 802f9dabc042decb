//! Source cursor: position tracking, buffered-run flushing, and the literal
//! budget that drives max-length truncation.
//!
//! Invariants:
//! - `start <= index <= source.len()`, all on UTF-8 char boundaries.
//! - `[start, index)` is the pending literal run: scanned but not yet
//!   emitted. Markup bytes never linger in the run; the driver empties them.
//! - `sync_point` trails `start` and is the last safe resumption boundary
//!   for an incremental parse; everything before it has been emitted.

use crate::filter::HtmlFilter;
use crate::writer::OutputSink;

#[derive(Debug, Default)]
pub(crate) struct Cursor {
    source: String,
    index: usize,
    start: usize,
    sync_point: usize,
    literal_count: usize,
    max_length: usize,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_source(&mut self, source: String) {
        self.source = source;
        self.reset();
    }

    pub(crate) fn append_source(&mut self, chunk: &str) {
        self.source.push_str(chunk);
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Unconsumed tail starting at the current index.
    pub(crate) fn rest(&self) -> &str {
        debug_assert!(self.source.is_char_boundary(self.index));
        &self.source[self.index..]
    }

    #[cfg(any(test, feature = "debug-stats"))]
    pub(crate) fn position(&self) -> usize {
        self.index
    }

    pub(crate) fn reset(&mut self) {
        self.index = 0;
        self.start = 0;
        self.sync_point = 0;
        self.literal_count = 0;
    }

    /// Literal budget; 0 disables truncation.
    pub(crate) fn set_budget(&mut self, max_length: usize) {
        self.max_length = max_length;
    }

    pub(crate) fn count_literal(&mut self, n: usize) {
        self.literal_count += n;
    }

    pub(crate) fn budget_exhausted(&self) -> bool {
        self.max_length > 0 && self.literal_count >= self.max_length
    }

    /// True end of the source text, ignoring the literal budget.
    pub(crate) fn is_end_of_source(&self) -> bool {
        self.index >= self.source.len()
    }

    /// EOF for the parse loop: end of source or exhausted budget. The latter
    /// stops a parse deliberately mid-document while tags still close.
    pub(crate) fn is_eof(&self) -> bool {
        self.is_end_of_source() || self.budget_exhausted()
    }

    pub(crate) fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Char `n` positions ahead of the current one.
    pub(crate) fn peek(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Char `n` positions behind the current one, reading the pending run or
    /// the already-flushed output, whichever holds that position.
    pub(crate) fn prev_char<S: OutputSink + ?Sized>(&self, n: usize, sink: &S) -> Option<char> {
        debug_assert!(n >= 1);
        let mut back = n;
        for ch in self.source[self.start..self.index].chars().rev() {
            back -= 1;
            if back == 0 {
                return Some(ch);
            }
        }
        sink.prev_char(back)
    }

    /// Advance past the current char without counting it.
    pub(crate) fn advance(&mut self) {
        if let Some(ch) = self.current() {
            self.index += ch.len_utf8();
        }
    }

    /// Advance `n` bytes (must land on a char boundary).
    pub(crate) fn advance_bytes(&mut self, n: usize) {
        let next = (self.index + n).min(self.source.len());
        debug_assert!(self.source.is_char_boundary(next));
        self.index = next;
    }

    /// Flush the pending run `[start, index)` through the policy's literal
    /// hook into the sink.
    pub(crate) fn write_buffer<S: OutputSink + ?Sized>(
        &mut self,
        filter: &dyn HtmlFilter,
        sink: &mut S,
    ) {
        if self.start == self.index {
            return;
        }
        match filter.filter_literal(&self.source, self.start, self.index) {
            Some(rewritten) => sink.write_literal(&rewritten),
            None => sink.write_literal(&self.source[self.start..self.index]),
        }
        self.start = self.index;
        self.sync_point = self.index;
    }

    /// Take the pending run as text without emitting it, then skip `skip`
    /// extra chars. Used to extract token text.
    #[allow(dead_code, reason = "cursor buffer API; the tag parser slices the tail directly")]
    pub(crate) fn flush_buffer(&mut self, skip: usize) -> String {
        let text = self.source[self.start..self.index].to_string();
        for _ in 0..skip {
            self.advance();
        }
        self.start = self.index;
        self.sync_point = self.index;
        text
    }

    /// Discard the pending run and `skip` extra chars without emitting.
    /// Used to swallow delimiters and consumed markup.
    pub(crate) fn empty_buffer(&mut self, skip: usize) {
        for _ in 0..skip {
            self.advance();
        }
        self.start = self.index;
        self.sync_point = self.index;
    }

    /// Discard the pending run plus `n` extra bytes of markup.
    pub(crate) fn empty_buffer_bytes(&mut self, n: usize) {
        self.advance_bytes(n);
        self.start = self.index;
        self.sync_point = self.index;
    }

    /// Drop everything before the sync point so a paused incremental parse
    /// holds only the resumable remainder; appended chunks continue the
    /// same positions.
    pub(crate) fn rebase(&mut self) {
        let keep_from = self.sync_point;
        debug_assert!(keep_from <= self.start && self.start <= self.index);
        if keep_from == 0 {
            return;
        }
        self.source.drain(..keep_from);
        self.index -= keep_from;
        self.start -= keep_from;
        self.sync_point = 0;
    }
}
