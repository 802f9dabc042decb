//! The distiller driver: orchestrates cursor, tag parser, balancer, policy,
//! and sink into a single-pass, resumable sanitizer.
//!
//! Invariants:
//! - Chunk-equivalence: feeding source in one piece or many (incremental
//!   mode) yields the same output for equivalent text.
//! - Every rendered BeginTag is eventually matched by a rendered EndTag —
//!   real, repaired, or synthesized at drain — unless an incremental parse
//!   is left open.
//! - Malformed input never fails the parse; it degrades to escaped text or
//!   dropped tokens.

use std::sync::Arc;

use crate::balance::OpenTagStack;
use crate::cursor::Cursor;
use crate::entities::{EntityScan, scan_entity, write_numeric_entity};
use crate::filter::HtmlFilter;
use crate::parser::{TagOutcome, parse_tag};
use crate::tag::{ModuleType, Tag, TagType};
use crate::writer::{BufferSink, OutputSink};

const DEFAULT_TRUNCATION_INDICATOR: &str = "&hellip;";

/// Distillation settings. `max_length` counts literal (non-markup)
/// characters; 0 disables the budget.
#[derive(Clone, Debug)]
pub struct DistillerConfig {
    pub max_length: usize,
    pub normalize_whitespace: bool,
    pub encode_non_ascii: bool,
    pub balance_tags: bool,
    pub truncation_indicator: String,
}

impl Default for DistillerConfig {
    fn default() -> Self {
        Self {
            max_length: 0,
            normalize_whitespace: true,
            encode_non_ascii: false,
            balance_tags: true,
            truncation_indicator: DEFAULT_TRUNCATION_INDICATOR.to_string(),
        }
    }
}

/// Result of a `parse()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The source was fully consumed and the document drained.
    Complete,
    /// Incremental mode hit true end-of-source; append another chunk (or end
    /// incremental parsing) and call `parse()` again.
    NeedMoreInput,
}

/// Coarse driver lifecycle, traced for debugging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    NotStarted,
    Scanning,
    Suspended,
    Draining,
    Done,
}

/// Policy-driven HTML sanitizer/normalizer.
///
/// One parse in flight per instance; `&mut self` on `parse()` and every
/// setter serializes configuration mutation against an active parse.
/// Stateless policies are shared across instances via `Arc`.
pub struct Distiller<S: OutputSink = BufferSink> {
    config: DistillerConfig,
    filter: Arc<dyn HtmlFilter>,
    cursor: Cursor,
    stack: OpenTagStack,
    taxonomy: ModuleType,
    sink: S,
    state: DriverState,
    incremental: bool,
    truncated: bool,
}

impl Distiller<BufferSink> {
    pub fn new(filter: Arc<dyn HtmlFilter>) -> Self {
        Self::with_sink(BufferSink::new(), filter)
    }

    /// Distilled output accumulated so far.
    pub fn output(&self) -> &str {
        self.sink.as_str()
    }

    pub fn take_output(&mut self) -> String {
        self.sink.take()
    }
}

impl<S: OutputSink> Distiller<S> {
    pub fn with_sink(sink: S, filter: Arc<dyn HtmlFilter>) -> Self {
        Self {
            config: DistillerConfig::default(),
            filter,
            cursor: Cursor::new(),
            stack: OpenTagStack::default(),
            taxonomy: ModuleType::NONE,
            sink,
            state: DriverState::NotStarted,
            incremental: false,
            truncated: false,
        }
    }

    pub fn config(&self) -> &DistillerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DistillerConfig {
        &mut self.config
    }

    pub fn set_filter(&mut self, filter: Arc<dyn HtmlFilter>) {
        self.filter = filter;
    }

    /// Replace the source text and reset all parse state.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.cursor.set_source(source.into());
        self.reset_parse_state();
    }

    /// Append a chunk; in incremental mode this continues a paused parse.
    pub fn append_source(&mut self, chunk: &str) {
        self.cursor.append_source(chunk);
    }

    /// Record sync points and pause at true end-of-source instead of
    /// draining, so source can arrive in chunks.
    pub fn begin_incremental_parsing(&mut self) {
        self.incremental = true;
    }

    /// Stop pausing at end-of-source; the next `parse()` drains and closes.
    pub fn end_incremental_parsing(&mut self) {
        self.incremental = false;
    }

    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// Module categories of every tag rendered so far (monotonic within a
    /// parse).
    pub fn module_types(&self) -> ModuleType {
        self.taxonomy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Reinitialize cursor, stack, taxonomy, and output; source and
    /// configuration survive, so `parse()` can run again from the top.
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.reset_parse_state();
    }

    fn reset_parse_state(&mut self) {
        self.stack.clear();
        self.taxonomy = ModuleType::NONE;
        self.truncated = false;
        self.sink.clear();
        self.transition(DriverState::NotStarted);
    }

    /// Run to completion, or to a safe sync point in incremental mode.
    pub fn parse(&mut self) -> ParseOutcome {
        self.cursor.set_budget(self.config.max_length);
        self.transition(DriverState::Scanning);
        loop {
            if self.cursor.is_eof() {
                break;
            }
            let ch = match self.cursor.current() {
                Some(ch) => ch,
                None => break,
            };
            if ch == '<' {
                match parse_tag(self.cursor.rest(), self.incremental) {
                    TagOutcome::Tag { mut tag, consumed } => {
                        self.flush_literals();
                        self.cursor.empty_buffer_bytes(consumed);
                        if self.filter.filter_tag(&mut tag) {
                            self.render_tag(tag);
                        }
                    }
                    TagOutcome::NotTag => {
                        self.flush_literals();
                        self.sink.write_literal("&lt;");
                        self.cursor.empty_buffer(1);
                        self.cursor.count_literal(1);
                    }
                    TagOutcome::NeedMoreInput => return self.suspend(),
                }
                continue;
            }
            if self.config.normalize_whitespace && ch.is_whitespace() {
                // A trailing CR is ambiguous while more chunks may arrive:
                // CRLF drops the CR, a lone CR becomes LF.
                if self.incremental && ch == '\r' && self.cursor.peek(1).is_none() {
                    return self.suspend();
                }
                self.flush_literals();
                self.normalize_whitespace_char(ch);
                continue;
            }
            if self.config.encode_non_ascii && !ch.is_ascii() {
                self.flush_literals();
                let mut encoded = String::new();
                write_numeric_entity(ch, &mut encoded);
                self.sink.write_literal(&encoded);
                self.cursor.empty_buffer(1);
                self.cursor.count_literal(1);
                continue;
            }
            if ch == '&' {
                // A well-formed entity is one literal character: buffer it
                // whole so truncation and word breaking never split it.
                match scan_entity(self.cursor.rest(), 0) {
                    EntityScan::Entity { len } => {
                        self.cursor.advance_bytes(len);
                        self.cursor.count_literal(1);
                        continue;
                    }
                    EntityScan::NeedMoreInput if self.incremental => return self.suspend(),
                    _ => {}
                }
            }
            self.cursor.advance();
            self.cursor.count_literal(1);
        }
        if self.incremental {
            return self.suspend();
        }
        self.finish()
    }

    fn flush_literals(&mut self) {
        self.cursor.write_buffer(&*self.filter, &mut self.sink);
    }

    /// Preserve the unconsumed remainder (pending literal run included) for
    /// the next appended chunk.
    fn suspend(&mut self) -> ParseOutcome {
        self.cursor.rebase();
        self.transition(DriverState::Suspended);
        ParseOutcome::NeedMoreInput
    }

    /// Drain: flush trailing literals, close open tags LIFO, and append the
    /// truncation indicator when the budget cut the parse short.
    fn finish(&mut self) -> ParseOutcome {
        self.transition(DriverState::Draining);
        self.flush_literals();
        while let Some(open) = self.stack.pop() {
            let close = open.close_tag();
            self.write_and_record(&close);
        }
        if self.cursor.budget_exhausted() && !self.cursor.is_end_of_source() && !self.truncated {
            self.sink.write_markup(&self.config.truncation_indicator);
            self.truncated = true;
        }
        debug_assert!(self.stack.is_empty(), "drain must empty the open stack");
        self.transition(DriverState::Done);
        ParseOutcome::Complete
    }

    fn render_tag(&mut self, tag: Tag) {
        match tag.tag_type() {
            TagType::Comment | TagType::FullTag => {
                self.write_and_record(&tag);
            }
            TagType::BeginTag => {
                if self.write_and_record(&tag) {
                    self.stack.push(tag);
                }
            }
            TagType::EndTag => self.balance_end_tag(tag),
        }
    }

    /// EndTag handling per the balance-repair contract: matching top closes
    /// normally; a mismatch with a deeper match closes the intervening
    /// ancestors synthetically and re-opens them after the real close; an
    /// end tag with no open counterpart is dropped.
    fn balance_end_tag(&mut self, tag: Tag) {
        let top = match self.stack.pop() {
            Some(top) => top,
            None => return,
        };
        if top.name() == tag.name() {
            self.write_and_record(&tag);
            return;
        }
        if self.config.balance_tags && self.stack.contains_name(tag.name()) {
            let mut reopen: Vec<Tag> = Vec::new();
            let mut current = top;
            loop {
                let close = current.close_tag();
                self.write_and_record(&close);
                reopen.push(current);
                match self.stack.pop() {
                    Some(next) if next.name() == tag.name() => {
                        self.write_and_record(&tag);
                        break;
                    }
                    Some(next) => current = next,
                    None => break,
                }
            }
            // Popping the collected stack restores original nesting order.
            while let Some(ancestor) = reopen.pop() {
                if self.write_and_record(&ancestor) {
                    self.stack.push(ancestor);
                }
            }
        } else {
            self.stack.push(top);
        }
    }

    fn write_and_record(&mut self, tag: &Tag) -> bool {
        if self.sink.write_tag(tag, &*self.filter) {
            self.taxonomy |= tag.module_type();
            true
        } else {
            false
        }
    }

    fn normalize_whitespace_char(&mut self, ch: char) {
        match ch {
            '\r' => {
                // CR before LF drops; a lone CR becomes LF.
                if self.cursor.peek(1) != Some('\n') {
                    self.emit_whitespace('\n');
                }
                self.cursor.empty_buffer(1);
            }
            '\n' => {
                let prev1 = self.cursor.prev_char(1, &self.sink);
                let prev2 = self.cursor.prev_char(2, &self.sink);
                if !(prev1 == Some('\n') && prev2 == Some('\n')) {
                    self.emit_whitespace('\n');
                }
                self.cursor.empty_buffer(1);
            }
            _ => {
                if self.cursor.prev_char(1, &self.sink) != Some(' ') {
                    self.emit_whitespace(' ');
                }
                self.cursor.empty_buffer(1);
            }
        }
    }

    fn emit_whitespace(&mut self, ch: char) {
        self.sink.write_literal_char(ch);
        self.cursor.count_literal(1);
    }

    fn transition(&mut self, next: DriverState) {
        if self.state == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "distill.driver",
            "state {:?} -> {:?} @{}",
            self.state,
            next,
            self.cursor.position()
        );
        self.state = next;
    }
}

/// One-shot convenience: distill `source` into a fresh string.
pub fn distill(source: &str, config: &DistillerConfig, filter: Arc<dyn HtmlFilter>) -> String {
    let mut distiller = Distiller::new(filter);
    *distiller.config_mut() = config.clone();
    distiller.set_source(source);
    let outcome = distiller.parse();
    debug_assert_eq!(outcome, ParseOutcome::Complete);
    distiller.take_output()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{StripFilter, UnsafeFilter};
    use crate::whitelist::{SafeFilter, StrictFilter};

    fn run(source: &str, config: &DistillerConfig, filter: Arc<dyn HtmlFilter>) -> String {
        distill(source, config, filter)
    }

    fn unsafe_config() -> DistillerConfig {
        DistillerConfig::default()
    }

    #[test]
    fn stray_bracket_escapes_as_entity() {
        let out = run("1 < 2", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "1 &lt; 2");
    }

    #[test]
    fn non_ascii_encodes_when_enabled() {
        let mut config = unsafe_config();
        config.encode_non_ascii = true;
        let out = run("café", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "caf&#xE9;");
    }

    #[test]
    fn non_ascii_passes_through_when_disabled() {
        let out = run("café", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "café");
    }

    #[test]
    fn mismatched_close_tags_are_repaired() {
        let out = run("<b><i>text</b></i>", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "<b><i>text</i></b><i></i>");
    }

    #[test]
    fn unmatched_end_tag_is_dropped() {
        let out = run("text</div>more", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "textmore");
    }

    #[test]
    fn open_tags_close_at_end_of_input() {
        let out = run("<div><p>abc", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "<div><p>abc</p></div>");
    }

    #[test]
    fn balancing_disabled_drops_mismatched_end_tags() {
        let mut config = unsafe_config();
        config.balance_tags = false;
        let out = run("<b><i>text</b></i>", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "<b><i>text</i></b>");
    }

    #[test]
    fn whitespace_runs_collapse() {
        let out = run("a  \t b", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "a b");
    }

    #[test]
    fn carriage_returns_normalize_to_newlines() {
        let out = run("a\r\nb\rc", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "a\nb\nc");
    }

    #[test]
    fn newline_runs_cap_at_two() {
        let out = run("a\n\n\n\nb", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn whitespace_survives_when_normalization_is_off() {
        let mut config = unsafe_config();
        config.normalize_whitespace = false;
        let out = run("a  \r\n b", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "a  \r\n b");
    }

    #[test]
    fn max_length_truncates_and_appends_indicator_once() {
        let mut config = unsafe_config();
        config.max_length = 3;
        let out = run("abcdef", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "abc&hellip;");
    }

    #[test]
    fn truncation_closes_open_tags_before_indicator() {
        let mut config = unsafe_config();
        config.max_length = 3;
        let out = run("<b>abcdef</b>", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "<b>abc</b>&hellip;");
    }

    #[test]
    fn exact_length_fit_is_not_truncation() {
        let mut config = unsafe_config();
        config.max_length = 3;
        let out = run("abc", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "abc");
    }

    #[test]
    fn entities_count_as_one_literal_char() {
        let mut config = unsafe_config();
        config.max_length = 3;
        let out = run("a&amp;b extra", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "a&amp;b&hellip;");
    }

    #[test]
    fn truncated_output_re_distills_to_itself() {
        let mut config = unsafe_config();
        config.max_length = 3;
        let first = run("<b>abcdef</b>", &config, Arc::new(UnsafeFilter));
        let second = run(&first, &config, Arc::new(UnsafeFilter));
        assert_eq!(first, second);
    }

    #[test]
    fn markup_does_not_count_toward_the_budget() {
        let mut config = unsafe_config();
        config.max_length = 10;
        let out = run("<b><i>abc</i></b>", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "<b><i>abc</i></b>");
    }

    #[test]
    fn strip_filter_leaves_only_text() {
        let out = run(
            "<div>keep <b>this</b></div><!-- not this -->",
            &unsafe_config(),
            Arc::new(StripFilter),
        );
        assert_eq!(out, "keep this");
    }

    #[test]
    fn comments_render_verbatim_under_unsafe() {
        let out = run("<!-- note -->", &unsafe_config(), Arc::new(UnsafeFilter));
        assert_eq!(out, "<!-- note -->");
    }

    #[test]
    fn safe_filter_drops_comments_and_script() {
        let out = run(
            "a<!-- x --><script>alert(1)</script>b",
            &unsafe_config(),
            Arc::new(SafeFilter),
        );
        assert_eq!(out, "aalert(1)b");
    }

    #[test]
    fn strict_filter_blocks_javascript_urls() {
        let out = run(
            "<a href=\"javascript:alert(1)\">x</a>",
            &unsafe_config(),
            Arc::new(StrictFilter),
        );
        assert_eq!(out, "<a>x</a>");
    }

    #[test]
    fn taxonomy_accumulates_rendered_tags() {
        let mut distiller = Distiller::new(Arc::new(UnsafeFilter) as Arc<dyn HtmlFilter>);
        distiller.set_source("<b>x</b><table><tr><td>y</td></tr></table>");
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert!(distiller.module_types().contains(ModuleType::INLINE));
        assert!(distiller.module_types().contains(ModuleType::TABLE));
        assert!(!distiller.module_types().contains(ModuleType::FORM));
    }

    #[test]
    fn taxonomy_ignores_dropped_tags() {
        let mut distiller = Distiller::new(Arc::new(StrictFilter) as Arc<dyn HtmlFilter>);
        distiller.set_source("<table><tr><td>x</td></tr></table>");
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert!(distiller.module_types().is_empty());
    }

    #[test]
    fn reset_allows_a_fresh_parse_of_the_same_source() {
        let mut distiller = Distiller::new(Arc::new(UnsafeFilter) as Arc<dyn HtmlFilter>);
        distiller.set_source("<b>x");
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        let first = distiller.output().to_string();
        distiller.reset();
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert_eq!(distiller.output(), first);
        assert_eq!(first, "<b>x</b>");
    }

    #[test]
    fn incremental_parse_pauses_and_resumes_mid_tag() {
        let mut distiller = Distiller::new(Arc::new(UnsafeFilter) as Arc<dyn HtmlFilter>);
        distiller.begin_incremental_parsing();
        distiller.set_source("<di");
        assert_eq!(distiller.parse(), ParseOutcome::NeedMoreInput);
        distiller.append_source("v>hello</div>");
        assert_eq!(distiller.parse(), ParseOutcome::NeedMoreInput);
        distiller.end_incremental_parsing();
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert_eq!(distiller.output(), "<div>hello</div>");
    }

    #[test]
    fn incremental_parse_left_open_does_not_close_tags() {
        let mut distiller = Distiller::new(Arc::new(UnsafeFilter) as Arc<dyn HtmlFilter>);
        distiller.begin_incremental_parsing();
        distiller.set_source("<div>partial");
        assert_eq!(distiller.parse(), ParseOutcome::NeedMoreInput);
        assert_eq!(distiller.output(), "<div>");
        distiller.end_incremental_parsing();
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert_eq!(distiller.output(), "<div>partial</div>");
    }

    #[test]
    fn incremental_entity_split_across_chunks_stays_whole() {
        let mut distiller = Distiller::new(Arc::new(UnsafeFilter) as Arc<dyn HtmlFilter>);
        distiller.begin_incremental_parsing();
        distiller.set_source("a&am");
        assert_eq!(distiller.parse(), ParseOutcome::NeedMoreInput);
        distiller.append_source("p;b");
        assert_eq!(distiller.parse(), ParseOutcome::NeedMoreInput);
        distiller.end_incremental_parsing();
        assert_eq!(distiller.parse(), ParseOutcome::Complete);
        assert_eq!(distiller.output(), "a&amp;b");
    }

    #[test]
    fn filter_tag_may_mutate_before_render() {
        struct Rewriter;
        impl HtmlFilter for Rewriter {
            fn filter_tag(&self, tag: &mut Tag) -> bool {
                tag.attributes_mut().remove("class");
                true
            }
            fn filter_attribute(&self, _t: &str, _a: &str, _v: &mut String) -> bool {
                true
            }
            fn filter_style(&self, _t: &str, _s: &str, _v: &mut String) -> bool {
                true
            }
        }
        let out = run(
            "<p class=x title=y>z</p>",
            &unsafe_config(),
            Arc::new(Rewriter),
        );
        assert_eq!(out, "<p title=\"y\">z</p>");
    }

    #[test]
    fn custom_truncation_indicator_is_used() {
        let mut config = unsafe_config();
        config.max_length = 2;
        config.truncation_indicator = "…".to_string();
        let out = run("abcd", &config, Arc::new(UnsafeFilter));
        assert_eq!(out, "ab…");
    }
}
