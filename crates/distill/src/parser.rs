//! Tag recognizer.
//!
//! Pure lookahead over the unconsumed tail of the source: the driver hands
//! in `cursor.rest()` and only commits cursor movement once an outcome is
//! known. That keeps a paused incremental parse trivially resumable — the
//! whole partial token is still in the remainder.
//!
//! Recognized forms, prefix-first: `<!-- -->`, `<![CDATA[ ]]>`, `<! >`,
//! `<? ?>`, then ordinary begin/end tags with attributes. Anything else is
//! "not a tag" and the caller escapes the `<`.

use memchr::memmem;

use crate::entities::decode_entities;
use crate::tag::{OrderedMap, Tag};

/// Result of probing for a tag at a `<`.
#[derive(Debug)]
pub(crate) enum TagOutcome {
    /// A complete token occupying `consumed` bytes of the tail.
    Tag { tag: Tag, consumed: usize },
    /// The `<` does not open a token; escape it as text.
    NotTag,
    /// True end-of-source inside a token while incremental; resume with the
    /// next chunk.
    NeedMoreInput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PrefixMatch {
    Matched,
    NoMatch,
    /// The tail is a proper prefix of the pattern.
    NeedMoreInput,
}

fn match_prefix(s: &str, pattern: &str) -> PrefixMatch {
    if s.len() >= pattern.len() {
        if s.as_bytes().starts_with(pattern.as_bytes()) {
            PrefixMatch::Matched
        } else {
            PrefixMatch::NoMatch
        }
    } else if pattern.as_bytes().starts_with(s.as_bytes()) {
        PrefixMatch::NeedMoreInput
    } else {
        PrefixMatch::NoMatch
    }
}

const COMMENT_FORMS: [(&str, &str); 4] = [
    ("<!--", "-->"),
    ("<![CDATA[", "]]>"),
    ("<!", ">"),
    ("<?", "?>"),
];

/// Probe `rest` (which must start with `<`) for a token.
pub(crate) fn parse_tag(rest: &str, incremental: bool) -> TagOutcome {
    debug_assert!(rest.starts_with('<'));
    for (open, close) in COMMENT_FORMS {
        match match_prefix(rest, open) {
            PrefixMatch::Matched => return parse_delimited(rest, open, close, incremental),
            PrefixMatch::NeedMoreInput => {
                if incremental {
                    return TagOutcome::NeedMoreInput;
                }
                // True EOF mid-prefix; a shorter form may still match.
            }
            PrefixMatch::NoMatch => {}
        }
    }
    parse_element(rest, incremental)
}

/// Delimited-content scan for comment-form tokens.
fn parse_delimited(rest: &str, open: &str, close: &str, incremental: bool) -> TagOutcome {
    let body = &rest[open.len()..];
    match memmem::find(body.as_bytes(), close.as_bytes()) {
        Some(at) => TagOutcome::Tag {
            tag: Tag::comment(&open[1..], &body[..at], &close[..close.len() - 1]),
            consumed: open.len() + at + close.len(),
        },
        None if incremental => TagOutcome::NeedMoreInput,
        // Unterminated: the comment consumes to end-of-source; rendering
        // adds the normal end delimiter back.
        None => TagOutcome::Tag {
            tag: Tag::comment(&open[1..], body, &close[..close.len() - 1]),
            consumed: rest.len(),
        },
    }
}

struct Scan<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Scan<'a> {
    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.i += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.i;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        &self.s[start..self.i]
    }
}

fn is_name_stop(ch: char) -> bool {
    ch.is_whitespace() || ch == '>' || ch == '<' || ch == '/'
}

fn is_attr_name_stop(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '=' | '>' | '<' | '/' | '"' | '\'')
}

fn parse_element(rest: &str, incremental: bool) -> TagOutcome {
    let mut scan = Scan { s: rest, i: 1 };
    let lead = match scan.peek() {
        Some(ch) => ch,
        None if incremental => return TagOutcome::NeedMoreInput,
        None => return TagOutcome::NotTag,
    };
    let is_end = lead == '/';
    if is_end {
        scan.bump();
    } else if !lead.is_ascii_alphabetic() {
        return TagOutcome::NotTag;
    }

    let name = scan.take_while(|ch| !is_name_stop(ch));
    let mut attributes: Vec<(&str, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        scan.skip_whitespace();
        let ch = match scan.peek() {
            Some(ch) => ch,
            // The tag completes at true end-of-source.
            None if incremental => return TagOutcome::NeedMoreInput,
            None => break,
        };
        if ch == '>' {
            scan.bump();
            break;
        }
        if ch == '<' {
            // Stray open bracket ends the tag; leave it unconsumed.
            break;
        }
        if ch == '/' {
            scan.bump();
            match scan.peek() {
                Some('>') => {
                    scan.bump();
                    self_closing = true;
                    break;
                }
                None if incremental => return TagOutcome::NeedMoreInput,
                _ => continue,
            }
        }
        let attr_name = scan.take_while(|ch| !is_attr_name_stop(ch));
        if attr_name.is_empty() {
            // Junk byte (stray quote and the like); skip it.
            scan.bump();
            continue;
        }
        scan.skip_whitespace();
        if scan.eof() && incremental {
            return TagOutcome::NeedMoreInput;
        }
        let mut value = String::new();
        if scan.peek() == Some('=') {
            scan.bump();
            scan.skip_whitespace();
            match scan.peek() {
                None if incremental => return TagOutcome::NeedMoreInput,
                None => {}
                Some(quote @ ('"' | '\'')) => {
                    scan.bump();
                    let raw = scan.take_while(|ch| ch != quote && ch != '<' && ch != '>');
                    if scan.eof() && incremental {
                        return TagOutcome::NeedMoreInput;
                    }
                    value = decode_entities(raw);
                    // An unterminated quote stops at EOF/`<`/`>`; only a
                    // real closing quote is consumed.
                    if scan.peek() == Some(quote) {
                        scan.bump();
                    }
                }
                Some(_) => {
                    let raw = scan.take_while(|ch| !ch.is_whitespace() && ch != '>' && ch != '<');
                    if scan.eof() && incremental {
                        return TagOutcome::NeedMoreInput;
                    }
                    value = decode_entities(raw);
                }
            }
        }
        attributes.push((attr_name, value));
    }

    let mut raw = String::with_capacity(name.len() + 2);
    if is_end {
        raw.push('/');
    }
    raw.push_str(name);
    if self_closing && !is_end {
        raw.push('/');
    }
    let mut tag = Tag::new(&raw);
    for (attr_name, attr_value) in attributes {
        if attr_name.eq_ignore_ascii_case("style") {
            parse_style_declarations(&attr_value, tag.styles_mut());
        } else {
            tag.attributes_mut().insert(attr_name, attr_value);
        }
    }
    TagOutcome::Tag {
        tag,
        consumed: scan.i,
    }
}

/// Split a flat `property:value;` list into the style map, trimming both
/// sides of each declaration.
fn parse_style_declarations(input: &str, styles: &mut OrderedMap) {
    for pair in input.split(';') {
        let Some((name, value)) = pair.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        styles.insert(name, value.trim().to_string());
    }
}
