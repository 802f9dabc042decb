//! Tag model: tag type classification, module taxonomy, and the ordered
//! attribute/style containers.
//!
//! Determinism contract:
//! - Attributes and styles are stored in encounter order with ASCII-folded
//!   keys; duplicate keys are dropped after the first occurrence.
//! - `TagType` is derived exactly once, at construction, from the raw name
//!   and the void-element whitelist. It never changes afterwards.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Kind of token a parsed tag represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagType {
    /// Comment, CDATA section, declaration, or processing instruction.
    /// Content and end delimiter live under reserved attribute keys.
    Comment,
    /// Opening tag that expects a matching close tag.
    BeginTag,
    /// Closing tag.
    EndTag,
    /// Complete tag (void element or self-closing syntax); never pushed on
    /// the open-tag stack.
    FullTag,
}

/// Coarse HTML element category bitmask.
///
/// Accumulated over every rendered tag so a caller can ask what kinds of
/// content a distilled fragment contains without re-parsing it.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleType(u16);

impl ModuleType {
    pub const NONE: Self = Self(0);
    pub const INLINE: Self = Self(1 << 0);
    pub const BLOCK: Self = Self(1 << 1);
    pub const LIST: Self = Self(1 << 2);
    pub const TABLE: Self = Self(1 << 3);
    pub const FORM: Self = Self(1 << 4);
    pub const SCRIPT: Self = Self(1 << 5);
    pub const EMBEDDED: Self = Self(1 << 6);
    pub const DOCUMENT: Self = Self(1 << 7);
    pub const STYLE: Self = Self(1 << 8);
    pub const COMMENT: Self = Self(1 << 9);
    pub const UNKNOWN: Self = Self(1 << 10);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ModuleType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModuleType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ModuleType, &str); 11] = [
            (ModuleType::INLINE, "Inline"),
            (ModuleType::BLOCK, "Block"),
            (ModuleType::LIST, "List"),
            (ModuleType::TABLE, "Table"),
            (ModuleType::FORM, "Form"),
            (ModuleType::SCRIPT, "Script"),
            (ModuleType::EMBEDDED, "Embedded"),
            (ModuleType::DOCUMENT, "Document"),
            (ModuleType::STYLE, "Style"),
            (ModuleType::COMMENT, "Comment"),
            (ModuleType::UNKNOWN, "Unknown"),
        ];
        if self.is_empty() {
            return f.write_str("None");
        }
        let mut first = true;
        for (bit, name) in NAMES {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Void elements: complete by definition, never pushed on the open-tag stack.
pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Classify a normalized (lowercase) tag name into its module category.
pub(crate) fn classify(name: &str) -> ModuleType {
    match name {
        "a" | "abbr" | "acronym" | "b" | "bdo" | "big" | "br" | "cite" | "code" | "dfn" | "em"
        | "font" | "i" | "img" | "kbd" | "q" | "s" | "samp" | "small" | "span" | "strike"
        | "strong" | "sub" | "sup" | "tt" | "u" | "var" | "wbr" => ModuleType::INLINE,
        "address" | "blockquote" | "center" | "del" | "div" | "h1" | "h2" | "h3" | "h4" | "h5"
        | "h6" | "hr" | "ins" | "p" | "pre" => ModuleType::BLOCK,
        "dd" | "dir" | "dl" | "dt" | "li" | "menu" | "ol" | "ul" => ModuleType::LIST,
        "caption" | "col" | "colgroup" | "table" | "tbody" | "td" | "tfoot" | "th" | "thead"
        | "tr" => ModuleType::TABLE,
        "button" | "fieldset" | "form" | "input" | "label" | "legend" | "optgroup" | "option"
        | "select" | "textarea" => ModuleType::FORM,
        "noscript" | "script" => ModuleType::SCRIPT,
        "applet" | "area" | "embed" | "frame" | "frameset" | "iframe" | "map" | "noframes"
        | "object" | "param" => ModuleType::EMBEDDED,
        "base" | "body" | "head" | "html" | "link" | "meta" | "title" => ModuleType::DOCUMENT,
        "style" => ModuleType::STYLE,
        _ => ModuleType::UNKNOWN,
    }
}

/// Insertion-ordered map with ASCII-folded keys.
///
/// Lookup is a linear scan; tags carry a handful of attributes, and a `Vec`
/// keeps output order identical to encounter order (first occurrence wins).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderedMap {
    entries: Vec<(String, String)>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with ASCII-lowercase key folding; a duplicate key is dropped.
    pub fn insert(&mut self, name: &str, value: String) {
        let folded = name.to_ascii_lowercase();
        if self.get(&folded).is_some() {
            return;
        }
        self.entries.push((folded, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// Comment tokens reuse the attribute map for their payload. No collision
// with parsed attributes: comment-form tokens never enter the attribute
// loop, and element tokens never use these keys.
const KEY_CONTENT: &str = "*content";
const KEY_END_DELIM: &str = "*end";

/// A parsed markup token.
#[derive(Clone, Debug)]
pub struct Tag {
    raw_name: String,
    name: String,
    tag_type: TagType,
    module_type: ModuleType,
    attributes: OrderedMap,
    styles: OrderedMap,
}

impl Tag {
    /// Build a tag from its raw name as it appeared after `<`.
    ///
    /// A leading `!`/`?`/`%` marks a comment-form token, a leading `/` an end
    /// tag, and a trailing `/` (self-closing syntax) or membership in the
    /// void-element whitelist a full tag.
    pub fn new(raw: &str) -> Self {
        let (tag_type, body) = match raw.as_bytes().first().copied() {
            Some(b'!') | Some(b'?') => (TagType::Comment, raw),
            Some(b'/') => (TagType::EndTag, &raw[1..]),
            _ => {
                if let Some(stripped) = raw.strip_suffix('/') {
                    (TagType::FullTag, stripped)
                } else if is_void_element(raw.to_ascii_lowercase().as_str()) {
                    (TagType::FullTag, raw)
                } else {
                    (TagType::BeginTag, raw)
                }
            }
        };
        let name = body.to_ascii_lowercase();
        let module_type = if tag_type == TagType::Comment {
            ModuleType::COMMENT
        } else {
            classify(&name)
        };
        Self {
            raw_name: body.to_string(),
            name,
            tag_type,
            module_type,
            attributes: OrderedMap::new(),
            styles: OrderedMap::new(),
        }
    }

    /// Build a comment-form token (`<!-- -->`, CDATA, declaration, PI).
    ///
    /// `raw_name` is the opening delimiter without `<` (e.g. `!--`),
    /// `end_delim` the closing delimiter without `>` (e.g. `--`).
    pub fn comment(raw_name: &str, content: &str, end_delim: &str) -> Self {
        let mut tag = Self::new(raw_name);
        debug_assert_eq!(tag.tag_type, TagType::Comment);
        tag.attributes.insert(KEY_CONTENT, content.to_string());
        tag.attributes.insert(KEY_END_DELIM, end_delim.to_string());
        tag
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    /// Name as it appeared in the source (original case).
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Normalized lowercase name; whitelists and balancing compare this.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &OrderedMap {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut OrderedMap {
        &mut self.attributes
    }

    pub fn styles(&self) -> &OrderedMap {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut OrderedMap {
        &mut self.styles
    }

    /// Comment payload (empty for non-comment tags).
    pub fn content(&self) -> &str {
        self.attributes.get(KEY_CONTENT).unwrap_or("")
    }

    /// Comment end delimiter without the closing `>`.
    pub fn end_delim(&self) -> &str {
        self.attributes.get(KEY_END_DELIM).unwrap_or("")
    }

    /// Synthetic close tag for this begin tag, preserving the raw name.
    pub fn close_tag(&self) -> Tag {
        debug_assert_eq!(self.tag_type, TagType::BeginTag);
        Tag {
            raw_name: self.raw_name.clone(),
            name: self.name.clone(),
            tag_type: TagType::EndTag,
            module_type: self.module_type,
            attributes: OrderedMap::new(),
            styles: OrderedMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_type_is_derived_from_raw_name() {
        assert_eq!(Tag::new("div").tag_type(), TagType::BeginTag);
        assert_eq!(Tag::new("/div").tag_type(), TagType::EndTag);
        assert_eq!(Tag::new("br").tag_type(), TagType::FullTag);
        assert_eq!(Tag::new("div/").tag_type(), TagType::FullTag);
        assert_eq!(Tag::new("!--").tag_type(), TagType::Comment);
        assert_eq!(Tag::new("?").tag_type(), TagType::Comment);
    }

    #[test]
    fn tag_keeps_raw_case_and_normalizes_name() {
        let tag = Tag::new("DiV");
        assert_eq!(tag.raw_name(), "DiV");
        assert_eq!(tag.name(), "div");
    }

    #[test]
    fn void_elements_are_full_tags_in_any_case() {
        assert_eq!(Tag::new("BR").tag_type(), TagType::FullTag);
        assert_eq!(Tag::new("Img").tag_type(), TagType::FullTag);
        assert_eq!(Tag::new("a").tag_type(), TagType::BeginTag);
    }

    #[test]
    fn end_tag_strips_slash_from_names() {
        let tag = Tag::new("/SPAN");
        assert_eq!(tag.raw_name(), "SPAN");
        assert_eq!(tag.name(), "span");
    }

    #[test]
    fn module_types_accumulate_bitwise() {
        let mut acc = ModuleType::NONE;
        acc |= classify("b");
        acc |= classify("table");
        assert!(acc.contains(ModuleType::INLINE));
        assert!(acc.contains(ModuleType::TABLE));
        assert!(!acc.contains(ModuleType::FORM));
        assert_eq!(format!("{acc:?}"), "Inline|Table");
    }

    #[test]
    fn unknown_tags_classify_as_unknown() {
        assert_eq!(classify("my-widget"), ModuleType::UNKNOWN);
        assert_eq!(Tag::new("my-widget").module_type(), ModuleType::UNKNOWN);
    }

    #[test]
    fn ordered_map_folds_keys_and_keeps_first_occurrence() {
        let mut map = OrderedMap::new();
        map.insert("HREF", "one".to_string());
        map.insert("href", "two".to_string());
        map.insert("Title", "t".to_string());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("href"), Some("one"));
        let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["href", "title"], "insertion order must survive");
    }

    #[test]
    fn comment_tag_round_trips_content_and_delimiter() {
        let tag = Tag::comment("!--", " hi ", "--");
        assert_eq!(tag.tag_type(), TagType::Comment);
        assert_eq!(tag.content(), " hi ");
        assert_eq!(tag.end_delim(), "--");
        assert_eq!(tag.module_type(), ModuleType::COMMENT);
    }

    #[test]
    fn close_tag_preserves_raw_name() {
        let open = Tag::new("DiV");
        let close = open.close_tag();
        assert_eq!(close.tag_type(), TagType::EndTag);
        assert_eq!(close.raw_name(), "DiV");
        assert_eq!(close.name(), "div");
    }
}
