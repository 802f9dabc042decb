//! Whitelist policies: Strict (small, link/list/emphasis only) and Safe
//! (permissive HTML4 minus script-capable surface).

use crate::contains_ignore_ascii_case;
use crate::filter::HtmlFilter;
use crate::tag::{Tag, TagType};

/// Allow `http:`, `https:`, `mailto:`, or scheme-less (relative) URLs.
///
/// The scheme is whatever precedes the first `:` that occurs before any
/// `/`, `?`, or `#`; a URL without one is relative and passes.
pub(crate) fn is_safe_url(value: &str) -> bool {
    let value = value.trim();
    let scheme_end = match value.find([':', '/', '?', '#']) {
        Some(at) if value.as_bytes()[at] == b':' => at,
        _ => return true,
    };
    let scheme = &value[..scheme_end];
    scheme.eq_ignore_ascii_case("http")
        || scheme.eq_ignore_ascii_case("https")
        || scheme.eq_ignore_ascii_case("mailto")
}

/// Small whitelist for barely-trusted rich text: emphasis, links, lists,
/// images. No styles, no comments.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictFilter;

impl HtmlFilter for StrictFilter {
    fn filter_tag(&self, tag: &mut Tag) -> bool {
        if tag.tag_type() == TagType::Comment {
            return false;
        }
        matches!(
            tag.name(),
            "a" | "b"
                | "blockquote"
                | "br"
                | "em"
                | "i"
                | "img"
                | "li"
                | "ol"
                | "strong"
                | "u"
                | "ul"
        )
    }

    fn filter_attribute(&self, tag_name: &str, attr_name: &str, value: &mut String) -> bool {
        match (tag_name, attr_name) {
            ("a", "href") | ("img", "src") => is_safe_url(value),
            ("img", "alt") => true,
            _ => false,
        }
    }

    fn filter_style(&self, _tag_name: &str, _style_name: &str, _value: &mut String) -> bool {
        false
    }
}

/// Permissive HTML4 whitelist for user-submitted content.
///
/// Blocks `id` and every `on*` attribute on all tags, the layout-hijacking
/// style properties, and style values that smuggle script.
#[derive(Clone, Copy, Debug, Default)]
pub struct SafeFilter;

impl HtmlFilter for SafeFilter {
    fn filter_tag(&self, tag: &mut Tag) -> bool {
        if tag.tag_type() == TagType::Comment {
            return false;
        }
        matches!(
            tag.name(),
            "a" | "abbr"
                | "acronym"
                | "address"
                | "b"
                | "bdo"
                | "big"
                | "blockquote"
                | "br"
                | "caption"
                | "center"
                | "cite"
                | "code"
                | "col"
                | "colgroup"
                | "dd"
                | "del"
                | "dfn"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "em"
                | "fieldset"
                | "font"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "hr"
                | "i"
                | "img"
                | "ins"
                | "kbd"
                | "label"
                | "legend"
                | "li"
                | "map"
                | "menu"
                | "ol"
                | "p"
                | "pre"
                | "q"
                | "s"
                | "samp"
                | "small"
                | "span"
                | "strike"
                | "strong"
                | "sub"
                | "sup"
                | "table"
                | "tbody"
                | "td"
                | "tfoot"
                | "th"
                | "thead"
                | "tr"
                | "tt"
                | "u"
                | "ul"
                | "var"
                | "wbr"
        )
    }

    fn filter_attribute(&self, _tag_name: &str, attr_name: &str, value: &mut String) -> bool {
        if attr_name.eq_ignore_ascii_case("id") || starts_with_on(attr_name) {
            return false;
        }
        if attr_name.eq_ignore_ascii_case("href") || attr_name.eq_ignore_ascii_case("src") {
            return is_safe_url(value);
        }
        true
    }

    fn filter_style(&self, _tag_name: &str, style_name: &str, value: &mut String) -> bool {
        if matches!(style_name, "display" | "position" | "z-index") {
            return false;
        }
        !(contains_ignore_ascii_case(value, b"expression(")
            || contains_ignore_ascii_case(value, b"javascript:"))
    }
}

fn starts_with_on(attr_name: &str) -> bool {
    let bytes = attr_name.as_bytes();
    bytes.len() > 2 && bytes[..2].eq_ignore_ascii_case(b"on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_filter_allows_http_https_mailto_and_relative() {
        assert!(is_safe_url("http://example.com/"));
        assert!(is_safe_url("HTTPS://example.com/"));
        assert!(is_safe_url("mailto:a@example.com"));
        assert!(is_safe_url("/relative/path"));
        assert!(is_safe_url("page.html?q=1"));
        assert!(is_safe_url("#anchor"));
        assert!(is_safe_url("//host/protocol-relative"));
    }

    #[test]
    fn url_filter_blocks_script_schemes() {
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("JaVaScRiPt:alert(1)"));
        assert!(!is_safe_url("  vbscript:x"));
        assert!(!is_safe_url("data:text/html;base64,x"));
    }

    #[test]
    fn url_with_colon_in_query_is_judged_by_path_start() {
        // The first delimiter is `/`, so there is no scheme.
        assert!(is_safe_url("/redirect?to=javascript:x"));
    }

    #[test]
    fn strict_keeps_whitelist_and_drops_everything_else() {
        let filter = StrictFilter;
        assert!(filter.filter_tag(&mut Tag::new("b")));
        assert!(filter.filter_tag(&mut Tag::new("/ul")));
        assert!(!filter.filter_tag(&mut Tag::new("script")));
        assert!(!filter.filter_tag(&mut Tag::new("div")));
        assert!(!filter.filter_tag(&mut Tag::comment("!--", "x", "--")));
    }

    #[test]
    fn strict_attribute_policy_is_href_src_alt_only() {
        let filter = StrictFilter;
        let mut url = "http://x/".to_string();
        assert!(filter.filter_attribute("a", "href", &mut url));
        let mut js = "javascript:x".to_string();
        assert!(!filter.filter_attribute("a", "href", &mut js));
        let mut alt = "pic".to_string();
        assert!(filter.filter_attribute("img", "alt", &mut alt));
        let mut class = "c".to_string();
        assert!(!filter.filter_attribute("a", "class", &mut class));
    }

    #[test]
    fn safe_blocks_id_and_event_handler_attributes() {
        let filter = SafeFilter;
        let mut value = "x".to_string();
        assert!(!filter.filter_attribute("div", "id", &mut value));
        assert!(!filter.filter_attribute("div", "onclick", &mut value));
        assert!(!filter.filter_attribute("div", "ONLOAD", &mut value));
        assert!(filter.filter_attribute("div", "class", &mut value));
        // "on" alone is not an event handler prefix match.
        assert!(filter.filter_attribute("div", "on", &mut value));
    }

    #[test]
    fn safe_url_filters_href_and_src() {
        let filter = SafeFilter;
        let mut good = "https://example.com/a".to_string();
        assert!(filter.filter_attribute("a", "href", &mut good));
        let mut bad = "javascript:alert(1)".to_string();
        assert!(!filter.filter_attribute("a", "href", &mut bad));
        assert!(!filter.filter_attribute("img", "src", &mut bad));
    }

    #[test]
    fn safe_blocks_layout_properties_and_script_values() {
        let filter = SafeFilter;
        let mut value = "red".to_string();
        assert!(filter.filter_style("span", "color", &mut value));
        assert!(!filter.filter_style("span", "position", &mut value));
        assert!(!filter.filter_style("span", "display", &mut value));
        assert!(!filter.filter_style("span", "z-index", &mut value));
        let mut expr = "Expression(alert(1))".to_string();
        assert!(!filter.filter_style("span", "width", &mut expr));
        let mut js = "url(JAVASCRIPT:x)".to_string();
        assert!(!filter.filter_style("span", "background", &mut js));
    }

    #[test]
    fn safe_drops_script_and_form_tags() {
        let filter = SafeFilter;
        for name in ["script", "style", "iframe", "object", "form", "input"] {
            assert!(
                !filter.filter_tag(&mut Tag::new(name)),
                "{name} must not pass the safe whitelist"
            );
        }
    }
}
