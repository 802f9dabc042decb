//! Minimal, explicitly limited entity encoding/decoding.
//!
//! Contract:
//! - Named entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`,
//!   `&nbsp;`.
//! - Numeric entities decoded only when well-formed and semicolon-terminated:
//!   `&#123;` (decimal) and `&#x1F4A9;` (hex).
//! - Only valid Unicode scalar values decode; invalid scalars pass through
//!   unchanged, as do missing semicolons, unknown names, and malformed or
//!   overlong digit runs.
//!
//! This is intentionally not HTML5-spec-complete. Keep the behavior narrow
//! and stable: attribute values decode through here on parse and re-encode on
//! render, which is what keeps repeated sanitization a fixed point.

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111
const MAX_NAME_LEN: usize = 32;

/// Result of probing for an entity at a `&`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntityScan {
    /// Well-formed entity occupying `len` bytes (including `&` and `;`).
    Entity { len: usize },
    /// Definitely not an entity.
    NotEntity,
    /// Input ended while the run still looked like an entity; a later chunk
    /// could complete it.
    NeedMoreInput,
}

/// Probe `s[at..]` (which must start with `&`) for a well-formed entity.
///
/// The scan is bounded so adversarial input cannot go quadratic. Any
/// character that disqualifies the run short-circuits to `NotEntity`; running
/// out of input before a decision yields `NeedMoreInput` so the incremental
/// driver can pause instead of guessing.
pub(crate) fn scan_entity(s: &str, at: usize) -> EntityScan {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes.get(at), Some(&b'&'));
    let mut i = at + 1;
    let len = bytes.len();
    if i >= len {
        return EntityScan::NeedMoreInput;
    }

    let (is_digit, max_digits): (fn(u8) -> bool, usize) = if bytes[i] == b'#' {
        i += 1;
        if i >= len {
            return EntityScan::NeedMoreInput;
        }
        if bytes[i] == b'x' || bytes[i] == b'X' {
            i += 1;
            (|b: u8| b.is_ascii_hexdigit(), MAX_HEX_DIGITS)
        } else {
            (|b: u8| b.is_ascii_digit(), MAX_DEC_DIGITS)
        }
    } else {
        (|b: u8| b.is_ascii_alphanumeric(), MAX_NAME_LEN)
    };

    let run_start = i;
    while i < len {
        let b = bytes[i];
        if b == b';' {
            if i == run_start {
                return EntityScan::NotEntity;
            }
            return EntityScan::Entity { len: i + 1 - at };
        }
        if i - run_start == max_digits || !is_digit(b) {
            return EntityScan::NotEntity;
        }
        i += 1;
    }
    EntityScan::NeedMoreInput
}

/// Decode the minimal entity set in `s`.
pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let mut copy_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        let (decoded, consumed) = match decode_one(s, i) {
            Some(pair) => pair,
            None => {
                i += 1;
                continue;
            }
        };
        // Flush bytes up to `&` unchanged (preserves UTF-8).
        if copy_start < i {
            out.push_str(&s[copy_start..i]);
        }
        out.push(decoded);
        i += consumed;
        copy_start = i;
    }
    if copy_start == 0 {
        return s.to_string();
    }
    if copy_start < bytes.len() {
        out.push_str(&s[copy_start..]);
    }
    out
}

fn decode_one(s: &str, at: usize) -> Option<(char, usize)> {
    let len = match scan_entity(s, at) {
        EntityScan::Entity { len } => len,
        _ => return None,
    };
    let body = &s[at + 1..at + len - 1];
    if let Some(numeric) = body.strip_prefix('#') {
        let value = if let Some(hex) = numeric.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            numeric.parse::<u32>().ok()?
        };
        return char::from_u32(value).map(|ch| (ch, len));
    }
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        _ => return None,
    };
    Some((ch, len))
}

/// Encode an attribute value for embedding inside double quotes.
pub(crate) fn encode_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Render a non-ASCII scalar as an uppercase-hex numeric entity.
pub(crate) fn write_numeric_entity(ch: char, out: &mut String) {
    use std::fmt::Write;
    let _ = write!(out, "&#x{:X};", ch as u32);
}
