//! HTML5 entity decoding.
//!
//! Named references come from the HTML5 registry; only the canonical
//! semicolon-terminated forms participate (CommonMark requires the `;`).
//! Numeric references accept up to seven hex or decimal digits; `&#0;` and
//! out-of-range code points decode to U+FFFD.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

static NAMED: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for e in ::entities::ENTITIES.iter() {
        if let Some(name) = e.entity.strip_prefix('&').and_then(|n| n.strip_suffix(';')) {
            map.entry(name).or_insert(e.characters);
        }
    }
    map
});

pub(crate) fn lookup_named(name: &str) -> Option<&'static str> {
    NAMED.get(name).copied()
}

pub(crate) fn decode_numeric(digits: &str, hex: bool) -> Option<char> {
    let cp = if hex {
        u32::from_str_radix(digits, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    if cp == 0 {
        return Some('\u{FFFD}');
    }
    Some(char::from_u32(cp).unwrap_or('\u{FFFD}'))
}

/// Scan an entity reference starting at `bytes[start] == b'&'`. On success
/// the decoded character(s) are appended to `out` and the byte offset just
/// past the `;` is returned.
pub(crate) fn scan(bytes: &[u8], start: usize, out: &mut String) -> Option<usize> {
    debug_assert_eq!(bytes[start], b'&');
    let mut i = start + 1;
    if i >= bytes.len() {
        return None;
    }

    if bytes[i] == b'#' {
        i += 1;
        let hex = matches!(bytes.get(i), Some(b'x') | Some(b'X'));
        if hex {
            i += 1;
        }
        let digits_start = i;
        if hex {
            while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                i += 1;
            }
        } else {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if i == digits_start || i - digits_start > 7 || bytes.get(i) != Some(&b';') {
            return None;
        }
        let digits = std::str::from_utf8(&bytes[digits_start..i]).ok()?;
        let c = decode_numeric(digits, hex)?;
        out.push(c);
        Some(i + 1)
    } else {
        let name_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        if i == name_start || bytes.get(i) != Some(&b';') {
            return None;
        }
        let name = std::str::from_utf8(&bytes[name_start..i]).ok()?;
        let decoded = lookup_named(name)?;
        out.push_str(decoded);
        Some(i + 1)
    }
}
