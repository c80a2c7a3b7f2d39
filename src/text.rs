//! Text utilities: document pre-processing, HTML escaping, URL encoding,
//! label normalisation and backslash/entity resolution.

use crate::{entities, is_ascii_punctuation, utf8_char_len};
use std::borrow::Cow;

/// Normalise a document before block parsing:
///
/// 1. `\r\n` and bare `\r` become `\n`.
/// 2. A line-leading tab (after at most three spaces) becomes four spaces.
/// 3. U+2424 becomes a space, NUL becomes U+FFFD, and the literal entity
///    `&#0;` becomes `&#XFFFD;`.
/// 4. Whitespace-only lines become empty.
/// 5. Leading and trailing newlines are stripped from the document.
pub(crate) fn preprocess(src: &str) -> String {
    let normalized = if src.contains('\r') {
        Cow::Owned(src.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(src)
    };

    let mut out = String::with_capacity(normalized.len());
    for line in normalized.split('\n') {
        let line = expand_leading_tab(line);
        let line = substitute_specials(&line);
        if !line.bytes().all(|b| b == b' ' || b == b'\t') {
            out.push_str(&line);
        }
        out.push('\n');
    }

    let trimmed = out.trim_matches('\n');
    trimmed.to_string()
}

fn expand_leading_tab(line: &str) -> Cow<'_, str> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && i < 3 && bytes[i] == b' ' {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'\t' {
        let mut s = String::with_capacity(line.len() + 3);
        s.push_str(&line[..i]);
        s.push_str("    ");
        s.push_str(&line[i + 1..]);
        Cow::Owned(s)
    } else {
        Cow::Borrowed(line)
    }
}

fn substitute_specials<'a>(line: &'a str) -> Cow<'a, str> {
    if !line.contains('\0') && !line.contains('\u{2424}') && !line.contains("&#0;") {
        return Cow::Borrowed(line);
    }
    let mut s = line.replace("&#0;", "&#XFFFD;");
    if s.contains('\0') {
        s = s.replace('\0', "\u{FFFD}");
    }
    if s.contains('\u{2424}') {
        s = s.replace('\u{2424}', " ");
    }
    Cow::Owned(s)
}

#[cfg(test)]
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_html_into(&mut out, input);
    out
}

/// Escape `&`, `<`, `>` and `"` into `out`.
#[inline]
pub(crate) fn escape_html_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    if memchr::memchr3(b'&', b'<', b'>', bytes).is_none()
        && memchr::memchr(b'"', bytes).is_none()
    {
        out.push_str(input);
        return;
    }
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => continue,
        };
        out.push_str(&input[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }
    out.push_str(&input[last..]);
}

static URL_SAFE: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = b'A';
    while i <= b'Z' {
        t[i as usize] = true;
        i += 1;
    }
    let mut i = b'a';
    while i <= b'z' {
        t[i as usize] = true;
        i += 1;
    }
    let mut i = b'0';
    while i <= b'9' {
        t[i as usize] = true;
        i += 1;
    }
    let keep = b"-_.~@:+?=&()%#*,/";
    let mut j = 0;
    while j < keep.len() {
        t[keep[j] as usize] = true;
        j += 1;
    }
    t
};

static HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode a link destination for an `href`/`src` attribute,
/// preserving the reserved characters `@:+?=&()%#*,/` and re-encoding `&`
/// as `&amp;` for attribute safety.
pub(crate) fn encode_url_into(out: &mut String, url: &str) {
    for &b in url.as_bytes() {
        if b == b'&' {
            out.push_str("&amp;");
        } else if URL_SAFE[b as usize] {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX_CHARS[(b >> 4) as usize] as char);
            out.push(HEX_CHARS[(b & 0xF) as usize] as char);
        }
    }
}

/// Normalise a link label: trim, collapse internal whitespace runs to a
/// single space, casefold.
pub(crate) fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            in_space = false;
            match c {
                'ß' | 'ẞ' => out.push_str("ss"),
                _ => out.extend(c.to_lowercase()),
            }
        }
    }
    out
}

/// Resolve backslash escapes and HTML entity references in a string.
/// Used for fence info strings and anywhere else raw source text becomes
/// attribute-ready content.
pub(crate) fn resolve_escapes_and_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) {
            out.push(bytes[i + 1] as char);
            i += 2;
        } else if bytes[i] == b'&' {
            match entities::scan(bytes, i, &mut out) {
                Some(end) => i = end,
                None => {
                    out.push('&');
                    i += 1;
                }
            }
        } else {
            let ch_len = utf8_char_len(bytes[i]);
            out.push_str(&s[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}
