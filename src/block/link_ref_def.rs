//! Link reference definitions, plus the destination and title scanners
//! shared with inline link parsing. Destinations and titles come out with
//! backslash escapes removed and entity references decoded.

use super::{split_indent, Cursor, RuleResult};
use crate::inline::{RefDef, RefMap};
use crate::text::normalize_label;
use crate::token::{Token, TokenKind};
use crate::{entities, is_ascii_punctuation, utf8_char_len};

pub(super) fn reference_definition(cur: &mut Cursor<'_>, refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 || !rest.starts_with('[') {
        return Ok(None);
    }
    let Some(def) = parse_ref_def(cur.remainder()) else {
        return Ok(None);
    };
    let start = cur.offset();
    cur.advance_past_offset(start + def.consumed);

    let label = normalize_label(&def.label);
    if !refs.contains_key(&label) {
        refs.insert(
            label.clone(),
            RefDef {
                url: def.url.clone(),
                title: def.title.clone(),
            },
        );
    }
    Ok(Some(Token::new(
        TokenKind::Reference {
            label,
            url: def.url,
            title: def.title,
        },
        start..cur.offset(),
    )))
}

struct ParsedRefDef {
    label: String,
    url: String,
    title: Option<String>,
    consumed: usize,
}

fn parse_ref_def(input: &str) -> Option<ParsedRefDef> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() && i < 3 && bytes[i] == b' ' {
        i += 1;
    }
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    i += 1;

    // The label keeps its backslashes; matching happens on the raw text.
    let label_start = i;
    loop {
        match bytes.get(i) {
            None | Some(&b'[') => return None,
            Some(&b']') => break,
            Some(&b'\\') if i + 1 < bytes.len() => i += 1 + utf8_char_len(bytes[i + 1]),
            Some(&b) => i += utf8_char_len(b),
        }
    }
    let label = &input[label_start..i];
    if label.trim().is_empty() || label.len() > 999 {
        return None;
    }
    i += 1;

    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i += 1;
    i = skip_spaces_and_one_newline(bytes, i);

    let (url, after_dest) = parse_link_destination(input, i)?;
    i = after_dest;

    let before_title = i;
    let title_start = skip_spaces_and_one_newline(bytes, i);
    if title_start > before_title && title_start < bytes.len() {
        if let Some((title, after_title)) = parse_link_title(input, title_start) {
            let end = skip_line_spaces(bytes, after_title);
            if end >= bytes.len() || bytes[end] == b'\n' {
                let consumed = if end < bytes.len() { end + 1 } else { end };
                return Some(ParsedRefDef {
                    label: label.to_string(),
                    url,
                    title: Some(title),
                    consumed,
                });
            }
        }
    }

    // No (valid) title: the rest of the destination line must be blank.
    let end = skip_line_spaces(bytes, before_title);
    if end < bytes.len() && bytes[end] != b'\n' {
        return None;
    }
    let consumed = if end < bytes.len() { end + 1 } else { end };
    Some(ParsedRefDef {
        label: label.to_string(),
        url,
        title: None,
        consumed,
    })
}

fn skip_spaces_and_one_newline(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'\n' {
        i += 1;
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
            i += 1;
        }
    }
    i
}

fn skip_line_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    i
}

/// Parse a link destination at `start`: either `<…>` (no unescaped `<`,
/// `>` or newline inside) or a bare run with balanced unescaped
/// parentheses and no whitespace or control characters.
pub(crate) fn parse_link_destination(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return None;
    }

    if bytes[start] == b'<' {
        let mut i = start + 1;
        let mut dest = String::new();
        loop {
            match bytes.get(i) {
                None | Some(&b'<') | Some(&b'\n') => return None,
                Some(&b'>') => return Some((dest, i + 1)),
                Some(&b'\\') if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                    dest.push(bytes[i + 1] as char);
                    i += 2;
                }
                Some(&b'&') => match entities::scan(bytes, i, &mut dest) {
                    Some(end) => i = end,
                    None => {
                        dest.push('&');
                        i += 1;
                    }
                },
                Some(&b) => {
                    let ch_len = utf8_char_len(b);
                    dest.push_str(&input[i..i + ch_len]);
                    i += ch_len;
                }
            }
        }
    }

    let mut i = start;
    let mut depth = 0i32;
    let mut dest = String::new();
    while i < bytes.len() {
        let b = bytes[i];
        if b <= b' ' {
            break;
        }
        match b {
            b'(' => {
                depth += 1;
                if depth > 32 {
                    return None;
                }
                dest.push('(');
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                dest.push(')');
                i += 1;
            }
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                dest.push(bytes[i + 1] as char);
                i += 2;
            }
            b'&' => match entities::scan(bytes, i, &mut dest) {
                Some(end) => i = end,
                None => {
                    dest.push('&');
                    i += 1;
                }
            },
            _ => {
                let ch_len = utf8_char_len(b);
                dest.push_str(&input[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    if depth != 0 || i == start {
        return None;
    }
    Some((dest, i))
}

/// Parse a link title at `start`, delimited by `"…"`, `'…'` or `(…)`.
/// A blank line inside the title is not allowed.
pub(crate) fn parse_link_title(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let quote = *bytes.get(start)?;
    let close = match quote {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = start + 1;
    let mut title = String::new();
    while i < bytes.len() {
        let b = bytes[i];
        if b == close {
            return Some((title, i + 1));
        }
        if b == b'(' && quote == b'(' {
            return None;
        }
        if b == b'\\' && i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) {
            title.push(bytes[i + 1] as char);
            i += 2;
        } else if b == b'&' {
            match entities::scan(bytes, i, &mut title) {
                Some(end) => i = end,
                None => {
                    title.push('&');
                    i += 1;
                }
            }
        } else if b == b'\n' {
            let next = skip_line_spaces(bytes, i + 1);
            if next < bytes.len() && bytes[next] == b'\n' {
                return None;
            }
            title.push('\n');
            i += 1;
        } else {
            let ch_len = utf8_char_len(b);
            title.push_str(&input[i..i + ch_len]);
            i += ch_len;
        }
    }
    None
}
