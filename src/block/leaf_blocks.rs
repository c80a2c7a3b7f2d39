//! Leaf block rules: thematic breaks, headings, code blocks, blank lines
//! and paragraphs.

use super::{
    interrupts_paragraph, is_blank, skip_columns, split_indent, Cursor, RuleResult,
};
use crate::inline::RefMap;
use crate::token::{Token, TokenKind};

pub(super) fn thematic_break(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 || !is_thematic_break(rest) {
        return Ok(None);
    }
    let start = cur.offset();
    cur.bump();
    Ok(Some(Token::new(TokenKind::ThematicBreak, start..cur.offset())))
}

pub(crate) fn is_thematic_break(rest: &str) -> bool {
    let mut marker: u8 = 0;
    let mut count: u32 = 0;
    for b in rest.bytes() {
        match b {
            b' ' | b'\t' => continue,
            b'*' | b'-' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if b != marker {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

pub(super) fn atx_heading(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 {
        return Ok(None);
    }
    let Some((level, content)) = parse_atx_heading(rest) else {
        return Ok(None);
    };
    let start = cur.offset();
    cur.bump();
    Ok(Some(Token::with_text(
        TokenKind::AtxHeading { level },
        start..cur.offset(),
        content.to_string(),
    )))
}

pub(crate) fn parse_atx_heading(rest: &str) -> Option<(u8, &str)> {
    let bytes = rest.as_bytes();
    if bytes.is_empty() || bytes[0] != b'#' {
        return None;
    }
    let mut level = 0u8;
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b'#' {
        level += 1;
        i += 1;
        if level > 6 {
            return None;
        }
    }
    if i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'\t' {
        return None;
    }
    let content = if i >= bytes.len() {
        ""
    } else {
        strip_closing_hashes(rest[i..].trim())
    };
    Some((level, content))
}

fn strip_closing_hashes(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'#' {
        end -= 1;
    }
    if end == bytes.len() {
        return s;
    }
    if end == 0 {
        return "";
    }
    if bytes[end - 1] == b' ' || bytes[end - 1] == b'\t' {
        s[..end].trim_end()
    } else {
        s
    }
}

pub(super) fn setext_heading(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    if is_blank(cur.line()) {
        return Ok(None);
    }
    let mut k = cur.pos + 1;
    loop {
        let Some(line) = cur.line_at(k) else {
            return Ok(None);
        };
        if is_blank(line) {
            return Ok(None);
        }
        let (indent, rest) = split_indent(line);
        if indent <= 3 {
            if let Some(level) = setext_underline(rest) {
                let mut content = String::new();
                for i in cur.pos..k {
                    if i > cur.pos {
                        content.push('\n');
                    }
                    content.push_str(cur.line_at(i).unwrap_or("").trim());
                }
                let start = cur.offset();
                cur.seek(k + 1);
                return Ok(Some(Token::with_text(
                    TokenKind::SetextHeading { level },
                    start..cur.offset(),
                    content,
                )));
            }
        }
        if interrupts_paragraph(line) || super::table::starts_at(cur, k) {
            return Ok(None);
        }
        k += 1;
    }
}

fn setext_underline(rest: &str) -> Option<u8> {
    let trimmed = rest.trim_end();
    let bytes = trimmed.as_bytes();
    let first = *bytes.first()?;
    if first != b'=' && first != b'-' {
        return None;
    }
    if !bytes.iter().all(|&b| b == first) {
        return None;
    }
    Some(if first == b'=' { 1 } else { 2 })
}

pub(super) fn indented_code(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let line = cur.line();
    if is_blank(line) || split_indent(line).0 < 4 {
        return Ok(None);
    }
    let start = cur.offset();
    let mut content = String::new();
    let mut pending_blanks = 0usize;
    while let Some(line) = cur.line_opt() {
        if is_blank(line) {
            pending_blanks += 1;
            cur.bump();
            continue;
        }
        if split_indent(line).0 < 4 {
            break;
        }
        for _ in 0..pending_blanks {
            content.push('\n');
        }
        pending_blanks = 0;
        content.push_str(&skip_columns(line, 4));
        content.push('\n');
        cur.bump();
    }
    cur.rewind(pending_blanks);
    Ok(Some(Token::with_text(
        TokenKind::IndentedCode,
        start..cur.offset(),
        content,
    )))
}

pub(super) fn fence_code(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 {
        return Ok(None);
    }
    let Some((fence_char, fence_len, info)) = parse_fence_start(rest) else {
        return Ok(None);
    };
    let start = cur.offset();
    let info = info.to_string();
    cur.bump();
    let mut content = String::new();
    while let Some(line) = cur.line_opt() {
        let (line_indent, rest) = split_indent(line);
        if line_indent <= 3 && is_closing_fence(rest, fence_char, fence_len) {
            cur.bump();
            break;
        }
        content.push_str(&skip_columns(line, indent));
        content.push('\n');
        cur.bump();
    }
    Ok(Some(Token::with_text(
        TokenKind::FenceCode { info },
        start..cur.offset(),
        content,
    )))
}

pub(crate) fn parse_fence_start(rest: &str) -> Option<(u8, usize, &str)> {
    let bytes = rest.as_bytes();
    let fence_char = *bytes.first()?;
    if fence_char != b'`' && fence_char != b'~' {
        return None;
    }
    let mut i = 0;
    while i < bytes.len() && bytes[i] == fence_char {
        i += 1;
    }
    if i < 3 {
        return None;
    }
    let info = rest[i..].trim();
    if fence_char == b'`' && info.contains('`') {
        return None;
    }
    Some((fence_char, i, info))
}

fn is_closing_fence(rest: &str, fence_char: u8, fence_len: usize) -> bool {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == fence_char {
        i += 1;
    }
    if i < fence_len {
        return false;
    }
    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

pub(super) fn blank_line(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    if !is_blank(cur.line()) {
        return Ok(None);
    }
    let start = cur.offset();
    while !cur.is_eof() && is_blank(cur.line()) {
        cur.bump();
    }
    Ok(Some(Token::new(TokenKind::BlankLine, start..cur.offset())))
}

pub(super) fn paragraph(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let first = cur.line();
    if is_blank(first) {
        return Ok(None);
    }
    let start = cur.offset();
    let mut text = String::from(first.trim_start());
    cur.bump();
    while let Some(line) = cur.line_opt() {
        if is_blank(line) || interrupts_paragraph(line) || super::table::starts_at(cur, cur.pos) {
            break;
        }
        text.push('\n');
        text.push_str(line.trim_start());
        cur.bump();
    }
    while text.ends_with(' ') || text.ends_with('\t') {
        text.pop();
    }
    Ok(Some(Token::with_text(
        TokenKind::Paragraph,
        start..cur.offset(),
        text,
    )))
}
