//! Container block rules: blockquotes and lists. Both collect their
//! marker-stripped interior and recurse into `parse_region`.

use super::leaf_blocks::is_thematic_break;
use super::{
    interrupts_paragraph, is_blank, parse_region, skip_columns, split_indent, Cursor, RuleResult,
};
use crate::inline::RefMap;
use crate::token::{Token, TokenKind};

pub(super) fn blockquote(cur: &mut Cursor<'_>, refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 || !rest.starts_with('>') {
        return Ok(None);
    }
    let start = cur.offset();
    let mut content = String::new();
    // Laziness bookkeeping: a continuation line without a marker is taken
    // only while the quote tail is unindented paragraph content.
    let mut tail_is_text = false;
    let mut tail_indented = false;
    while let Some(line) = cur.line_opt() {
        let (indent, rest) = split_indent(line);
        if indent <= 3 && rest.starts_with('>') {
            let inner = &rest[1..];
            let inner = inner
                .strip_prefix(' ')
                .or_else(|| inner.strip_prefix('\t'))
                .unwrap_or(inner);
            content.push_str(inner);
            content.push('\n');
            tail_is_text = !is_blank(inner);
            tail_indented = split_indent(inner).0 >= 4;
            cur.bump();
        } else if tail_is_text
            && !tail_indented
            && !is_blank(line)
            && !interrupts_paragraph(line)
            && !super::table::starts_at(cur, cur.pos)
        {
            content.push_str(line.trim_start());
            content.push('\n');
            cur.bump();
        } else {
            break;
        }
    }
    let mut token = Token::new(TokenKind::Blockquote, start..cur.offset());
    token.children = parse_region(&content, refs)?;
    Ok(Some(token))
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ListMarker {
    /// Bytes taken by the marker itself (`-` is 1, `12.` is 3).
    pub(crate) len: usize,
    pub(crate) bullet: Option<u8>,
    pub(crate) delim: u8,
    pub(crate) number: u32,
    pub(crate) empty: bool,
}

impl ListMarker {
    pub(crate) fn can_interrupt(&self) -> bool {
        !self.empty && (self.bullet.is_some() || self.number == 1)
    }
}

pub(crate) fn scan_any_marker(rest: &str) -> Option<ListMarker> {
    scan_marker(rest, false).or_else(|| scan_marker(rest, true))
}

fn scan_marker(rest: &str, ordered: bool) -> Option<ListMarker> {
    let bytes = rest.as_bytes();
    if ordered {
        let mut i = 0;
        while i < bytes.len() && i < 9 && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == 0 {
            return None;
        }
        let delim = *bytes.get(i)?;
        if delim != b'.' && delim != b')' {
            return None;
        }
        if let Some(&next) = bytes.get(i + 1) {
            if next != b' ' && next != b'\t' {
                return None;
            }
        }
        let number: u32 = rest[..i].parse().ok()?;
        Some(ListMarker {
            len: i + 1,
            bullet: None,
            delim,
            number,
            empty: rest_is_blank(bytes, i + 1),
        })
    } else {
        let b0 = *bytes.first()?;
        if b0 != b'-' && b0 != b'+' && b0 != b'*' {
            return None;
        }
        if let Some(&next) = bytes.get(1) {
            if next != b' ' && next != b'\t' {
                return None;
            }
        }
        Some(ListMarker {
            len: 1,
            bullet: Some(b0),
            delim: 0,
            number: 0,
            empty: rest_is_blank(bytes, 1),
        })
    }
}

#[inline(always)]
fn rest_is_blank(bytes: &[u8], from: usize) -> bool {
    bytes[from.min(bytes.len())..]
        .iter()
        .all(|&b| b == b' ' || b == b'\t')
}

pub(super) fn unordered_list(cur: &mut Cursor<'_>, refs: &mut RefMap) -> RuleResult {
    list(cur, refs, false)
}

pub(super) fn ordered_list(cur: &mut Cursor<'_>, refs: &mut RefMap) -> RuleResult {
    list(cur, refs, true)
}

fn list(cur: &mut Cursor<'_>, refs: &mut RefMap, ordered: bool) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 {
        return Ok(None);
    }
    let Some(first) = scan_marker(rest, ordered) else {
        return Ok(None);
    };
    // `- - -` and `* * *` are thematic breaks, never single-item lists.
    if !ordered && is_thematic_break(rest) {
        return Ok(None);
    }

    let start = cur.offset();
    let list_start_num = first.number;
    let bullet = first.bullet;
    let delim = first.delim;
    let mut items: Vec<Token> = Vec::new();
    let mut loose = false;
    let mut blank_before_item = false;

    loop {
        let Some(line) = cur.line_opt() else { break };
        let (indent, rest) = split_indent(line);
        if indent >= 4 {
            break;
        }
        let Some(marker) = scan_marker(rest, ordered) else {
            break;
        };
        if marker.bullet != bullet || marker.delim != delim {
            break;
        }
        if !ordered && is_thematic_break(rest) {
            break;
        }
        if blank_before_item {
            loose = true;
        }

        let item_start = cur.offset();
        let marker_text = rest[..marker.len].to_string();
        let content_col = indent + marker.len + 1;
        let mut content = String::new();
        if !marker.empty {
            let after_marker = &rest[marker.len..];
            let first_line = after_marker
                .strip_prefix(' ')
                .or_else(|| after_marker.strip_prefix('\t'))
                .unwrap_or(after_marker);
            content.push_str(first_line);
            content.push('\n');
        }
        let mut tail_is_text = !marker.empty;
        let mut internal_blank = false;
        cur.bump();

        let mut pending_blanks = 0usize;
        blank_before_item = false;
        loop {
            let Some(line) = cur.line_opt() else {
                cur.rewind(pending_blanks);
                break;
            };
            if is_blank(line) {
                pending_blanks += 1;
                cur.bump();
                continue;
            }
            let (line_indent, rest) = split_indent(line);
            if line_indent >= content_col {
                if pending_blanks > 0 {
                    for _ in 0..pending_blanks {
                        content.push('\n');
                    }
                    pending_blanks = 0;
                    internal_blank = true;
                }
                content.push_str(&skip_columns(line, content_col));
                content.push('\n');
                tail_is_text = true;
                cur.bump();
            } else if line_indent <= 3 && scan_any_marker(rest).is_some() {
                // Next item (of this list or another) ends this one.
                blank_before_item = pending_blanks > 0;
                break;
            } else if pending_blanks == 0
                && tail_is_text
                && !interrupts_paragraph(line)
                && !super::table::starts_at(cur, cur.pos)
            {
                content.push_str(line.trim_start());
                content.push('\n');
                cur.bump();
            } else {
                cur.rewind(pending_blanks);
                break;
            }
        }

        if internal_blank {
            loose = true;
        }
        let mut item = Token::new(
            TokenKind::ListItem {
                marker: marker_text,
            },
            item_start..cur.offset(),
        );
        item.children = parse_region(&content, refs)?;
        items.push(item);
    }

    let kind = if ordered {
        TokenKind::OrderedList {
            start: list_start_num,
            loose,
        }
    } else {
        TokenKind::UnorderedList { loose }
    };
    let mut token = Token::new(kind, start..cur.offset());
    token.children = items;
    Ok(Some(token))
}
