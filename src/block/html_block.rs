//! HTML blocks: seven start/end pattern pairs, tried in order. Types 1-5
//! end on a content condition (which may be satisfied on the start line
//! itself); types 6 and 7 run until a blank line, and type 7 never
//! interrupts a paragraph.

use super::{is_blank, split_indent, Cursor, RuleResult};
use crate::inline::RefMap;
use crate::token::{Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum HtmlBlockEnd {
    EndTag(&'static str),
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    BlankLine,
}

static TYPE6_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "source",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

pub(super) fn html_block(cur: &mut Cursor<'_>, _refs: &mut RefMap) -> RuleResult {
    let (indent, rest) = split_indent(cur.line());
    if indent >= 4 {
        return Ok(None);
    }
    let Some(end_condition) = block_start(rest, false) else {
        return Ok(None);
    };
    let start = cur.offset();
    let mut content = String::new();
    let first = cur.line();
    content.push_str(first);
    cur.bump();
    if !ends(end_condition, first) {
        while let Some(line) = cur.line_opt() {
            if end_condition == HtmlBlockEnd::BlankLine && is_blank(line) {
                break;
            }
            content.push('\n');
            content.push_str(line);
            cur.bump();
            if ends(end_condition, line) {
                break;
            }
        }
    }
    Ok(Some(Token::with_text(
        TokenKind::HtmlBlock,
        start..cur.offset(),
        content,
    )))
}

/// Detect an HTML block opener. With `in_paragraph` set, type 7 (a generic
/// complete tag alone on its line) is excluded.
pub(super) fn block_start(rest: &str, in_paragraph: bool) -> Option<HtmlBlockEnd> {
    let bytes = rest.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    if starts_with_tag_ci(bytes, b"script") {
        return Some(HtmlBlockEnd::EndTag("</script>"));
    }
    if starts_with_tag_ci(bytes, b"pre") {
        return Some(HtmlBlockEnd::EndTag("</pre>"));
    }
    if starts_with_tag_ci(bytes, b"style") {
        return Some(HtmlBlockEnd::EndTag("</style>"));
    }

    if rest.starts_with("<!--") {
        return Some(HtmlBlockEnd::Comment);
    }
    if rest.starts_with("<?") {
        return Some(HtmlBlockEnd::ProcessingInstruction);
    }
    if rest.starts_with("<![CDATA[") {
        return Some(HtmlBlockEnd::Cdata);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_uppercase() {
        return Some(HtmlBlockEnd::Declaration);
    }

    if type6_tag(rest) {
        return Some(HtmlBlockEnd::BlankLine);
    }
    if !in_paragraph && type7_line(rest) {
        return Some(HtmlBlockEnd::BlankLine);
    }

    None
}

fn starts_with_tag_ci(bytes: &[u8], tag: &[u8]) -> bool {
    if bytes.len() < 1 + tag.len() || bytes[0] != b'<' {
        return false;
    }
    for (i, &t) in tag.iter().enumerate() {
        if bytes[1 + i].to_ascii_lowercase() != t {
            return false;
        }
    }
    matches!(
        bytes.get(1 + tag.len()),
        None | Some(b' ') | Some(b'\t') | Some(b'>')
    )
}

fn type6_tag(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    let start = if bytes[1] == b'/' { 2 } else { 1 };
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    if end == start || end - start > 10 {
        return false;
    }
    if let Some(&next) = bytes.get(end) {
        if !matches!(next, b' ' | b'\t' | b'>' | b'/') {
            return false;
        }
    }
    let mut buf = [0u8; 10];
    let tag_len = end - start;
    for i in 0..tag_len {
        buf[i] = bytes[start + i].to_ascii_lowercase();
    }
    TYPE6_TAGS
        .binary_search_by(|t| t.as_bytes().cmp(&buf[..tag_len]))
        .is_ok()
}

/// A complete open or close tag occupying the whole line.
fn type7_line(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    let is_close = bytes[1] == b'/';
    let mut i = if is_close { 2 } else { 1 };
    if i >= bytes.len() || !bytes[i].is_ascii_alphabetic() {
        return false;
    }
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }

    if is_close {
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'>') {
            return false;
        }
        i += 1;
    } else {
        loop {
            let before = i;
            while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
                i += 1;
            }
            let had_space = i > before;
            if i >= bytes.len() {
                return false;
            }
            if bytes[i] == b'>' {
                i += 1;
                break;
            }
            if bytes[i] == b'/' {
                if bytes.get(i + 1) != Some(&b'>') {
                    return false;
                }
                i += 2;
                break;
            }
            if !had_space {
                return false;
            }
            if !bytes[i].is_ascii_alphabetic() && bytes[i] != b'_' && bytes[i] != b':' {
                return false;
            }
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
            {
                i += 1;
            }
            while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
                i += 1;
            }
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
                    i += 1;
                }
                if i >= bytes.len() {
                    return false;
                }
                if bytes[i] == b'\'' || bytes[i] == b'"' {
                    let quote = bytes[i];
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return false;
                    }
                    i += 1;
                } else {
                    if matches!(bytes[i], b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`') {
                        return false;
                    }
                    while i < bytes.len()
                        && !matches!(bytes[i], b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
                    {
                        i += 1;
                    }
                }
            }
        }
    }

    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

fn ends(condition: HtmlBlockEnd, line: &str) -> bool {
    match condition {
        HtmlBlockEnd::EndTag(tag) => contains_ci(line.as_bytes(), tag.as_bytes()),
        HtmlBlockEnd::Comment => line.contains("-->"),
        HtmlBlockEnd::ProcessingInstruction => line.contains("?>"),
        HtmlBlockEnd::Declaration => line.contains('>'),
        HtmlBlockEnd::Cdata => line.contains("]]>"),
        HtmlBlockEnd::BlankLine => false,
    }
}

fn contains_ci(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    'outer: for i in 0..=haystack.len() - needle.len() {
        for (j, &n) in needle.iter().enumerate() {
            if haystack[i + j].to_ascii_lowercase() != n {
                continue 'outer;
            }
        }
        return true;
    }
    false
}
