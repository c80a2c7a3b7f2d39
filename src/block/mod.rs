//! The block parser: a cursor over the pre-processed document's lines and
//! an ordered rule table. Each dispatch step tries the rules in order; the
//! first rule that matches consumes one or more lines and yields a token.
//! Rule order encodes precedence (a thematic break beats a `-` list, a
//! reference definition beats a paragraph).

mod containers;
mod html_block;
mod leaf_blocks;
pub(crate) mod link_ref_def;
mod table;

use crate::inline::RefMap;
use crate::token::{Token, TokenKind};
use crate::MarkdownError;
use std::borrow::Cow;

pub(crate) type RuleResult = Result<Option<Token>, MarkdownError>;

type BlockRule = fn(&mut Cursor<'_>, &mut RefMap) -> RuleResult;

static BLOCK_RULES: &[BlockRule] = &[
    link_ref_def::reference_definition,
    leaf_blocks::thematic_break,
    containers::blockquote,
    containers::unordered_list,
    containers::ordered_list,
    leaf_blocks::indented_code,
    leaf_blocks::fence_code,
    html_block::html_block,
    table::table,
    leaf_blocks::blank_line,
    leaf_blocks::atx_heading,
    leaf_blocks::setext_heading,
    leaf_blocks::paragraph,
];

pub(crate) fn parse_document(text: &str, refs: &mut RefMap) -> Result<Token, MarkdownError> {
    let mut doc = Token::new(TokenKind::Document, 0..text.len());
    doc.children = parse_region(text, refs)?;
    Ok(doc)
}

/// Parse one region of text into a block sequence. Containers call back
/// into this with their marker-stripped interiors, which is where nesting
/// recursion lives.
pub(crate) fn parse_region(text: &str, refs: &mut RefMap) -> Result<Vec<Token>, MarkdownError> {
    let mut cur = Cursor::new(text);
    let mut children = Vec::new();
    'next: while !cur.is_eof() {
        for rule in BLOCK_RULES {
            if let Some(token) = rule(&mut cur, refs)? {
                children.push(token);
                continue 'next;
            }
        }
        return Err(MarkdownError::MalformedBlock { offset: cur.offset() });
    }
    Ok(children)
}

/// A line-oriented cursor into one region of text. Lines exclude their
/// trailing newline; a trailing newline on the region does not produce an
/// empty final line.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    lines: Vec<(usize, usize)>,
    pub(crate) pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::with_capacity(bytes.len() / 32 + 1);
        let mut start = 0;
        for nl in memchr::memchr_iter(b'\n', bytes) {
            lines.push((start, nl));
            start = nl + 1;
        }
        if start < bytes.len() {
            lines.push((start, bytes.len()));
        }
        Self {
            text,
            lines,
            pos: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// The current line; only valid while not at EOF.
    #[inline(always)]
    pub(crate) fn line(&self) -> &'a str {
        let (start, end) = self.lines[self.pos];
        &self.text[start..end]
    }

    #[inline(always)]
    pub(crate) fn line_opt(&self) -> Option<&'a str> {
        self.line_at(self.pos)
    }

    #[inline]
    pub(crate) fn line_at(&self, index: usize) -> Option<&'a str> {
        let (start, end) = *self.lines.get(index)?;
        Some(&self.text[start..end])
    }

    /// Byte offset of the current line's start (or the region length at EOF).
    #[inline(always)]
    pub(crate) fn offset(&self) -> usize {
        match self.lines.get(self.pos) {
            Some(&(start, _)) => start,
            None => self.text.len(),
        }
    }

    /// Everything from the current line's start to the end of the region.
    #[inline(always)]
    pub(crate) fn remainder(&self) -> &'a str {
        &self.text[self.offset()..]
    }

    #[inline(always)]
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    #[inline(always)]
    pub(crate) fn rewind(&mut self, n: usize) {
        self.pos -= n;
    }

    pub(crate) fn seek(&mut self, index: usize) {
        self.pos = index;
    }

    /// Advance past all lines that start before `offset`.
    pub(crate) fn advance_past_offset(&mut self, offset: usize) {
        while self.pos < self.lines.len() && self.lines[self.pos].0 < offset {
            self.pos += 1;
        }
    }
}

#[inline(always)]
pub(crate) fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Leading-whitespace columns (tabs advance to the next multiple of four)
/// and the rest of the line.
pub(crate) fn split_indent(line: &str) -> (usize, &str) {
    let bytes = line.as_bytes();
    let mut col = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' => col += 1,
            b'\t' => col += 4 - col % 4,
            _ => break,
        }
        i += 1;
    }
    (col, &line[i..])
}

/// Strip up to `cols` columns of leading whitespace. A tab that straddles
/// the boundary is padded back out with spaces.
pub(crate) fn skip_columns(line: &str, cols: usize) -> Cow<'_, str> {
    let bytes = line.as_bytes();
    let mut col = 0;
    let mut i = 0;
    while i < bytes.len() && col < cols {
        match bytes[i] {
            b' ' => {
                col += 1;
                i += 1;
            }
            b'\t' => {
                col += 4 - col % 4;
                i += 1;
                if col > cols {
                    let mut s = " ".repeat(col - cols);
                    s.push_str(&line[i..]);
                    return Cow::Owned(s);
                }
            }
            _ => break,
        }
    }
    Cow::Borrowed(&line[i..])
}

/// Whether a line would open a non-paragraph block, ending paragraph
/// content and lazy continuations.
pub(crate) fn interrupts_paragraph(line: &str) -> bool {
    let (indent, rest) = split_indent(line);
    if indent >= 4 || rest.is_empty() {
        return false;
    }
    if rest.starts_with('>') {
        return true;
    }
    if leaf_blocks::is_thematic_break(rest) {
        return true;
    }
    if leaf_blocks::parse_atx_heading(rest).is_some() {
        return true;
    }
    if leaf_blocks::parse_fence_start(rest).is_some() {
        return true;
    }
    if html_block::block_start(rest, true).is_some() {
        return true;
    }
    if let Some(marker) = containers::scan_any_marker(rest) {
        return marker.can_interrupt();
    }
    false
}
