//! The inline parser: a cursor over a leaf block's text and an ordered
//! rule table. Emphasis is resolved in a second pass over the delimiter
//! records collected by the first (`process_emphasis`).

mod links;
mod scanner;

use crate::is_ascii_punctuation;
use crate::token::{Token, TokenKind};
use crate::utf8_char_len;
use rustc_hash::FxHashMap;

/// A successfully parsed link reference definition, keyed by normalised
/// label. The first definition of a label wins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RefDef {
    pub(crate) url: String,
    pub(crate) title: Option<String>,
}

pub(crate) type RefMap = FxHashMap<String, RefDef>;

/// Fill every inline leaf in the tree with parsed inline children.
pub(crate) fn populate(token: &mut Token, refs: &RefMap) {
    if token.kind.is_inline_leaf() {
        token.children = parse_inlines(&token.text, refs, true);
    } else {
        for child in &mut token.children {
            populate(child, refs);
        }
    }
}

pub(crate) fn parse_inlines(text: &str, refs: &RefMap, links_allowed: bool) -> Vec<Token> {
    let mut parser = InlineParser::new(text, refs, links_allowed);
    parser.run();
    parser.tokens
}

/// One maximal run of `*` or `_`, recorded alongside its placeholder text
/// token during the first pass.
struct Delimiter {
    token: usize,
    marker: u8,
    count: usize,
    orig: usize,
    active: bool,
    can_open: bool,
    can_close: bool,
}

type InlineRule = fn(&mut InlineParser<'_>) -> bool;

static INLINE_RULES: &[InlineRule] = &[
    |p: &mut InlineParser<'_>| p.emphasis_delimiter(),
    |p: &mut InlineParser<'_>| p.image(),
    |p: &mut InlineParser<'_>| p.autolink(),
    |p: &mut InlineParser<'_>| p.link(),
    |p: &mut InlineParser<'_>| p.html_entity(),
    |p: &mut InlineParser<'_>| p.inline_html(),
    |p: &mut InlineParser<'_>| p.backslash_escape(),
    |p: &mut InlineParser<'_>| p.code_span(),
    |p: &mut InlineParser<'_>| p.strikethrough(),
    |p: &mut InlineParser<'_>| p.hard_break(),
    |p: &mut InlineParser<'_>| p.soft_break(),
    |p: &mut InlineParser<'_>| p.text(),
];

pub(crate) struct InlineParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    refs: &'a RefMap,
    links_allowed: bool,
    tokens: Vec<Token>,
    delims: Vec<Delimiter>,
}

impl<'a> InlineParser<'a> {
    fn new(input: &'a str, refs: &'a RefMap, links_allowed: bool) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            refs,
            links_allowed,
            tokens: Vec::new(),
            delims: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            for rule in INLINE_RULES {
                if rule(self) {
                    break;
                }
            }
        }
        self.process_emphasis();
    }

    // ── Emphasis ────────────────────────────────────────────────────

    pub(super) fn emphasis_delimiter(&mut self) -> bool {
        let marker = self.bytes[self.pos];
        if marker != b'*' && marker != b'_' {
            return false;
        }
        let run_start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] == marker {
            self.pos += 1;
        }
        let count = self.pos - run_start;
        let before = char_before(self.input, run_start);
        let after = char_at(self.input, self.pos);
        let (can_open, can_close) = flanking(marker, before, after);
        let token = self.tokens.len();
        self.tokens.push(Token::inline(
            TokenKind::Text,
            run_start..self.pos,
            self.input[run_start..self.pos].to_string(),
        ));
        self.delims.push(Delimiter {
            token,
            marker,
            count,
            orig: count,
            active: true,
            can_open,
            can_close,
        });
        true
    }

    /// Second pass: walk the delimiter list left to right looking for
    /// closers, pairing each with the nearest eligible opener above the
    /// per-kind bottom marker.
    fn process_emphasis(&mut self) {
        let mut star_bottom = 0usize;
        let mut underscore_bottom = 0usize;
        let mut closer = 0usize;
        while closer < self.delims.len() {
            let marker = self.delims[closer].marker;
            let closes = {
                let d = &self.delims[closer];
                d.active && d.can_close && d.count > 0
            };
            if !closes {
                closer += 1;
                continue;
            }
            let bottom = if marker == b'*' {
                star_bottom
            } else {
                underscore_bottom
            };
            let mut opener = None;
            let mut oi = closer;
            while oi > bottom {
                oi -= 1;
                let o = &self.delims[oi];
                if !o.active || o.marker != marker || !o.can_open || o.count == 0 {
                    continue;
                }
                // The odd-match rule: when either end could also play the
                // other role, runs whose original lengths sum to a
                // multiple of three do not pair.
                let c = &self.delims[closer];
                if (o.can_close || c.can_open) && (o.orig + c.orig) % 3 == 0 {
                    continue;
                }
                opener = Some(oi);
                break;
            }
            match opener {
                Some(oi) => self.pair_delimiters(oi, closer),
                None => {
                    if marker == b'*' {
                        star_bottom = closer;
                    } else {
                        underscore_bottom = closer;
                    }
                    if !self.delims[closer].can_open {
                        self.delims[closer].active = false;
                    }
                    closer += 1;
                }
            }
        }
        self.delims.clear();
    }

    /// Consume one or two delimiter characters from each end, splice the
    /// tokens between them into a new `Emphasis`/`Strong` node, and
    /// deactivate everything in between.
    fn pair_delimiters(&mut self, oi: usize, ci: usize) {
        let use_count = if self.delims[oi].count >= 2 && self.delims[ci].count >= 2 {
            2
        } else {
            1
        };
        let opener_token = self.delims[oi].token;
        let closer_token = self.delims[ci].token;

        {
            let t = &mut self.tokens[opener_token];
            let keep = t.text.len() - use_count;
            t.text.truncate(keep);
            t.span.end -= use_count;
        }
        {
            let t = &mut self.tokens[closer_token];
            t.text.drain(..use_count);
            t.span.start += use_count;
        }
        self.delims[oi].count -= use_count;
        self.delims[ci].count -= use_count;

        let kind = if use_count == 2 {
            TokenKind::Strong
        } else {
            TokenKind::Emphasis
        };
        let span = self.tokens[opener_token].span.end..self.tokens[closer_token].span.start;
        let inner: Vec<Token> = self.tokens.drain(opener_token + 1..closer_token).collect();
        let mut node = Token::new(kind, span);
        node.children = inner;
        self.tokens.insert(opener_token + 1, node);

        let removed = closer_token - opener_token - 2;
        for d in &mut self.delims[oi + 1..ci] {
            d.active = false;
        }
        for d in &mut self.delims[ci..] {
            d.token -= removed;
        }
        if self.delims[oi].count == 0 {
            self.delims[oi].active = false;
        }
        if self.delims[ci].count == 0 {
            self.delims[ci].active = false;
        }
    }

    // ── Shared plumbing ─────────────────────────────────────────────

    /// Append raw input text, coalescing with a trailing text token when
    /// that token is not a delimiter-run placeholder.
    pub(super) fn push_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        if !self.last_is_delim() {
            if let Some(last) = self.tokens.last_mut() {
                if last.kind == TokenKind::Text && last.span.end == start {
                    last.text.push_str(&self.input[start..end]);
                    last.span.end = end;
                    return;
                }
            }
        }
        self.tokens.push(Token::inline(
            TokenKind::Text,
            start..end,
            self.input[start..end].to_string(),
        ));
    }

    fn last_is_delim(&self) -> bool {
        match (self.delims.last(), self.tokens.len()) {
            (Some(d), n) if n > 0 => d.token == n - 1,
            _ => false,
        }
    }

    /// Drop trailing spaces from a pending text token, for line breaks.
    pub(super) fn trim_trailing_spaces(&mut self) {
        if self.last_is_delim() {
            return;
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.kind == TokenKind::Text {
                while last.text.ends_with(' ') {
                    last.text.pop();
                    last.span.end -= 1;
                }
            }
        }
    }
}

// ── Flanking ────────────────────────────────────────────────────────

/// Left/right-flanking per CommonMark §6.2, with the stricter underscore
/// refinement.
fn flanking(marker: u8, before: char, after: char) -> (bool, bool) {
    let left = !after.is_whitespace()
        && (!is_punctuation_char(after) || before.is_whitespace() || is_punctuation_char(before));
    let right = !before.is_whitespace()
        && (!is_punctuation_char(before) || after.is_whitespace() || is_punctuation_char(after));
    if marker == b'_' {
        (
            left && (!right || is_punctuation_char(before)),
            right && (!left || is_punctuation_char(after)),
        )
    } else {
        (left, right)
    }
}

#[inline(always)]
fn is_punctuation_char(c: char) -> bool {
    if c.is_ascii() {
        return is_ascii_punctuation(c as u8);
    }
    matches!(c as u32,
        0x00A0..=0x00BF | 0x2000..=0x206F | 0x2E00..=0x2E7F |
        0x3000..=0x303F | 0xFE30..=0xFE6F | 0xFF01..=0xFF0F |
        0xFF1A..=0xFF20 | 0xFF3B..=0xFF40 | 0xFF5B..=0xFF65 |
        0x2100..=0x214F | 0x2190..=0x21FF | 0x2200..=0x22FF |
        0x2300..=0x23FF | 0x2500..=0x257F | 0x25A0..=0x25FF |
        0x2600..=0x26FF | 0x2700..=0x27BF | 0x20A0..=0x20CF
    )
}

#[inline(always)]
fn char_before(s: &str, byte_pos: usize) -> char {
    if byte_pos == 0 {
        return ' ';
    }
    let bytes = s.as_bytes();
    if bytes[byte_pos - 1] < 0x80 {
        return bytes[byte_pos - 1] as char;
    }
    let mut i = byte_pos - 1;
    while i > 0 && (bytes[i] & 0xC0) == 0x80 {
        i -= 1;
    }
    s[i..byte_pos].chars().next().unwrap_or(' ')
}

#[inline(always)]
fn char_at(s: &str, byte_pos: usize) -> char {
    if byte_pos >= s.len() {
        return ' ';
    }
    let b = s.as_bytes()[byte_pos];
    if b < 0x80 {
        return b as char;
    }
    let end = (byte_pos + utf8_char_len(b)).min(s.len());
    s[byte_pos..end].chars().next().unwrap_or(' ')
}
