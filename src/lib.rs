//! # coppermark
//!
//! A CommonMark Markdown-to-HTML engine with the two GFM extensions that
//! matter most in the wild: pipe tables and `~~strikethrough~~`.
//!
//! Parsing runs in two phases over a shared token tree: a block pass that
//! partitions the document into headings, paragraphs, lists, quotes, code
//! and tables while collecting link reference definitions, and an inline
//! pass that fills every leaf block with emphasis, links, images, code
//! spans and the rest. A final tree walk serialises to HTML.
//!
//! ## Usage
//!
//! ```
//! use coppermark::{markdown, Options};
//!
//! let html = markdown("# Hello, **world**!", &Options::default()).unwrap();
//! assert!(html.contains("<strong>world</strong>"));
//! ```
//!
//! The token tree itself is available through [`parse_tree`] when the HTML
//! output is not the goal:
//!
//! ```
//! use coppermark::{parse_tree, TokenKind};
//!
//! let doc = parse_tree("# Hello").unwrap();
//! assert_eq!(doc.kind, TokenKind::Document);
//! assert_eq!(doc.children.len(), 1);
//! ```

use thiserror::Error;

mod block;
mod entities;
mod inline;
mod render;
mod text;
pub mod token;

pub use token::{Alignment, Token, TokenKind};

/// Options for customizing HTML output.
pub struct Options {
    /// HTML-escape `<`, `>`, and `&` in plain text output. Default: `true`.
    pub escape: bool,
    /// Preserve raw HTML (inline tags and HTML blocks) instead of escaping
    /// it. Default: `true`.
    ///
    /// Deprecated: kept for compatibility with older callers; new code
    /// should leave it at the default.
    pub keep_html: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            escape: true,
            keep_html: true,
        }
    }
}

/// The single way a parse can fail.
///
/// Every valid UTF-8 input parses: the blank-line and paragraph rules are
/// total, so an exhausted rule table indicates a bug in the parser rather
/// than bad input. Malformed constructs (unclosed fences, unmatched
/// brackets, unknown entities) recover locally as literal text instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MarkdownError {
    /// The block dispatcher found no rule that matched at `offset`.
    #[error("no block rule matched at byte offset {offset}")]
    MalformedBlock { offset: usize },
}

/// Convert a Markdown string to an HTML fragment.
///
/// # Examples
///
/// ```
/// use coppermark::{markdown, Options};
///
/// let html = markdown("*em* and **strong**", &Options::default()).unwrap();
/// assert_eq!(html, "<p><em>em</em> and <strong>strong</strong></p>\n");
/// ```
pub fn markdown(source: &str, options: &Options) -> Result<String, MarkdownError> {
    let doc = parse_tree(source)?;
    Ok(render::render_document(&doc, options))
}

/// Parse a Markdown string into its block+inline token tree without
/// rendering, for programmatic inspection or transformation.
pub fn parse_tree(source: &str) -> Result<Token, MarkdownError> {
    let input = text::preprocess(source);
    let mut refs = inline::RefMap::default();
    let mut doc = block::parse_document(&input, &mut refs)?;
    inline::populate(&mut doc, &refs);
    Ok(doc)
}

#[inline(always)]
pub(crate) fn is_ascii_punctuation(b: u8) -> bool {
    matches!(b, b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~')
}

#[inline(always)]
pub(crate) fn utf8_char_len(first: u8) -> usize {
    if first < 0x80 {
        1
    } else if first < 0xE0 {
        2
    } else if first < 0xF0 {
        3
    } else {
        4
    }
}
