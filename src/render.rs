//! The renderer: a recursive walk over the finished token tree. The only
//! state it carries besides the output buffer is whether the current list
//! context is loose, which decides `<p>` wrapping inside list items.

use crate::text::{encode_url_into, escape_html_into, resolve_escapes_and_entities};
use crate::token::{Alignment, Token, TokenKind};
use crate::Options;

pub(crate) fn render_document(doc: &Token, options: &Options) -> String {
    let mut renderer = Renderer {
        options,
        out: String::with_capacity(doc.span.end + doc.span.end / 2 + 16),
        loose: true,
    };
    for child in &doc.children {
        renderer.block(child);
    }
    renderer.out
}

struct Renderer<'a> {
    options: &'a Options,
    out: String,
    loose: bool,
}

impl Renderer<'_> {
    fn block(&mut self, token: &Token) {
        match &token.kind {
            TokenKind::Document => {
                for child in &token.children {
                    self.block(child);
                }
            }
            TokenKind::BlankLine | TokenKind::Reference { .. } => {}
            TokenKind::Paragraph => {
                self.out.push_str("<p>");
                self.inlines(token);
                self.out.push_str("</p>\n");
            }
            TokenKind::AtxHeading { level } | TokenKind::SetextHeading { level } => {
                self.out.push_str("<h");
                self.out.push((b'0' + *level) as char);
                self.out.push('>');
                self.inlines(token);
                self.out.push_str("</h");
                self.out.push((b'0' + *level) as char);
                self.out.push_str(">\n");
            }
            TokenKind::ThematicBreak => self.out.push_str("<hr />\n"),
            TokenKind::IndentedCode => {
                self.out.push_str("<pre><code>");
                escape_html_into(&mut self.out, &token.text);
                self.out.push_str("</code></pre>\n");
            }
            TokenKind::FenceCode { info } => {
                self.out.push_str("<pre><code");
                let resolved = resolve_escapes_and_entities(info);
                if let Some(lang) = resolved.split_whitespace().next() {
                    self.out.push_str(" class=\"language-");
                    escape_html_into(&mut self.out, lang);
                    self.out.push('"');
                }
                self.out.push('>');
                escape_html_into(&mut self.out, &token.text);
                self.out.push_str("</code></pre>\n");
            }
            TokenKind::Blockquote => {
                self.out.push_str("<blockquote>\n");
                for child in &token.children {
                    self.block(child);
                }
                self.out.push_str("</blockquote>\n");
            }
            TokenKind::HtmlBlock => {
                let literal = token.text.trim_matches('\n');
                if self.options.keep_html {
                    self.out.push_str(literal);
                } else {
                    escape_html_into(&mut self.out, literal);
                }
                self.out.push('\n');
            }
            TokenKind::UnorderedList { loose } => {
                self.out.push_str("<ul>\n");
                self.items(token, *loose);
                self.out.push_str("</ul>\n");
            }
            TokenKind::OrderedList { start, loose } => {
                if *start == 1 {
                    self.out.push_str("<ol>\n");
                } else {
                    self.out.push_str("<ol start=\"");
                    self.out.push_str(&start.to_string());
                    self.out.push_str("\">\n");
                }
                self.items(token, *loose);
                self.out.push_str("</ol>\n");
            }
            TokenKind::ListItem { .. } => self.list_item(token),
            TokenKind::Table { .. } => self.table(token),
            _ => self.inline(token),
        }
    }

    fn items(&mut self, list: &Token, loose: bool) {
        let saved = self.loose;
        self.loose = loose;
        for item in &list.children {
            self.list_item(item);
        }
        self.loose = saved;
    }

    fn list_item(&mut self, item: &Token) {
        self.out.push_str("<li>");
        if self.loose {
            self.out.push('\n');
            for child in &item.children {
                self.block(child);
            }
        } else {
            let mut first = true;
            let mut prev_inline = false;
            for child in &item.children {
                match child.kind {
                    TokenKind::Paragraph => {
                        self.inlines(child);
                        prev_inline = true;
                        first = false;
                    }
                    TokenKind::BlankLine | TokenKind::Reference { .. } => {}
                    _ => {
                        if prev_inline || first {
                            self.out.push('\n');
                        }
                        self.block(child);
                        prev_inline = false;
                        first = false;
                    }
                }
            }
        }
        self.out.push_str("</li>\n");
    }

    fn table(&mut self, token: &Token) {
        self.out.push_str("<table>\n<thead>\n");
        for part in &token.children {
            if part.kind == TokenKind::TableHead {
                for row in &part.children {
                    self.out.push_str("<tr>\n");
                    for cell in &row.children {
                        if let TokenKind::TableHeadCell { align, .. } = &cell.kind {
                            self.table_cell("th", *align, cell);
                        }
                    }
                    self.out.push_str("</tr>\n");
                }
            }
        }
        self.out.push_str("</thead>");
        let body = token
            .children
            .iter()
            .find(|c| c.kind == TokenKind::TableBody);
        match body {
            Some(body) if !body.children.is_empty() => {
                self.out.push_str("\n<tbody>\n");
                for (i, row) in body.children.iter().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.out.push_str("<tr>\n");
                    for cell in &row.children {
                        if let TokenKind::TableBodyCell { align, .. } = &cell.kind {
                            self.table_cell("td", *align, cell);
                        }
                    }
                    self.out.push_str("</tr>");
                }
                self.out.push_str("</tbody></table>\n");
            }
            _ => self.out.push_str("</table>\n"),
        }
    }

    fn table_cell(&mut self, tag: &str, align: Alignment, cell: &Token) {
        self.out.push('<');
        self.out.push_str(tag);
        match align {
            Alignment::None => {}
            Alignment::Left => self.out.push_str(" align=\"left\""),
            Alignment::Right => self.out.push_str(" align=\"right\""),
            Alignment::Center => self.out.push_str(" align=\"center\""),
        }
        self.out.push('>');
        self.inlines(cell);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    fn inlines(&mut self, leaf: &Token) {
        for child in &leaf.children {
            self.inline(child);
        }
    }

    fn inline(&mut self, token: &Token) {
        match &token.kind {
            TokenKind::Text | TokenKind::HtmlEntity | TokenKind::Escape { .. } => {
                self.text(&token.text);
            }
            TokenKind::SoftBreak => self.out.push('\n'),
            TokenKind::HardBreak => self.out.push_str("<br />\n"),
            TokenKind::CodeSpan => {
                self.out.push_str("<code>");
                escape_html_into(&mut self.out, &token.text);
                self.out.push_str("</code>");
            }
            TokenKind::InlineHtml => {
                if !self.options.keep_html {
                    escape_html_into(&mut self.out, &token.text);
                } else if opens_embedded_tag(&token.text) {
                    self.out.push_str("&lt;");
                    self.out.push_str(&token.text[1..]);
                } else {
                    self.out.push_str(&token.text);
                }
            }
            TokenKind::Link { url, title } => {
                self.out.push_str("<a href=\"");
                encode_url_into(&mut self.out, url);
                self.out.push('"');
                if let Some(title) = title {
                    self.out.push_str(" title=\"");
                    escape_html_into(&mut self.out, title);
                    self.out.push('"');
                }
                self.out.push('>');
                self.inlines(token);
                self.out.push_str("</a>");
            }
            TokenKind::Image { url, title } => {
                self.out.push_str("<img src=\"");
                encode_url_into(&mut self.out, url);
                self.out.push_str("\" alt=\"");
                let mut alt = String::new();
                for child in &token.children {
                    flatten_alt(child, &mut alt);
                }
                escape_html_into(&mut self.out, &alt);
                self.out.push('"');
                if let Some(title) = title {
                    self.out.push_str(" title=\"");
                    escape_html_into(&mut self.out, title);
                    self.out.push('"');
                }
                self.out.push_str(" />");
            }
            TokenKind::Autolink { email } => {
                self.out.push_str("<a href=\"");
                if *email {
                    self.out.push_str("mailto:");
                }
                encode_url_into(&mut self.out, &token.text);
                self.out.push_str("\">");
                escape_html_into(&mut self.out, &token.text);
                self.out.push_str("</a>");
            }
            TokenKind::Emphasis => self.wrap("<em>", token, "</em>"),
            TokenKind::Strong => self.wrap("<strong>", token, "</strong>"),
            TokenKind::Strikethrough => self.wrap("<del>", token, "</del>"),
            _ => {}
        }
    }

    fn wrap(&mut self, open: &str, token: &Token, close: &str) {
        self.out.push_str(open);
        self.inlines(token);
        self.out.push_str(close);
    }

    fn text(&mut self, text: &str) {
        if self.options.escape {
            escape_html_into(&mut self.out, text);
        } else {
            self.out.push_str(text);
        }
    }
}

/// Plain-text flattening for image alt attributes: nested links keep their
/// text, nested images their alt, emphasis renders its content in place;
/// raw HTML and line breaks drop out.
fn flatten_alt(token: &Token, out: &mut String) {
    match &token.kind {
        TokenKind::Text
        | TokenKind::HtmlEntity
        | TokenKind::Escape { .. }
        | TokenKind::CodeSpan
        | TokenKind::Autolink { .. } => out.push_str(&token.text),
        TokenKind::Link { .. }
        | TokenKind::Image { .. }
        | TokenKind::Emphasis
        | TokenKind::Strong
        | TokenKind::Strikethrough => {
            for child in &token.children {
                flatten_alt(child, out);
            }
        }
        _ => {}
    }
}

static EMBEDDED_TAGS: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "script",
    "style",
    "textarea",
    "title",
    "xmp",
];

/// Whether raw inline HTML is an opening tag for one of the embedded-text
/// elements whose `<` gets escaped on output.
fn opens_embedded_tag(raw: &str) -> bool {
    let Some(rest) = raw.strip_prefix('<') else {
        return false;
    };
    let bytes = rest.as_bytes();
    let mut end = 0;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }
    if end == 0 {
        return false;
    }
    let mut buf = [0u8; 9];
    if end > buf.len() {
        return false;
    }
    for i in 0..end {
        buf[i] = bytes[i].to_ascii_lowercase();
    }
    EMBEDDED_TAGS
        .binary_search_by(|t| t.as_bytes().cmp(&buf[..end]))
        .is_ok()
}
