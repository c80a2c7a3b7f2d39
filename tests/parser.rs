use coppermark::{markdown, Options};
use pretty_assertions::assert_eq;

fn assert_html(md: &str, expected: &str) {
    assert_eq!(markdown(md, &Options::default()).unwrap(), expected);
}

#[test]
fn parses_empty_and_whitespace_input() {
    assert_html("", "");
    assert_html("   \n\n\t\n", "");
}

#[test]
fn parses_headings_h1_to_h6() {
    assert_html(
        "# h1\n## h2\n### h3\n#### h4\n##### h5\n###### h6",
        "<h1>h1</h1>\n<h2>h2</h2>\n<h3>h3</h3>\n<h4>h4</h4>\n<h5>h5</h5>\n<h6>h6</h6>\n",
    );
}

#[test]
fn parses_heading_example() {
    assert_html("# Hello", "<h1>Hello</h1>\n");
}

#[test]
fn parses_setext_headings() {
    assert_html(
        "Heading one\n===========\n\nHeading two\n-----------",
        "<h1>Heading one</h1>\n<h2>Heading two</h2>\n",
    );
}

#[test]
fn setext_heading_keeps_interior_lines() {
    assert_html("foo\nbar\n===", "<h1>foo\nbar</h1>\n");
}

#[test]
fn parses_indented_heading() {
    assert_html("   ## heading", "<h2>heading</h2>\n");
}

#[test]
fn non_heading_without_space_after_hash() {
    assert_html("##heading", "<p>##heading</p>\n");
}

#[test]
fn heading_strips_closing_hashes() {
    assert_html("## heading ##", "<h2>heading</h2>\n");
    assert_html("## heading#", "<h2>heading#</h2>\n");
}

#[test]
fn paragraph_collapses_lines_until_block_boundary() {
    assert_html(
        "line one\nline two\n\n# h\nline three",
        "<p>line one\nline two</p>\n<h1>h</h1>\n<p>line three</p>\n",
    );
}

#[test]
fn parses_thematic_breaks() {
    assert_html("---\n\n***\n\n___", "<hr />\n<hr />\n<hr />\n");
    assert_html("- - -", "<hr />\n");
}

#[test]
fn parses_inline_styles() {
    assert_html(
        "this is **strong** and *em* and `code`",
        "<p>this is <strong>strong</strong> and <em>em</em> and <code>code</code></p>\n",
    );
}

#[test]
fn parses_emphasis_example() {
    assert_html(
        "*em* and **strong**",
        "<p><em>em</em> and <strong>strong</strong></p>\n",
    );
}

#[test]
fn parses_underscore_variants() {
    assert_html(
        "__strong__ and _em_",
        "<p><strong>strong</strong> and <em>em</em></p>\n",
    );
}

#[test]
fn underscore_does_not_open_intraword() {
    assert_html("foo_bar_baz", "<p>foo_bar_baz</p>\n");
}

#[test]
fn parses_nested_inline_markup() {
    assert_html(
        "**outer *inner***",
        "<p><strong>outer <em>inner</em></strong></p>\n",
    );
}

#[test]
fn triple_markers_nest_strong_in_em() {
    assert_html("***both***", "<p><em><strong>both</strong></em></p>\n");
}

#[test]
fn unmatched_delimiters_stay_literal() {
    assert_html("a * b * c", "<p>a * b * c</p>\n");
    assert_html("*open", "<p>*open</p>\n");
}

#[test]
fn parses_strikethrough() {
    assert_html("~~gone~~", "<p><del>gone</del></p>\n");
    assert_html("a ~~b **c**~~ d", "<p>a <del>b <strong>c</strong></del> d</p>\n");
    assert_html("not ~~ open", "<p>not ~~ open</p>\n");
}

#[test]
fn parses_links_and_inline_label_markup() {
    assert_html(
        "visit [**site**](https://example.com)",
        "<p>visit <a href=\"https://example.com\"><strong>site</strong></a></p>\n",
    );
}

#[test]
fn parses_link_with_title() {
    assert_html(
        "[x](/url \"the title\")",
        "<p><a href=\"/url\" title=\"the title\">x</a></p>\n",
    );
}

#[test]
fn parses_angle_destinations() {
    assert_html(
        "[x](</url with space>)",
        "<p><a href=\"/url%20with%20space\">x</a></p>\n",
    );
}

#[test]
fn parses_reference_style_links_and_shortcuts() {
    assert_html(
        "[A ref][id]\n\n[Shortcut]\n\n[id]: https://example.com \"Ref\"\n[shortcut]: https://shortcut.test",
        "<p><a href=\"https://example.com\" title=\"Ref\">A ref</a></p>\n<p><a href=\"https://shortcut.test\">Shortcut</a></p>\n",
    );
}

#[test]
fn parses_collapsed_reference() {
    assert_html(
        "[hi]: /u \"t\"\n\n[hi][]",
        "<p><a href=\"/u\" title=\"t\">hi</a></p>\n",
    );
}

#[test]
fn parses_shortcut_reference_example() {
    assert_html(
        "[hi]: /u \"t\"\n\n[hi]",
        "<p><a href=\"/u\" title=\"t\">hi</a></p>\n",
    );
}

#[test]
fn reference_definition_renders_empty() {
    assert_html("[a]: /x", "");
}

#[test]
fn first_reference_definition_wins() {
    assert_html(
        "[a]: /first\n[a]: /second\n\n[a]",
        "<p><a href=\"/first\">a</a></p>\n",
    );
}

#[test]
fn dangling_reference_stays_literal() {
    assert_html("[nope]", "<p>[nope]</p>\n");
}

#[test]
fn parses_reference_style_images() {
    assert_html(
        "![Logo][brand]\n\n[brand]: https://img.test/logo.png \"Logo title\"",
        "<p><img src=\"https://img.test/logo.png\" alt=\"Logo\" title=\"Logo title\" /></p>\n",
    );
}

#[test]
fn image_alt_flattens_markup() {
    assert_html(
        "![a **b** c](/img.png)",
        "<p><img src=\"/img.png\" alt=\"a b c\" /></p>\n",
    );
}

#[test]
fn link_url_is_html_escaped() {
    assert_html(
        "[x](https://example.com?a=1&b=2)",
        "<p><a href=\"https://example.com?a=1&amp;b=2\">x</a></p>\n",
    );
}

#[test]
fn unparsable_link_is_left_as_text() {
    assert_html("look [here](missing", "<p>look [here](missing</p>\n");
}

#[test]
fn nested_links_are_disallowed() {
    assert_html(
        "[a [b](/inner) c](/outer)",
        "<p><a href=\"/outer\">a [b](/inner) c</a></p>\n",
    );
}

#[test]
fn parses_uri_autolink() {
    assert_html(
        "<https://example.com/a?b=c>",
        "<p><a href=\"https://example.com/a?b=c\">https://example.com/a?b=c</a></p>\n",
    );
}

#[test]
fn parses_email_autolink() {
    assert_html(
        "<foo@bar.example.com>",
        "<p><a href=\"mailto:foo@bar.example.com\">foo@bar.example.com</a></p>\n",
    );
}

#[test]
fn invalid_autolink_is_text() {
    assert_html("<33>", "<p>&lt;33&gt;</p>\n");
}

#[test]
fn parses_lists() {
    assert_html(
        "- one\n- two\n\n1. first\n2. second",
        "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n",
    );
}

#[test]
fn parses_nested_lists() {
    assert_html(
        "- one\n  - two\n    - three",
        "<ul>\n<li>one\n<ul>\n<li>two\n<ul>\n<li>three</li>\n</ul>\n</li>\n</ul>\n</li>\n</ul>\n",
    );
}

#[test]
fn parses_mixed_nested_lists() {
    assert_html(
        "1. one\n  - two\n    1. three",
        "<ol>\n<li>one</li>\n</ol>\n<ul>\n<li>two\n<ol>\n<li>three</li>\n</ol>\n</li>\n</ul>\n",
    );
}

#[test]
fn parses_all_unordered_markers() {
    assert_html(
        "- one\n* two\n+ three",
        "<ul>\n<li>one</li>\n</ul>\n<ul>\n<li>two</li>\n</ul>\n<ul>\n<li>three</li>\n</ul>\n",
    );
}

#[test]
fn ordered_list_requires_digit_dot_space() {
    assert_html("1.one\n1. two", "<p>1.one</p>\n<ol>\n<li>two</li>\n</ol>\n");
}

#[test]
fn ordered_list_keeps_start_number() {
    assert_html(
        "3. a\n4. b",
        "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n",
    );
}

#[test]
fn blank_between_items_makes_list_loose() {
    assert_html(
        "- a\n\n- b",
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn blank_inside_item_makes_list_loose() {
    assert_html(
        "- a\n\n  b",
        "<ul>\n<li>\n<p>a</p>\n<p>b</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn trailing_blank_keeps_single_item_tight() {
    assert_html("- a\n\nafter", "<ul>\n<li>a</li>\n</ul>\n<p>after</p>\n");
}

#[test]
fn parses_blockquote_example() {
    assert_html("> a\n> b", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
}

#[test]
fn blockquote_lazy_continuation() {
    assert_html("> a\nb", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
}

#[test]
fn blockquote_ends_at_blank_line() {
    assert_html(
        "> a\n\n> b",
        "<blockquote>\n<p>a</p>\n</blockquote>\n<blockquote>\n<p>b</p>\n</blockquote>\n",
    );
}

#[test]
fn parses_nested_blockquotes() {
    assert_html(
        "> > a",
        "<blockquote>\n<blockquote>\n<p>a</p>\n</blockquote>\n</blockquote>\n",
    );
}

#[test]
fn parses_fenced_code_with_info() {
    assert_html(
        "```js\nlet x=1;\n```",
        "<pre><code class=\"language-js\">let x=1;\n</code></pre>\n",
    );
}

#[test]
fn fenced_code_without_info_has_no_class() {
    assert_html("```\nplain\n```", "<pre><code>plain\n</code></pre>\n");
}

#[test]
fn fenced_code_escapes_content() {
    assert_html(
        "```\n<b> & \"q\"\n```",
        "<pre><code>&lt;b&gt; &amp; &quot;q&quot;\n</code></pre>\n",
    );
}

#[test]
fn unclosed_fence_runs_to_end() {
    assert_html("```\nabc", "<pre><code>abc\n</code></pre>\n");
}

#[test]
fn fence_strips_opening_indent_from_content() {
    assert_html("  ```\n  a\n b\n  ```", "<pre><code>a\nb\n</code></pre>\n");
}

#[test]
fn parses_indented_code() {
    assert_html(
        "    let x = 1;\n    let y = 2;",
        "<pre><code>let x = 1;\nlet y = 2;\n</code></pre>\n",
    );
}

#[test]
fn indented_code_keeps_internal_blank_lines() {
    assert_html(
        "    a\n\n    b",
        "<pre><code>a\n\nb\n</code></pre>\n",
    );
}

#[test]
fn code_span_strips_and_collapses_whitespace() {
    assert_html("`` ` ``", "<p><code>`</code></p>\n");
    assert_html("`a  b`", "<p><code>a b</code></p>\n");
}

#[test]
fn unclosed_code_span_is_literal() {
    assert_html("`open", "<p>`open</p>\n");
}

#[test]
fn parses_hard_and_soft_breaks() {
    assert_html("a  \nb", "<p>a<br />\nb</p>\n");
    assert_html("a\\\nb", "<p>a<br />\nb</p>\n");
    assert_html("a\nb", "<p>a\nb</p>\n");
}

#[test]
fn parses_backslash_escapes() {
    assert_html("\\*literal\\*", "<p>*literal*</p>\n");
    assert_html("\\[not a link\\]", "<p>[not a link]</p>\n");
}

#[test]
fn parses_entities() {
    assert_html("&copy; &#169; &#xA9;", "<p>\u{A9} \u{A9} \u{A9}</p>\n");
}

#[test]
fn unknown_entity_keeps_literal_with_escaped_amp() {
    assert_html("&nosuch;", "<p>&amp;nosuch;</p>\n");
}

#[test]
fn nul_entity_becomes_replacement_char() {
    assert_html("&#0;", "<p>\u{FFFD}</p>\n");
}

#[test]
fn parses_inline_html() {
    assert_html("a <b>bold</b>", "<p>a <b>bold</b></p>\n");
    assert_html("a <!-- note --> b", "<p>a <!-- note --> b</p>\n");
}

#[test]
fn embedded_tag_gets_lt_escaped() {
    assert_html(
        "x <script>alert(1)</script>",
        "<p>x &lt;script>alert(1)</script></p>\n",
    );
}

#[test]
fn parses_html_blocks() {
    assert_html(
        "<div>\n<span>x</span>\n</div>",
        "<div>\n<span>x</span>\n</div>\n",
    );
}

#[test]
fn html_block_ends_at_blank_line() {
    assert_html(
        "<div>\na\n\ntext",
        "<div>\na\n<p>text</p>\n",
    );
}

#[test]
fn parses_table_example() {
    assert_html(
        "|a|b|\n|-|:-:|\n|1|2|",
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th align=\"center\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td align=\"center\">2</td>\n</tr></tbody></table>\n",
    );
}

#[test]
fn table_without_body_drops_tbody() {
    assert_html(
        "|a|b|\n|-|-|",
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead></table>\n",
    );
}

#[test]
fn table_pads_and_truncates_rows() {
    assert_html(
        "|a|b|\n|-|-|\n|1|\n|1|2|3|",
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td></td>\n</tr>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr></tbody></table>\n",
    );
}

#[test]
fn table_alignments_render_as_attributes() {
    assert_html(
        "|a|b|c|d|\n|:-|-:|:-:|-|\n|1|2|3|4|",
        "<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>\n<th align=\"right\">b</th>\n<th align=\"center\">c</th>\n<th>d</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td align=\"left\">1</td>\n<td align=\"right\">2</td>\n<td align=\"center\">3</td>\n<td>4</td>\n</tr></tbody></table>\n",
    );
}

#[test]
fn table_interrupts_paragraph_before_header() {
    assert_html(
        "para\n|a|b|\n|-|-|\n|1|2|",
        "<p>para</p>\n<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr></tbody></table>\n",
    );
}

#[test]
fn table_interrupts_blockquote_lazy_continuation() {
    assert_html(
        "> foo\na|b\n-|-\n",
        "<blockquote>\n<p>foo</p>\n</blockquote>\n<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead></table>\n",
    );
}

#[test]
fn table_interrupts_list_item_lazy_continuation() {
    assert_html(
        "- foo\na|b\n-|-\n",
        "<ul>\n<li>foo</li>\n</ul>\n<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead></table>\n",
    );
}

#[test]
fn table_opener_stops_setext_lookahead() {
    // The header/delimiter pair ends the paragraph candidate at "foo";
    // the `===` line then falls to the table as a short body row.
    assert_html(
        "foo\na|b\n-|-\n===\n",
        "<p>foo</p>\n<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>===</td>\n<td></td>\n</tr></tbody></table>\n",
    );
}

#[test]
fn table_cells_honor_escaped_pipes() {
    assert_html(
        "|a\\|b|c|\n|-|-|",
        "<table>\n<thead>\n<tr>\n<th>a|b</th>\n<th>c</th>\n</tr>\n</thead></table>\n",
    );
}

#[test]
fn escape_option_disables_text_escaping() {
    let opts = Options {
        escape: false,
        ..Default::default()
    };
    assert_eq!(
        markdown("a < b & c", &opts).unwrap(),
        "<p>a < b & c</p>\n"
    );
}

#[test]
fn keep_html_option_escapes_raw_html_when_off() {
    let opts = Options {
        keep_html: false,
        ..Default::default()
    };
    assert_eq!(
        markdown("a <b>x</b>", &opts).unwrap(),
        "<p>a &lt;b&gt;x&lt;/b&gt;</p>\n"
    );
    assert_eq!(
        markdown("<div>x</div>", &opts).unwrap(),
        "&lt;div&gt;x&lt;/div&gt;\n"
    );
}

#[test]
fn preprocesses_crlf_and_nul() {
    assert_html("a\r\nb", "<p>a\nb</p>\n");
    assert_html("a\0b", "<p>a\u{FFFD}b</p>\n");
}
