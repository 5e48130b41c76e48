use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use uuid::Uuid;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';
const FENCE: &str = "```";

static CODE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*)\]\(((?:https?://|file:///?)[^\s\x{E000}\x{E001}]+?)\)")
        .expect("valid regex")
});
static AUTOLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)((?:https?://|file:///?)[^\s\x{E000}\x{E001}]+)").expect("valid regex")
});
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static STRIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+)~~").expect("valid regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\W)_([^_]+)_").expect("valid regex"));
static WORD_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w").expect("valid regex"));
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E000}([0-9a-f]{32})(\d+)\x{E001}").expect("valid regex")
});

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s+(.+)$").expect("valid regex"));
static ORDERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.+)$").expect("valid regex"));

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape_html(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// Fresh nonce per render call; literal transcript text never parses as a placeholder.
struct Placeholders {
    nonce: String,
    fragments: Vec<String>,
}

impl Placeholders {
    fn new() -> Self {
        Self {
            nonce: Uuid::new_v4().simple().to_string(),
            fragments: Vec::new(),
        }
    }

    fn hold(&mut self, fragment: String) -> String {
        let id = self.fragments.len();
        self.fragments.push(fragment);
        format!("{PLACEHOLDER_OPEN}{}{id}{PLACEHOLDER_CLOSE}", self.nonce)
    }

    fn restore(&self, text: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let fragment = if caps[1] == self.nonce {
                    caps[2]
                        .parse::<usize>()
                        .ok()
                        .and_then(|id| self.fragments.get(id))
                } else {
                    None
                };
                fragment.map_or_else(|| caps[0].to_string(), Clone::clone)
            })
            .into_owned()
    }
}

fn anchor(href: &str, text: &str) -> String {
    format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{text}</a>"#)
}

// Both arguments are already escaped.
fn link_display_text(text: &str, href: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    let raw_href = unescape_html(href);
    match urlencoding::decode(&raw_href) {
        Ok(decoded) => escape_html(&decoded),
        Err(_) => href.to_string(),
    }
}

fn emphasize(html: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(caps) = ITALIC_RE.captures_at(html, search) {
        let (Some(span), Some(inner)) = (caps.get(0), caps.get(2)) else {
            break;
        };

        // The closing underscore must sit before a non-word character or the end.
        // That character is left unconsumed so it can open the next span.
        if WORD_START_RE.is_match(&html[span.end()..]) {
            search = span.start()
                + html[span.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
            continue;
        }

        output.push_str(&html[copied..inner.start() - 1]);
        output.push_str("<em>");
        output.push_str(inner.as_str());
        output.push_str("</em>");
        copied = span.end();
        search = span.end();
    }

    output.push_str(&html[copied..]);
    output
}

pub fn render_inline(input: &str) -> String {
    let mut code = Placeholders::new();
    let mut links = Placeholders::new();

    let html = escape_html(input);

    let html = CODE_SPAN_RE.replace_all(&html, |caps: &Captures<'_>| {
        code.hold(format!("<code>{}</code>", &caps[1]))
    });

    let html = LINK_RE.replace_all(&html, |caps: &Captures<'_>| {
        let href = &caps[2];
        links.hold(anchor(href, &link_display_text(&caps[1], href)))
    });

    let html = AUTOLINK_RE.replace_all(&html, |caps: &Captures<'_>| {
        let href = &caps[2];
        format!("{}{}", &caps[1], links.hold(anchor(href, href)))
    });

    let html = BOLD_RE.replace_all(&html, "<strong>${1}</strong>");
    let html = STRIKE_RE.replace_all(&html, "<del>${1}</del>");
    let html = emphasize(&html);

    // Links may wrap code spans, so they come back first.
    let html = links.restore(&html);
    code.restore(&html)
}

fn is_block_start(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.starts_with(FENCE)
        || trimmed.starts_with('>')
        || HEADING_RE.is_match(trimmed)
        || BULLET_RE.is_match(trimmed)
        || ORDERED_RE.is_match(trimmed)
}

fn collect_list_items(lines: &[&str], index: &mut usize, item_re: &Regex) -> String {
    let mut items = String::new();
    while let Some(line) = lines.get(*index) {
        let Some(caps) = item_re.captures(line.trim()) else {
            break;
        };
        items.push_str(&format!("<li>{}</li>", render_inline(&caps[1])));
        *index += 1;
    }
    items
}

pub fn render_markdown(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let trimmed = lines[index].trim();

        if trimmed.is_empty() {
            index += 1;
            continue;
        }

        if trimmed.starts_with(FENCE) {
            index += 1;
            let start = index;
            while index < lines.len() && !lines[index].trim().starts_with(FENCE) {
                index += 1;
            }
            let code = lines[start..index].join("\n");
            if index < lines.len() {
                index += 1;
            }
            if !code.trim().is_empty() {
                blocks.push(format!("<pre><code>{}</code></pre>", escape_html(&code)));
            }
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(trimmed) {
            let level = caps[1].len();
            blocks.push(format!(
                "<h{level}>{}</h{level}>",
                render_inline(caps[2].trim())
            ));
            index += 1;
            continue;
        }

        if BULLET_RE.is_match(trimmed) {
            let items = collect_list_items(&lines, &mut index, &BULLET_RE);
            blocks.push(format!("<ul>{items}</ul>"));
            continue;
        }

        if ORDERED_RE.is_match(trimmed) {
            let items = collect_list_items(&lines, &mut index, &ORDERED_RE);
            blocks.push(format!("<ol>{items}</ol>"));
            continue;
        }

        if trimmed.starts_with('>') {
            let mut quoted = Vec::new();
            while let Some(rest) = lines.get(index).and_then(|line| line.trim().strip_prefix('>')) {
                quoted.push(rest.strip_prefix(char::is_whitespace).unwrap_or(rest));
                index += 1;
            }
            blocks.push(format!(
                "<blockquote><p>{}</p></blockquote>",
                render_inline(&quoted.join(" "))
            ));
            continue;
        }

        let mut paragraph = vec![trimmed];
        index += 1;
        while let Some(line) = lines.get(index) {
            let candidate = line.trim();
            if is_block_start(candidate) {
                break;
            }
            paragraph.push(candidate);
            index += 1;
        }
        blocks.push(format!("<p>{}</p>", render_inline(&paragraph.join(" "))));
    }

    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use crate::markdown::{escape_html, render_inline, render_markdown};

    #[test]
    fn escapes_text_and_keeps_code_spans_literal() {
        let html = render_inline("if a < b && c > d use `a < b` then **stop**");

        assert_eq!(
            html,
            "if a &lt; b &amp;&amp; c &gt; d use <code>a &lt; b</code> then <strong>stop</strong>"
        );
    }

    #[test]
    fn formatting_markers_inside_code_are_not_applied() {
        assert_eq!(
            render_inline("`**bold** _it_ ~~x~~`"),
            "<code>**bold** _it_ ~~x~~</code>"
        );
    }

    #[test]
    fn empty_link_text_falls_back_to_decoded_url() {
        assert_eq!(
            render_inline("[](https://example.com/x%20y)"),
            r#"<a href="https://example.com/x%20y" target="_blank" rel="noopener noreferrer">https://example.com/x y</a>"#
        );
    }

    #[test]
    fn decoded_fallback_text_is_escaped() {
        let html = render_inline("[ ](https://example.com/%3Cb%3E?a=1&b=2)");

        assert!(html.contains(r#"href="https://example.com/%3Cb%3E?a=1&amp;b=2""#));
        assert!(html.contains(">https://example.com/&lt;b&gt;?a=1&amp;b=2</a>"));
    }

    #[test]
    fn explicit_links_keep_their_text_and_may_wrap_code() {
        assert_eq!(
            render_inline("see [the `cfg` docs](https://docs.rs/cfg) now"),
            r#"see <a href="https://docs.rs/cfg" target="_blank" rel="noopener noreferrer">the <code>cfg</code> docs</a> now"#
        );
    }

    #[test]
    fn non_web_link_targets_are_left_as_text() {
        assert_eq!(render_inline("[x](mailto:a@b.c)"), "[x](mailto:a@b.c)");
    }

    #[test]
    fn bare_urls_become_links_without_inner_formatting() {
        assert_eq!(
            render_inline("open https://a.dev/_x_ and file:///tmp/a_b_c.txt"),
            concat!(
                r#"open <a href="https://a.dev/_x_" target="_blank" rel="noopener noreferrer">https://a.dev/_x_</a>"#,
                r#" and <a href="file:///tmp/a_b_c.txt" target="_blank" rel="noopener noreferrer">file:///tmp/a_b_c.txt</a>"#
            )
        );
    }

    #[test]
    fn urls_glued_to_text_are_not_autolinked() {
        assert_eq!(render_inline("xhttps://a.dev"), "xhttps://a.dev");
    }

    #[test]
    fn italics_need_non_word_boundaries() {
        assert_eq!(
            render_inline("snake_case_name and _this_, ~~gone~~"),
            "snake_case_name and <em>this</em>, <del>gone</del>"
        );
    }

    #[test]
    fn adjacent_italic_spans_share_a_boundary() {
        assert_eq!(
            render_inline("_a_ _b_ and x _c_ _d_"),
            "<em>a</em> <em>b</em> and x <em>c</em> <em>d</em>"
        );
        assert_eq!(render_inline("x _a _b_ y"), "x _a <em>b</em> y");
        assert_eq!(render_inline("(_a_)_b_"), "(<em>a</em>)<em>b</em>");
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn paragraphs_join_lines_and_split_on_blank_lines() {
        assert_eq!(
            render_markdown("line one\n   line two\n\n\nnext"),
            "<p>line one line two</p>\n<p>next</p>"
        );
    }

    #[test]
    fn renders_headings_lists_and_quotes() {
        let html = render_markdown(
            "# Title\n###### Deep\nintro\n- a\n* b\n+ c\n1. one\n22. two\n> quoted\n>more\ntail",
        );

        assert_eq!(
            html,
            [
                "<h1>Title</h1>",
                "<h6>Deep</h6>",
                "<p>intro</p>",
                "<ul><li>a</li><li>b</li><li>c</li></ul>",
                "<ol><li>one</li><li>two</li></ol>",
                "<blockquote><p>quoted more</p></blockquote>",
                "<p>tail</p>",
            ]
            .join("\n")
        );
    }

    #[test]
    fn malformed_block_markers_fall_back_to_paragraphs() {
        assert_eq!(
            render_markdown("####### seven\n#tag\n-\n1.5 million"),
            "<p>####### seven #tag - 1.5 million</p>"
        );
    }

    #[test]
    fn fenced_code_is_escaped_verbatim() {
        let html = render_markdown("```rust\nfn main() {\n    let x = a < b && **c**;\n}\n```\nafter");

        assert_eq!(
            html,
            "<pre><code>fn main() {\n    let x = a &lt; b &amp;&amp; **c**;\n}</code></pre>\n<p>after</p>"
        );
    }

    #[test]
    fn blank_or_unterminated_fences() {
        assert_eq!(render_markdown("```\n   \n```\ntext"), "<p>text</p>");
        assert_eq!(
            render_markdown("```\nopen <fence>"),
            "<pre><code>open &lt;fence&gt;</code></pre>"
        );
    }

    #[test]
    fn literal_placeholder_sentinels_survive() {
        let input = "a \u{E000}000000000000000000000000000000000\u{E001} b";

        assert_eq!(render_inline(input), input);
    }
}
