//! Ordered regex rewrites that turn the HTML subset found in exported
//! help-center articles into Markdown.
//!
//! Every tag rule matches a single, non-nested element (`[^<]+` content), so
//! markup nested inside another element is only partially converted: the
//! outer rule cannot match and the inner rule rewrites in place, leaving the
//! outer tags behind. Anything no rule recognizes is passed through untouched.
//! `crate::residual` reports what is left over.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::trace;

struct TagRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

/// Pattern table, applied top to bottom. Later rules see the output of earlier ones.
const TAG_RULES: &[(&str, &str, &str)] = &[
    ("article", r"<article\b[^>]*>|</article>", ""),
    ("h1", r"<h1\b[^>]*>([^<]+)</h1>", "\n# ${1}\n"),
    ("h2", r"<h2\b[^>]*>([^<]+)</h2>", "\n## ${1}\n"),
    ("h3", r"<h3\b[^>]*>([^<]+)</h3>", "\n### ${1}\n"),
    ("h4", r"<h4\b[^>]*>([^<]+)</h4>", "\n#### ${1}\n"),
    ("h5", r"<h5\b[^>]*>([^<]+)</h5>", "\n##### ${1}\n"),
    ("h6", r"<h6\b[^>]*>([^<]+)</h6>", "\n###### ${1}\n"),
    ("p", r"<p\b[^>]*>([^<]+)</p>", "\n\n${1}\n\n"),
    ("a", r#"<a\b[^>]*\shref="([^"]*)"[^>]*>([^<]+)</a>"#, "[${2}](${1})"),
    ("a-empty", r"<a\b[^>]*>\s*</a>", ""),
    ("strong", r"<strong\b[^>]*>([^<]+)</strong>", "**${1}**"),
    ("b", r"<b\b[^>]*>([^<]+)</b>", "**${1}**"),
    ("em", r"<em\b[^>]*>([^<]+)</em>", "*${1}*"),
    ("i", r"<i\b[^>]*>([^<]+)</i>", "*${1}*"),
    ("list", r"<[uo]l\b[^>]*>|</[uo]l>", "\n"),
    ("li", r"<li\b[^>]*>([^<]+)</li>", "- ${1}\n"),
    ("table", r"<table\b[^>]*>|</table>", "\n"),
    ("table-section", r"</?t(?:head|body)\b[^>]*>", ""),
    ("tr-open", r"<tr\b[^>]*>", "| "),
    ("tr-close", r"</tr>", " |\n"),
    ("cell", r"<t[dh]\b[^>]*>([^<]*)</t[dh]>", "${1} | "),
    ("br", r"<br\b[^>]*>", "\n"),
    ("hr", r"<hr\b[^>]*>", "\n\n---\n"),
    ("code", r"<code\b[^>]*>([^<]+)</code>", "`${1}`"),
    ("pre", r"<pre\b[^>]*>([^<]+)</pre>", "\n```\n${1}\n```\n"),
    ("blockquote", r"<blockquote\b[^>]*>([^<]+)</blockquote>", "\n> ${1}\n"),
    (
        "img-src-alt",
        r#"<img\b[^>]*\ssrc="([^"]*)"[^>]*\salt="([^"]*)"[^>]*>"#,
        "![${2}](${1})",
    ),
    (
        "img-alt-src",
        r#"<img\b[^>]*\salt="([^"]*)"[^>]*\ssrc="([^"]*)"[^>]*>"#,
        "![${1}](${2})",
    ),
    ("img-src", r#"<img\b[^>]*\ssrc="([^"]*)"[^>]*>"#, "![](${1})"),
    ("div", r"<div\b[^>]*>([^<]*)</div>", "${1}"),
    ("span", r"<span\b[^>]*>([^<]*)</span>", "${1}"),
];

fn tag_rules() -> &'static [TagRule] {
    static RULES: OnceLock<Vec<TagRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        TAG_RULES
            .iter()
            .map(|&(name, pattern, replacement)| TagRule {
                name,
                pattern: Regex::new(pattern).expect("tag rule regex"),
                replacement,
            })
            .collect()
    })
}

fn residual_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("residual tag regex"))
}

fn entity() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(nbsp|amp|lt|gt|quot);").expect("entity regex"))
}

fn horizontal_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("horizontal space regex"))
}

fn trailing_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m) +$").expect("trailing space regex"))
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank line regex"))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Remove every tag still present after the conversion rules ran.
    pub strip_residual_tags: bool,
}

/// Converts HTML-flavored bodies to Markdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    pub fn normalize(&self, html: &str) -> String {
        let mut text = html.to_string();

        for rule in tag_rules() {
            if let Some(rewritten) = replace(&rule.pattern, &text, rule.replacement) {
                trace!(rule = rule.name, "normalizer rule matched");
                text = rewritten;
            }
        }

        if self.options.strip_residual_tags {
            if let Some(rewritten) = replace(residual_tag(), &text, "") {
                trace!(rule = "residual", "normalizer rule matched");
                text = rewritten;
            }
        }

        let text = decode_entities(&text);
        normalize_whitespace(&text)
    }
}

/// Converts a body with the default options.
pub fn normalize_html(html: &str) -> String {
    Normalizer::default().normalize(html)
}

fn replace(pattern: &Regex, text: &str, replacement: &str) -> Option<String> {
    match pattern.replace_all(text, replacement) {
        Cow::Owned(rewritten) => Some(rewritten),
        Cow::Borrowed(_) => None,
    }
}

/// Decodes the supported named entities in one pass, so `&amp;lt;` becomes `&lt;`.
fn decode_entities(text: &str) -> String {
    entity()
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "nbsp" => " ",
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            _ => "\"",
        })
        .into_owned()
}

fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = horizontal_space().replace_all(&text, " ");
    let text = trailing_space().replace_all(&text, "");
    let text = blank_lines().replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_map_to_hash_prefixes() {
        assert_eq!(normalize_html("<h2>Title</h2>"), "## Title");
        assert_eq!(normalize_html("<h6 class=\"x\">Deep</h6>"), "###### Deep");

        let out = normalize_html("<h1>A</h1><h1>B</h1>");
        let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["# A", "# B"]);
    }

    #[test]
    fn links_become_inline_links() {
        assert_eq!(
            normalize_html("<a href=\"https://x.test\">Click</a>"),
            "[Click](https://x.test)"
        );
        assert_eq!(
            normalize_html("<a class=\"btn\" href=\"/a\" target=\"_blank\">Go</a>"),
            "[Go](/a)"
        );
    }

    #[test]
    fn empty_anchors_are_dropped() {
        assert_eq!(
            normalize_html("<h2>Setup</h2><a href=\"#setup\" class=\"anchor\"></a>"),
            "## Setup"
        );
    }

    #[test]
    fn emphasis_long_and_short_forms() {
        assert_eq!(
            normalize_html("<strong>a</strong> <b>b</b> <em>c</em> <i>d</i>"),
            "**a** **b** *c* *d*"
        );
    }

    #[test]
    fn list_items_become_dash_bullets() {
        let out = normalize_html("<ol><li>One</li><li>Two</li></ol>");
        assert_eq!(out, "- One\n- Two");
    }

    #[test]
    fn table_rows_use_pipe_delimiters() {
        let out = normalize_html(
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>",
        );
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("| a | b |"), "{out}");
        assert!(out.lines().nth(1).unwrap().starts_with("| c | d |"), "{out}");
    }

    #[test]
    fn entities_are_decoded_once() {
        assert_eq!(normalize_html("A &amp; B"), "A & B");
        assert_eq!(normalize_html("&lt;tag&gt; &quot;q&quot;"), "<tag> \"q\"");
        assert_eq!(normalize_html("&amp;lt;"), "&lt;");
        assert_eq!(normalize_html("a&nbsp;&nbsp;b"), "a b");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize_html("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_html("a \t  b"), "a b");
        assert_eq!(normalize_html("a\n \n\t\n\nb"), "a\n\nb");
        assert_eq!(normalize_html("  \n\nbody\n\n  "), "body");
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(normalize_html("<p>One</p><p>Two</p>"), "One\n\nTwo");
    }

    #[test]
    fn images_tolerate_attribute_order() {
        assert_eq!(
            normalize_html("<img src=\"a.png\" alt=\"A\">"),
            "![A](a.png)"
        );
        assert_eq!(
            normalize_html("<img alt=\"B\" class=\"x\" src=\"b.png\" />"),
            "![B](b.png)"
        );
        assert_eq!(normalize_html("<img src=\"c.png\">"), "![](c.png)");
        assert_eq!(
            normalize_html("<img data-src=\"lazy.png\" src=\"d.png\">"),
            "![](d.png)"
        );
    }

    #[test]
    fn code_pre_and_blockquote() {
        assert_eq!(normalize_html("Run <code>npm i</code>"), "Run `npm i`");
        assert_eq!(
            normalize_html("<pre>let x = 1;</pre>"),
            "```\nlet x = 1;\n```"
        );
        assert_eq!(normalize_html("<blockquote>Quote</blockquote>"), "> Quote");
    }

    #[test]
    fn breaks_rules_and_containers() {
        assert_eq!(normalize_html("a<br>b<br/>c"), "a\nb\nc");
        assert_eq!(normalize_html("above<hr>below"), "above\n\n---\nbelow");
        assert_eq!(
            normalize_html("<div class=\"x\"><span>inner</span></div>"),
            "<div class=\"x\">inner</div>"
        );
        assert_eq!(normalize_html("<div><div>x</div></div>"), "<div>x</div>");
    }

    #[test]
    fn unknown_tags_pass_through() {
        assert_eq!(
            normalize_html("<Note>Keep me</Note>"),
            "<Note>Keep me</Note>"
        );
        assert_eq!(normalize_html("<pre>x</pre>"), "```\nx\n```");
    }

    #[test]
    fn nested_markup_is_left_partially_converted() {
        assert_eq!(
            normalize_html("<a href=\"/x\"><strong>Bold</strong></a>"),
            "<a href=\"/x\">**Bold**</a>"
        );
    }

    #[test]
    fn strip_residual_removes_leftover_tags_but_keeps_decoded_text() {
        let normalizer = Normalizer::with_options(NormalizeOptions {
            strip_residual_tags: true,
        });
        assert_eq!(
            normalizer.normalize("<a href=\"/x\"><strong>Bold</strong></a> &lt;kbd&gt;"),
            "**Bold** <kbd>"
        );
    }

    #[test]
    fn normalizing_twice_matches_normalizing_once() {
        let input = concat!(
            "<article><h2>Intro</h2><p>Hello world &amp; friends</p>",
            "<ul><li>One</li><li>Two</li></ul>",
            "<table><tr><th>a</th><th>b</th></tr></table>",
            "<img src=\"x.png\" alt=\"X\"><br><code>let</code>",
            "<blockquote>Said</blockquote></article>"
        );
        let once = normalize_html(input);
        let twice = normalize_html(&once);
        assert_eq!(once, twice);
        assert!(!once.contains('<'), "{once}");
    }
}
