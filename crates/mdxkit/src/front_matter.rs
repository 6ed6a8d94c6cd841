use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MdxkitError;

const MARKER: &str = "---";

/// Parsed view of the YAML front matter attached to a document.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining keys in document order.
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl FrontMatter {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MdxkitError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|err| MdxkitError::Serialization(err.to_string()))
    }
}

/// A content file split into its metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Document {
    pub fn parse(content: &str) -> Result<Self, MdxkitError> {
        let split = split_front_matter(content)?;
        Ok(Self {
            front_matter: FrontMatter::from_yaml_str(split.yaml)?,
            body: split.body.to_string(),
        })
    }
}

/// Borrowed slices of a document split around its front matter block.
///
/// `head + yaml + tail + body` is always the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterSplit<'a> {
    /// Optional BOM plus the opening marker line.
    pub head: &'a str,
    pub yaml: &'a str,
    /// Line break ending the YAML, the closing marker line, and any blank lines after it.
    pub tail: &'a str,
    pub body: &'a str,
}

impl FrontMatterSplit<'_> {
    /// Reproduces the original document byte for byte.
    pub fn reassemble(&self) -> String {
        let mut out =
            String::with_capacity(self.head.len() + self.yaml.len() + self.tail.len() + self.body.len());
        out.push_str(self.head);
        out.push_str(self.yaml);
        out.push_str(self.tail);
        out.push_str(self.body);
        out
    }

    /// Joins the original YAML with a new body using the canonical layout.
    pub fn with_body(&self, body: &str) -> String {
        compose(self.yaml, body)
    }

    /// Swaps in replacement YAML, keeping the markers, spacing and body as they were.
    pub fn with_yaml(&self, yaml: &str) -> String {
        let mut out = String::with_capacity(
            self.head.len() + yaml.len() + self.tail.len() + self.body.len() + 2,
        );
        out.push_str(self.head);
        out.push_str(yaml);
        if self.yaml.is_empty() && !yaml.is_empty() {
            // An empty block has no line break before the closing marker.
            out.push_str(line_ending(self.head));
        }
        out.push_str(self.tail);
        out.push_str(self.body);
        out
    }
}

/// Canonical document layout: marker, YAML, marker, blank line, body.
/// Line endings inside `yaml` are normalized to `\n`.
pub fn compose(yaml: &str, body: &str) -> String {
    let yaml = yaml.replace("\r\n", "\n");
    let body = body.trim_end_matches(['\n', '\r']);
    if body.is_empty() {
        format!("{MARKER}\n{yaml}\n{MARKER}\n")
    } else {
        format!("{MARKER}\n{yaml}\n{MARKER}\n\n{body}\n")
    }
}

/// Splits raw document text into front matter YAML and body.
pub fn split_front_matter(content: &str) -> Result<FrontMatterSplit<'_>, MdxkitError> {
    let bom = if content.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut lines = content[bom..].split_inclusive('\n');
    let opening = lines
        .next()
        .filter(|line| is_marker(line))
        .ok_or_else(|| {
            MdxkitError::MalformedFrontMatter("missing front matter delimiter (---)".into())
        })?;
    if !opening.ends_with('\n') {
        return Err(MdxkitError::MalformedFrontMatter(
            "missing newline after front matter start".into(),
        ));
    }

    let yaml_start = bom + opening.len();
    let mut offset = yaml_start;
    let mut previous: Option<&str> = None;
    let mut closing: Option<usize> = None;
    for line in lines {
        if is_marker(line) {
            closing = Some(line.len());
            break;
        }
        offset += line.len();
        previous = Some(line);
    }

    let Some(closing_len) = closing else {
        return Err(MdxkitError::MalformedFrontMatter(
            "missing closing front matter delimiter (---)".into(),
        ));
    };

    let yaml_end = match previous {
        Some(line) => offset - line_terminator_len(line),
        None => offset,
    };

    let mut body_start = offset + closing_len;
    for line in content[body_start..].split_inclusive('\n') {
        if !line.ends_with('\n') || !line.trim().is_empty() {
            break;
        }
        body_start += line.len();
    }

    Ok(FrontMatterSplit {
        head: &content[..yaml_start],
        yaml: &content[yaml_start..yaml_end],
        tail: &content[yaml_end..body_start],
        body: &content[body_start..],
    })
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == MARKER
}

fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Whether `key` can be written as a bare top-level front matter key.
pub fn is_valid_front_matter_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// Sets a top-level `key: "value"` line in front matter YAML. An existing
/// entry (with any indented continuation lines) is replaced in place,
/// otherwise the line is appended.
pub fn set_front_matter_field(yaml: &str, key: &str, value: &str) -> String {
    let line = format!("{key}: \"{}\"", escape_yaml_string(value));
    if let Some(edited) = edit_field(yaml, key, Some(&line)) {
        return edited;
    }
    let existing = yaml.trim_end_matches(['\n', '\r']);
    if existing.is_empty() {
        line
    } else {
        format!("{existing}{}{line}", line_ending(yaml))
    }
}

/// Removes a top-level key and its continuation lines. `None` when the key is absent.
pub fn remove_front_matter_field(yaml: &str, key: &str) -> Option<String> {
    edit_field(yaml, key, None)
}

fn edit_field(yaml: &str, key: &str, replacement: Option<&str>) -> Option<String> {
    let mut lines = yaml.lines().peekable();
    let mut out = Vec::new();
    let mut found = false;
    while let Some(line) = lines.next() {
        if !found && is_field_line(line, key) {
            found = true;
            while lines.peek().is_some_and(|next| is_continuation(next)) {
                lines.next();
            }
            if let Some(replacement) = replacement {
                out.push(replacement);
            }
            continue;
        }
        out.push(line);
    }
    found.then(|| out.join(line_ending(yaml)))
}

fn is_field_line(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start_matches([' ', '\t']).starts_with(':'))
}

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t']) || line == "-" || line.starts_with("- ")
}

fn line_terminator_len(line: &str) -> usize {
    if line.ends_with("\r\n") {
        2
    } else if line.ends_with('\n') {
        1
    } else {
        0
    }
}

/// Renders a front matter block of `key: "value"` lines.
pub fn render_front_matter(fields: &[(&str, &str)]) -> String {
    let mut out = String::from(MARKER);
    out.push('\n');
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(": \"");
        out.push_str(&escape_yaml_string(value));
        out.push_str("\"\n");
    }
    out.push_str(MARKER);
    out.push('\n');
    out
}

pub(crate) fn escape_yaml_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

/// Rewrites a title-only front matter that was collapsed onto one line
/// (`---title: "x"---body`) into the canonical layout.
pub fn repair_collapsed_front_matter(content: &str) -> Option<String> {
    static COLLAPSED: OnceLock<Regex> = OnceLock::new();
    let re = COLLAPSED.get_or_init(|| {
        Regex::new(r#"^\x{FEFF}?---\s*title:\s*"([^"]+)"\s*---\s*"#)
            .expect("collapsed front matter regex")
    });

    let repaired = re.replace(content, "---\ntitle: \"${1}\"\n---\n\n");
    if repaired == content {
        None
    } else {
        Some(repaired.into_owned())
    }
}
