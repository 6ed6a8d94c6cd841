use std::fs;
use std::path::PathBuf;

use markdown::ParseOptions;
use markdown::mdast::Node;
use serde::Serialize;
use tracing::warn;

use crate::error::MdxkitError;
use crate::front_matter::split_front_matter;
use crate::walker::ContentWalker;

/// Raw HTML left in one Document body.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ResidualReport {
    pub path: PathBuf,
    pub fragments: Vec<String>,
}

/// Collects raw HTML nodes from a Markdown body, in document order.
///
/// HTML comments and MDX components (tags whose name starts with an uppercase
/// letter, such as `<Note>`) are not reported.
pub fn find_residual_html(body: &str) -> Result<Vec<String>, MdxkitError> {
    let root = markdown::to_mdast(body, &ParseOptions::gfm())
        .map_err(|message| MdxkitError::Markdown(message.to_string()))?;

    let mut fragments = Vec::new();
    collect_html(&root, &mut fragments);
    Ok(fragments)
}

fn collect_html(node: &Node, out: &mut Vec<String>) {
    if let Node::Html(html) = node {
        if is_reportable(&html.value) {
            out.push(html.value.trim().to_string());
        }
        return;
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_html(child, out);
        }
    }
}

fn is_reportable(fragment: &str) -> bool {
    let fragment = fragment.trim_start();
    if fragment.starts_with("<!--") {
        return false;
    }
    let name = fragment
        .strip_prefix("</")
        .or_else(|| fragment.strip_prefix('<'))
        .unwrap_or(fragment);
    !name.starts_with(|ch: char| ch.is_ascii_uppercase())
}

/// Runs [`find_residual_html`] over every Document the walker yields. Only
/// Documents with findings are returned; unreadable files are logged and skipped.
pub fn check_tree(walker: &ContentWalker) -> Result<Vec<ResidualReport>, MdxkitError> {
    let mut reports = Vec::new();
    for path in walker.files()? {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let body = match split_front_matter(&content) {
            Ok(split) => split.body,
            Err(_) => content.as_str(),
        };
        let fragments = match find_residual_html(body) {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unparsable file");
                continue;
            }
        };
        if !fragments.is_empty() {
            reports.push(ResidualReport { path, fragments });
        }
    }
    Ok(reports)
}
