use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// High-level error type shared across mdxkit components.
#[derive(Debug, Error)]
pub enum MdxkitError {
    #[error("malformed front matter: {0}")]
    MalformedFrontMatter(String),
    #[error("content root {} does not exist", .0.display())]
    MissingRoot(PathBuf),
    #[error("workspace error: {0}")]
    Workspace(String),
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error("rule error: {0}")]
    Rules(String),
    #[error("plan error: {0}")]
    Plan(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("markdown error: {0}")]
    Markdown(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MdxkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for MdxkitError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl MdxkitError {
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            MdxkitError::MalformedFrontMatter(msg) => {
                MdxkitError::MalformedFrontMatter(format!("{ctx}: {msg}"))
            }
            MdxkitError::MissingRoot(path) => MdxkitError::MissingRoot(path),
            MdxkitError::Workspace(msg) => MdxkitError::Workspace(format!("{ctx}: {msg}")),
            MdxkitError::Manifest(msg) => MdxkitError::Manifest(format!("{ctx}: {msg}")),
            MdxkitError::Rules(msg) => MdxkitError::Rules(format!("{ctx}: {msg}")),
            MdxkitError::Plan(msg) => MdxkitError::Plan(format!("{ctx}: {msg}")),
            MdxkitError::Template(msg) => MdxkitError::Template(format!("{ctx}: {msg}")),
            MdxkitError::Markdown(msg) => MdxkitError::Markdown(format!("{ctx}: {msg}")),
            MdxkitError::Serialization(msg) => {
                MdxkitError::Serialization(format!("{ctx}: {msg}"))
            }
            MdxkitError::Io(err) => MdxkitError::Io(err),
        }
    }
}
