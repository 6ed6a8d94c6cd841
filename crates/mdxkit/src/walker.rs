use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use serde::Serialize;
use tracing::warn;

use crate::error::MdxkitError;
use crate::rewrite::{ContentTransform, WriteMode, rewrite_file};

/// Directory names skipped unless the caller replaces the exclusion list.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[".git", "node_modules"];

/// A file the walker could not process, with the reason it was left alone.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WalkReport {
    pub examined: usize,
    pub changed: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// Deterministic enumeration of the content files below a root directory.
#[derive(Clone, Debug)]
pub struct ContentWalker {
    root: PathBuf,
    extensions: Vec<String>,
    exclusions: Vec<String>,
}

impl ContentWalker {
    /// Walks `*.mdx` files and skips [`DEFAULT_EXCLUSIONS`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["mdx".to_string()],
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the extension filter. A leading dot is ignored.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Replaces the exclusion globs. Globs use gitignore syntax, so a bare
    /// name matches at any depth.
    pub fn with_exclusions<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = globs.into_iter().map(Into::into).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Every matching file, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>, MdxkitError> {
        let (files, errors) = self.collect()?;
        for skipped in errors {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipping unreadable entry");
        }
        Ok(files)
    }

    /// Applies `transform` to every matching file. Per-file failures are
    /// recorded in the report and never stop the walk.
    pub fn walk(
        &self,
        transform: &dyn ContentTransform,
        mode: WriteMode,
    ) -> Result<WalkReport, MdxkitError> {
        let (files, mut skipped) = self.collect()?;
        let mut report = WalkReport {
            examined: files.len(),
            ..WalkReport::default()
        };

        for path in files {
            match rewrite_file(&path, transform, mode) {
                Ok(true) => report.changed.push(path),
                Ok(false) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping file");
                    skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        report.skipped = skipped;
        Ok(report)
    }

    fn collect(&self) -> Result<(Vec<PathBuf>, Vec<SkippedFile>), MdxkitError> {
        if !self.root.exists() {
            return Err(MdxkitError::MissingRoot(self.root.clone()));
        }

        let mut overrides = OverrideBuilder::new(&self.root);
        for glob in &self.exclusions {
            overrides
                .add(&format!("!{glob}"))
                .map_err(|err| MdxkitError::Workspace(format!("invalid exclusion `{glob}`: {err}")))?;
        }
        let overrides = overrides
            .build()
            .map_err(|err| MdxkitError::Workspace(format!("invalid exclusions: {err}")))?;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .overrides(overrides)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
                    if is_file && self.matches_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => errors.push(SkippedFile {
                    path: error_path(&err).unwrap_or_else(|| self.root.clone()),
                    reason: err.to_string(),
                }),
            }
        }
        Ok((files, errors))
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(ext))
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}
