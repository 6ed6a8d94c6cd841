use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MdxkitError;

/// File whose presence marks the root of a documentation tree.
pub const MANIFEST_FILE: &str = "docs.json";

/// Canonical paths for a documentation workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsWorkspace {
    root: PathBuf,
    manifest_path: PathBuf,
}

impl DocsWorkspace {
    /// Treats `root` as a workspace without searching for a manifest.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);
        Self {
            root,
            manifest_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `docs.json`, which may not exist for workspaces built with [`DocsWorkspace::at`].
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path.is_file()
    }

    /// Joins a content reference or relative path to the workspace root.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        let rel = rel.as_ref();
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

/// Finds the nearest ancestor of `start` that contains `docs.json`.
pub fn discover(start: impl AsRef<Path>) -> Result<DocsWorkspace, MdxkitError> {
    let canonical_start = normalize_start(start.as_ref())?;

    for ancestor in canonical_start.ancestors() {
        if ancestor.join(MANIFEST_FILE).is_file() {
            return Ok(DocsWorkspace::at(ancestor));
        }
    }

    Err(MdxkitError::Workspace(format!(
        "no {MANIFEST_FILE} found from {}",
        canonical_start.display()
    )))
}

fn normalize_start(start: &Path) -> Result<PathBuf, MdxkitError> {
    let mut cursor = start.to_path_buf();

    // Walk up until a real path exists so discovery works for not-yet-created files.
    while !cursor.exists() {
        if !cursor.pop() {
            return Err(MdxkitError::Workspace(format!(
                "unable to find existing ancestor for {}",
                start.display()
            )));
        }
    }

    if cursor.is_file() {
        cursor = cursor.parent().map(Path::to_path_buf).ok_or_else(|| {
            MdxkitError::Workspace(format!(
                "file path {} has no parent directory",
                start.display()
            ))
        })?;
    }

    Ok(fs::canonicalize(cursor)?)
}
