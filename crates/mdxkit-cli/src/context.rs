use std::env;
use std::path::{Path, PathBuf};

use mdxkit::{DocsWorkspace, MANIFEST_FILE, discover_workspace};

use crate::error::{CliError, ExitStatus};

pub struct CliSession {
    workspace_override: Option<PathBuf>,
}

impl CliSession {
    pub fn bootstrap(workspace_override: Option<String>) -> Result<Self, CliError> {
        let workspace_override = match workspace_override {
            Some(raw) => {
                let path = absolutize(Path::new(&raw))?;
                if !path.is_dir() {
                    return Err(CliError::new(
                        format!("workspace {} is not a directory", path.display()),
                        ExitStatus::NoInput,
                    ));
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self { workspace_override })
    }

    /// Directory that content roots are resolved against: the `--workspace`
    /// override, the nearest ancestor holding `docs.json`, or the current directory.
    pub fn content_base(&self) -> Result<PathBuf, CliError> {
        if let Some(path) = &self.workspace_override {
            return Ok(path.clone());
        }
        let cwd = env::current_dir()?;
        Ok(discover_workspace(&cwd)
            .map(|workspace| workspace.root().to_path_buf())
            .unwrap_or(cwd))
    }

    /// A workspace that must carry a navigation manifest.
    pub fn workspace(&self) -> Result<DocsWorkspace, CliError> {
        let workspace = match &self.workspace_override {
            Some(path) => DocsWorkspace::at(path),
            None => discover_workspace(env::current_dir()?)?,
        };
        if !workspace.has_manifest() {
            return Err(CliError::new(
                format!("no {MANIFEST_FILE} found in {}", workspace.root().display()),
                ExitStatus::Usage,
            ));
        }
        tracing::info!(
            workspace = %workspace.root().display(),
            manifest = %workspace.manifest_path().display(),
            "resolved workspace"
        );
        Ok(workspace)
    }

    /// Resolves a content root argument against [`CliSession::content_base`].
    pub fn resolve_root(&self, raw: &str) -> Result<PathBuf, CliError> {
        let path = Path::new(raw);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        Ok(self.content_base()?.join(path))
    }
}

/// Makes a file argument absolute against the current directory.
pub fn absolutize(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}
