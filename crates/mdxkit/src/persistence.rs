use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MdxkitError;

/// Writes `contents` next to `path` and renames it into place, so readers never
/// observe a truncated file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), MdxkitError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = temp_path(path)?;
    fs::write(&tmp_path, contents).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        MdxkitError::Workspace(format!(
            "failed to write temporary file {}: {err}",
            tmp_path.display()
        ))
    })?;

    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        MdxkitError::Workspace(format!("failed to publish {}: {err}", path.display()))
    })
}

/// Pretty-prints `value` with two-space indentation and writes it atomically.
pub fn write_atomic_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MdxkitError> {
    let mut payload = serde_json::to_string_pretty(value)?;
    payload.push('\n');
    write_atomic(path, &payload)
}

fn temp_path(path: &Path) -> Result<PathBuf, MdxkitError> {
    let name = path.file_name().ok_or_else(|| {
        MdxkitError::Workspace(format!("{} has no file name", path.display()))
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".mdxkit-tmp");
    Ok(path.with_file_name(tmp_name))
}
