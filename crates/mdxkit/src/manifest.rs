//! The `docs.json` navigation manifest.
//!
//! The manifest is held as a raw JSON document so that keys this crate knows
//! nothing about survive a load/save cycle in their original order. Only the
//! `navigation.languages[].groups[]` tree is interpreted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::MdxkitError;
use crate::persistence::write_atomic_json;

/// One entry of a group's `pages` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageEntry {
    Ref(String),
    Group(NavGroup),
    Titled {
        page: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
    },
    Other(Value),
}

impl PageEntry {
    /// The content reference this entry points at, if it is a page.
    pub fn page_ref(&self) -> Option<&str> {
        match self {
            PageEntry::Ref(page) | PageEntry::Titled { page, .. } => Some(page),
            PageEntry::Group(_) | PageEntry::Other(_) => None,
        }
    }
}

impl From<String> for PageEntry {
    fn from(page: String) -> Self {
        PageEntry::Ref(page)
    }
}

impl From<&str> for PageEntry {
    fn from(page: &str) -> Self {
        PageEntry::Ref(page.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavGroup {
    pub group: String,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

impl NavGroup {
    pub fn new(group: impl Into<String>, pages: Vec<PageEntry>) -> Self {
        Self {
            group: group.into(),
            pages,
        }
    }

    /// Page references in order, descending into nested groups.
    pub fn page_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        collect_refs(&self.pages, &mut refs);
        refs
    }
}

fn collect_refs<'a>(pages: &'a [PageEntry], out: &mut Vec<&'a str>) {
    for entry in pages {
        match entry {
            PageEntry::Group(group) => collect_refs(&group.pages, out),
            other => out.extend(other.page_ref()),
        }
    }
}

/// Whether [`NavigationManifest::replace_group`] rewrote an existing group or added one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupChange {
    Replaced,
    Appended,
}

/// References and groups dropped by [`NavigationManifest::prune_missing`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub removed_pages: Vec<String>,
    pub removed_groups: Vec<String>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.removed_pages.is_empty() && self.removed_groups.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationManifest {
    document: Value,
}

impl NavigationManifest {
    pub fn from_value(document: Value) -> Result<Self, MdxkitError> {
        if !document.is_object() {
            return Err(MdxkitError::Manifest(
                "manifest root must be a JSON object".into(),
            ));
        }
        Ok(Self { document })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, MdxkitError> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|err| MdxkitError::Manifest(format!("invalid JSON: {err}")))?;
        Self::from_value(document)
    }

    pub fn load(path: &Path) -> Result<Self, MdxkitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw).map_err(|err| err.context(path.display()))
    }

    /// Writes the manifest with two-space indentation via temp file and rename.
    pub fn save(&self, path: &Path) -> Result<(), MdxkitError> {
        write_atomic_json(path, &self.document)?;
        info!(path = %path.display(), "saved navigation manifest");
        Ok(())
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Language codes in manifest order.
    pub fn languages(&self) -> Vec<&str> {
        self.document
            .pointer("/navigation/languages")
            .and_then(Value::as_array)
            .map(|langs| {
                langs
                    .iter()
                    .filter_map(|lang| lang.get("language").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed copy of a group, if the language and group exist.
    pub fn group(&self, language: &str, name: &str) -> Option<NavGroup> {
        let groups = self
            .document
            .pointer("/navigation/languages")?
            .as_array()?
            .iter()
            .find(|lang| language_matches(lang, language))?
            .get("groups")?
            .as_array()?;
        let raw = groups.iter().find(|group| group_matches(group, name))?;
        serde_json::from_value(raw.clone()).ok()
    }

    /// Group names of a language in manifest order.
    pub fn group_names(&self, language: &str) -> Vec<&str> {
        self.document
            .pointer("/navigation/languages")
            .and_then(Value::as_array)
            .and_then(|langs| langs.iter().find(|lang| language_matches(lang, language)))
            .and_then(|lang| lang.get("groups"))
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|group| group.get("group").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops page references with no Document behind them and groups left empty.
    ///
    /// A reference `r` resolves when `{r}.{extension}` or `{r}/index.{extension}`
    /// exists under `content_root`. Absolute URLs are never checked.
    pub fn prune_missing(&mut self, content_root: &Path, extension: &str) -> PruneReport {
        let mut report = PruneReport::default();
        let extension = extension.trim_start_matches('.');
        let Some(languages) = self
            .document
            .pointer_mut("/navigation/languages")
            .and_then(Value::as_array_mut)
        else {
            return report;
        };

        for lang in languages.iter_mut() {
            if let Some(groups) = lang.get_mut("groups").and_then(Value::as_array_mut) {
                prune_entries(groups, content_root, extension, &mut report);
            }
        }

        for page in &report.removed_pages {
            debug!(page = %page, "removed missing page reference");
        }
        report
    }

    /// Replaces the pages of `group` in `language`, or appends the group when absent.
    /// Other keys of an existing group are kept.
    pub fn replace_group(
        &mut self,
        language: &str,
        group: &str,
        pages: Vec<PageEntry>,
    ) -> Result<GroupChange, MdxkitError> {
        let pages = serde_json::to_value(pages)?;
        let groups = self.groups_mut(language)?;

        if let Some(existing) = groups.iter_mut().find(|entry| group_matches(entry, group)) {
            if let Some(object) = existing.as_object_mut() {
                object.insert("pages".to_string(), pages);
            }
            return Ok(GroupChange::Replaced);
        }

        let mut object = Map::new();
        object.insert("group".to_string(), Value::String(group.to_string()));
        object.insert("pages".to_string(), pages);
        groups.push(Value::Object(object));
        Ok(GroupChange::Appended)
    }

    /// Adds a page reference to a group, creating the language and group as
    /// needed. Returns `false` when the page was already listed.
    pub fn add_page(&mut self, language: &str, group: &str, page: &str) -> Result<bool, MdxkitError> {
        let groups = self.groups_mut(language)?;
        let index = match groups.iter().position(|entry| group_matches(entry, group)) {
            Some(index) => index,
            None => {
                let mut object = Map::new();
                object.insert("group".to_string(), Value::String(group.to_string()));
                object.insert("pages".to_string(), Value::Array(Vec::new()));
                groups.push(Value::Object(object));
                groups.len() - 1
            }
        };

        let object = groups[index].as_object_mut().ok_or_else(|| {
            MdxkitError::Manifest(format!("group `{group}` is not an object"))
        })?;
        let pages = object
            .entry("pages")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !pages.is_array() {
            *pages = Value::Array(Vec::new());
        }
        let Some(pages) = pages.as_array_mut() else {
            return Ok(false);
        };

        let listed = pages.iter().any(|entry| {
            entry.as_str() == Some(page)
                || entry.get("page").and_then(Value::as_str) == Some(page)
        });
        if listed {
            return Ok(false);
        }
        pages.push(Value::String(page.to_string()));
        Ok(true)
    }

    /// Removes a top-level group. Returns whether anything was removed.
    pub fn remove_group(&mut self, language: &str, group: &str) -> bool {
        let Some(groups) = self
            .document
            .pointer_mut("/navigation/languages")
            .and_then(Value::as_array_mut)
            .and_then(|langs| langs.iter_mut().find(|lang| language_matches(lang, language)))
            .and_then(|lang| lang.get_mut("groups"))
            .and_then(Value::as_array_mut)
        else {
            return false;
        };
        let before = groups.len();
        groups.retain(|entry| !group_matches(entry, group));
        before != groups.len()
    }

    /// The `groups` array of a language, creating `navigation`, the language
    /// entry and the array when missing.
    fn groups_mut(&mut self, language: &str) -> Result<&mut Vec<Value>, MdxkitError> {
        let root = self
            .document
            .as_object_mut()
            .ok_or_else(|| MdxkitError::Manifest("manifest root must be a JSON object".into()))?;
        let navigation = root
            .entry("navigation")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| MdxkitError::Manifest("`navigation` must be an object".into()))?;
        let languages = navigation
            .entry("languages")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| MdxkitError::Manifest("`navigation.languages` must be an array".into()))?;

        let index = match languages.iter().position(|lang| language_matches(lang, language)) {
            Some(index) => index,
            None => {
                let mut entry = Map::new();
                entry.insert("language".to_string(), Value::String(language.to_string()));
                entry.insert("groups".to_string(), Value::Array(Vec::new()));
                languages.push(Value::Object(entry));
                languages.len() - 1
            }
        };

        let lang = languages[index].as_object_mut().ok_or_else(|| {
            MdxkitError::Manifest(format!("language `{language}` is not an object"))
        })?;
        let groups = lang
            .entry("groups")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !groups.is_array() {
            return Err(MdxkitError::Manifest(format!(
                "groups of language `{language}` must be an array"
            )));
        }
        groups
            .as_array_mut()
            .ok_or_else(|| MdxkitError::Manifest(format!("language `{language}` has no groups")))
    }
}

fn language_matches(entry: &Value, language: &str) -> bool {
    entry.get("language").and_then(Value::as_str) == Some(language)
}

fn group_matches(entry: &Value, group: &str) -> bool {
    entry.get("group").and_then(Value::as_str) == Some(group)
}

/// Prunes a pages (or groups) list in place. Nested groups left without
/// pages are removed along with their stale references.
fn prune_entries(
    entries: &mut Vec<Value>,
    content_root: &Path,
    extension: &str,
    report: &mut PruneReport,
) {
    entries.retain_mut(|entry| match entry {
        Value::String(page) => {
            let keep = page_exists(content_root, page, extension);
            if !keep {
                report.removed_pages.push(page.clone());
            }
            keep
        }
        Value::Object(object) if object.contains_key("group") => {
            if let Some(pages) = object.get_mut("pages").and_then(Value::as_array_mut) {
                prune_entries(pages, content_root, extension, report);
            }
            let non_empty = object
                .get("pages")
                .and_then(Value::as_array)
                .is_some_and(|pages| !pages.is_empty());
            if !non_empty {
                let name = object.get("group").and_then(Value::as_str).unwrap_or_default();
                report.removed_groups.push(name.to_string());
            }
            non_empty
        }
        Value::Object(object) => match object.get("page").and_then(Value::as_str) {
            Some(page) => {
                let keep = page_exists(content_root, page, extension);
                if !keep {
                    report.removed_pages.push(page.to_string());
                }
                keep
            }
            None => true,
        },
        _ => true,
    });
}

fn page_exists(content_root: &Path, page: &str, extension: &str) -> bool {
    if page.contains("://") {
        return true;
    }
    let relative = page.trim_matches('/');
    content_root.join(format!("{relative}.{extension}")).is_file()
        || content_root
            .join(relative)
            .join(format!("index.{extension}"))
            .is_file()
}

/// Page references for the Documents directly inside `dir` (relative to
/// `content_root`), sorted by file name. A missing directory lists nothing.
pub fn list_pages(
    content_root: &Path,
    dir: &str,
    extension: &str,
    skip_index: bool,
) -> Result<Vec<String>, MdxkitError> {
    let prefix = dir.trim_matches('/');
    let extension = extension.trim_start_matches('.');
    let full = content_root.join(prefix);
    if !full.is_dir() {
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(&full)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| MdxkitError::Workspace(err.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if skip_index && stem == "index" {
            continue;
        }
        pages.push(if prefix.is_empty() {
            stem.to_string()
        } else {
            format!("{prefix}/{stem}")
        });
    }
    Ok(pages)
}
