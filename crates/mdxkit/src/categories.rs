//! Moves flat section articles into category folders and rebuilds the
//! matching navigation groups.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::MdxkitError;
use crate::front_matter::Document;
use crate::import::{DEFAULT_LANGUAGE, DEFAULT_SECTION, title_from_slug};
use crate::manifest::{GroupChange, NavGroup, NavigationManifest, PageEntry, list_pages};
use crate::persistence::write_atomic;
use crate::rewrite::WriteMode;
use crate::template::{IndexArticle, IndexPageContext, IndexPageEngine};

const EXTENSION: &str = "mdx";
const INDEX_FILE: &str = "index.mdx";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CategoryPlan {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_section")]
    pub section: String,
    /// Flat group replaced by the per-category groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_group: Option<String>,
    /// Handlebars template for index pages, relative to the plan file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_template: Option<PathBuf>,
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Category {
    /// Display name, used as the navigation group title.
    pub name: String,
    pub dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Article slugs that belong in this category.
    #[serde(default)]
    pub articles: Vec<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

impl CategoryPlan {
    pub fn from_yaml_str(raw: &str) -> Result<Self, MdxkitError> {
        let plan: CategoryPlan =
            serde_yaml::from_str(raw).map_err(|err| MdxkitError::Plan(err.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Loads a plan and resolves `index_template` against the plan's directory.
    pub fn load(path: &Path) -> Result<Self, MdxkitError> {
        let raw = fs::read_to_string(path)?;
        let mut plan = Self::from_yaml_str(&raw).map_err(|err| err.context(path.display()))?;
        if let Some(template) = plan.index_template.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            plan.index_template = Some(base.join(template));
        }
        Ok(plan)
    }

    fn validate(&self) -> Result<(), MdxkitError> {
        for segment in [&self.language, &self.section] {
            check_segment(segment)?;
        }
        let mut seen = BTreeMap::new();
        for category in &self.categories {
            check_segment(&category.dir)?;
            if let Some(previous) = seen.insert(category.dir.as_str(), category.name.as_str()) {
                return Err(MdxkitError::Plan(format!(
                    "categories `{previous}` and `{}` share directory `{}`",
                    category.name, category.dir
                )));
            }
            for slug in &category.articles {
                check_segment(slug)?;
            }
        }
        Ok(())
    }

    /// `{language}/{section}`, the reference prefix of every page in the plan.
    pub fn section_ref(&self) -> String {
        format!("{}/{}", self.language, self.section)
    }

    pub fn section_dir(&self, content_root: &Path) -> PathBuf {
        content_root.join(&self.language).join(&self.section)
    }

    /// Index page engine for this plan: the configured template or the built-in one.
    pub fn index_engine(&self) -> Result<IndexPageEngine, MdxkitError> {
        match &self.index_template {
            Some(path) => IndexPageEngine::from_file(path),
            None => IndexPageEngine::new(),
        }
    }
}

fn check_segment(segment: &str) -> Result<(), MdxkitError> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(MdxkitError::Plan(format!(
            "`{segment}` is not a valid path segment"
        )))
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MovedArticle {
    pub slug: String,
    pub category: String,
    pub to: PathBuf,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct MoveReport {
    pub moved: Vec<MovedArticle>,
    /// Slugs already inside their category folder.
    pub in_place: Vec<String>,
    /// Slugs with no file in the section or the category folder.
    pub missing: Vec<String>,
}

/// Moves `{section_dir}/{slug}.mdx` into `{section_dir}/{dir}/` for every
/// article the plan lists. Files already in place are left alone.
pub fn move_articles(
    section_dir: &Path,
    plan: &CategoryPlan,
    mode: WriteMode,
) -> Result<MoveReport, MdxkitError> {
    if !section_dir.is_dir() {
        return Err(MdxkitError::MissingRoot(section_dir.to_path_buf()));
    }

    let mut report = MoveReport::default();
    for category in &plan.categories {
        let category_dir = section_dir.join(&category.dir);
        if mode == WriteMode::Write {
            fs::create_dir_all(&category_dir)?;
        }

        for slug in &category.articles {
            let file_name = format!("{slug}.{EXTENSION}");
            let source = section_dir.join(&file_name);
            let target = category_dir.join(&file_name);

            if target.is_file() {
                report.in_place.push(slug.clone());
            } else if source.is_file() {
                if mode == WriteMode::Write {
                    fs::rename(&source, &target)?;
                    info!(slug = %slug, category = %category.dir, "moved article");
                }
                report.moved.push(MovedArticle {
                    slug: slug.clone(),
                    category: category.dir.clone(),
                    to: target,
                });
            } else {
                warn!(slug = %slug, "article listed in plan not found");
                report.missing.push(slug.clone());
            }
        }
    }
    Ok(report)
}

/// Creates `{dir}/index.mdx` for every category that has articles but no
/// index page. Returns the paths written (or that would be written).
pub fn write_index_pages(
    section_dir: &Path,
    plan: &CategoryPlan,
    engine: &IndexPageEngine,
    mode: WriteMode,
) -> Result<Vec<PathBuf>, MdxkitError> {
    let mut written = Vec::new();
    for category in &plan.categories {
        let category_dir = section_dir.join(&category.dir);
        let index_path = category_dir.join(INDEX_FILE);
        if index_path.is_file() {
            continue;
        }

        let articles = category_articles(section_dir, category)?;
        if articles.is_empty() {
            continue;
        }

        let href = format!("/{}/{}", plan.section_ref(), category.dir);
        let context = IndexPageContext {
            title: category.name.clone(),
            description: category
                .description
                .clone()
                .unwrap_or_else(|| format!("{} guides and tutorials", category.name)),
            articles: articles
                .into_iter()
                .map(|(slug, title)| IndexArticle {
                    href: format!("{href}/{slug}"),
                    title,
                    slug,
                })
                .collect(),
            href,
        };
        let rendered = engine.render(&context)?;

        if mode == WriteMode::Write {
            write_atomic(&index_path, &rendered)?;
            info!(path = %index_path.display(), "wrote category index page");
        }
        written.push(index_path);
    }
    Ok(written)
}

/// `(slug, title)` pairs for a category, sorted by slug. Covers articles already
/// in the folder and planned articles still waiting in the section root.
fn category_articles(
    section_dir: &Path,
    category: &Category,
) -> Result<Vec<(String, String)>, MdxkitError> {
    let category_dir = section_dir.join(&category.dir);
    let mut sources = BTreeMap::new();

    for page in list_pages(section_dir, &category.dir, EXTENSION, true)? {
        let slug = page.rsplit('/').next().unwrap_or(&page).to_string();
        let path = category_dir.join(format!("{slug}.{EXTENSION}"));
        sources.insert(slug, path);
    }
    for slug in &category.articles {
        let pending = section_dir.join(format!("{slug}.{EXTENSION}"));
        if !sources.contains_key(slug) && pending.is_file() {
            sources.insert(slug.clone(), pending);
        }
    }

    Ok(sources
        .into_iter()
        .map(|(slug, path)| {
            let title = article_title(&path).unwrap_or_else(|| title_from_slug(&slug));
            (slug, title)
        })
        .collect())
}

fn article_title(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    Document::parse(&raw)
        .ok()?
        .front_matter
        .title
        .filter(|title| !title.trim().is_empty())
}

/// One navigation group per category with at least one article: the category
/// index (when present) followed by the articles in file-name order.
pub fn category_groups(
    content_root: &Path,
    plan: &CategoryPlan,
) -> Result<Vec<NavGroup>, MdxkitError> {
    let section_dir = plan.section_dir(content_root);
    let mut groups = Vec::new();
    for category in &plan.categories {
        let prefix = format!("{}/{}", plan.section_ref(), category.dir);
        let articles = list_pages(content_root, &prefix, EXTENSION, true)?;
        if articles.is_empty() {
            continue;
        }

        let mut pages = Vec::with_capacity(articles.len() + 1);
        if section_dir.join(&category.dir).join(INDEX_FILE).is_file() {
            pages.push(PageEntry::Ref(prefix));
        }
        pages.extend(articles.into_iter().map(PageEntry::Ref));
        groups.push(NavGroup::new(category.name.clone(), pages));
    }
    Ok(groups)
}

/// Drops the plan's legacy group, then replaces or appends each category group.
pub fn apply_category_groups(
    manifest: &mut NavigationManifest,
    plan: &CategoryPlan,
    groups: Vec<NavGroup>,
) -> Result<Vec<(String, GroupChange)>, MdxkitError> {
    if let Some(legacy) = &plan.legacy_group {
        if manifest.remove_group(&plan.language, legacy) {
            info!(group = %legacy, "removed legacy navigation group");
        }
    }

    let mut changes = Vec::with_capacity(groups.len());
    for group in groups {
        let change = manifest.replace_group(&plan.language, &group.group, group.pages)?;
        changes.push((group.group, change));
    }
    Ok(changes)
}
