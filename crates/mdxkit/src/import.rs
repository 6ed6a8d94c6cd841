use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::MdxkitError;
use crate::front_matter::render_front_matter;
use crate::manifest::NavigationManifest;
use crate::normalize::Normalizer;
use crate::persistence::write_atomic;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_SECTION: &str = "help-center";
pub const DEFAULT_GROUP: &str = "Imported";
const UNTITLED: &str = "untitled";

/// A batch of crawler records: `{ "articles": [...] }`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ImportBatch {
    pub articles: Vec<ArticleRecord>,
}

impl ImportBatch {
    pub fn from_json_str(raw: &str) -> Result<Self, MdxkitError> {
        serde_json::from_str(raw)
            .map_err(|err| MdxkitError::Serialization(format!("invalid import batch: {err}")))
    }

    pub fn load(path: &Path) -> Result<Self, MdxkitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw).map_err(|err| err.context(path.display()))
    }
}

/// One article as exported by the crawler. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "bodyMDX")]
    pub body_mdx: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ImportOptions {
    pub section: String,
    /// Run bodies through the HTML normalizer before writing.
    pub normalize: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION.to_string(),
            normalize: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ImportedDocument {
    /// Path relative to the content root.
    pub path: PathBuf,
    pub page: String,
    pub language: String,
    pub group: String,
    /// `false` when the page was already listed in the group.
    pub added_to_navigation: bool,
}

/// Writes one Document per record under `content_root` and lists each page in
/// its navigation group. Later records with the same path overwrite earlier ones.
pub fn import_articles(
    content_root: &Path,
    batch: &ImportBatch,
    manifest: &mut NavigationManifest,
    options: &ImportOptions,
) -> Result<Vec<ImportedDocument>, MdxkitError> {
    let normalizer = Normalizer::new();
    let section = normalize_slug(&options.section);
    let section = if section.is_empty() {
        DEFAULT_SECTION.to_string()
    } else {
        section
    };

    let mut imported = Vec::with_capacity(batch.articles.len());
    for article in &batch.articles {
        let language = non_empty(article.language.as_deref())
            .map(normalize_slug)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let group = non_empty(article.group_name.as_deref())
            .unwrap_or(DEFAULT_GROUP)
            .to_string();

        let slug = article_slug(article);
        let title = non_empty(article.title.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| slug.clone());

        let mut page = format!("{language}/{section}");
        if let Some(category) = non_empty(article.category.as_deref())
            .map(normalize_slug)
            .filter(|category| !category.is_empty())
        {
            page.push('/');
            page.push_str(&category);
        }
        page.push('/');
        page.push_str(&slug);

        let body = article.body_mdx.as_deref().unwrap_or_default();
        let body = if options.normalize {
            normalizer.normalize(body)
        } else {
            body.to_string()
        };

        let relative = PathBuf::from(format!("{page}.mdx"));
        let document = render_document(&title, article.description.as_deref(), &body);
        write_atomic(&content_root.join(&relative), &document)?;
        info!(path = %relative.display(), "imported article");

        let added_to_navigation = manifest.add_page(&language, &group, &page)?;
        imported.push(ImportedDocument {
            path: relative,
            page,
            language,
            group,
            added_to_navigation,
        });
    }
    Ok(imported)
}

fn article_slug(article: &ArticleRecord) -> String {
    let source = non_empty(article.slug.as_deref())
        .or_else(|| non_empty(article.title.as_deref()))
        .unwrap_or(UNTITLED);
    let slug = normalize_slug(source);
    if slug.is_empty() {
        UNTITLED.to_string()
    } else {
        slug
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn render_document(title: &str, description: Option<&str>, body: &str) -> String {
    let mut fields = vec![("title", title)];
    if let Some(description) = non_empty(description) {
        fields.push(("description", description));
    }
    let mut out = render_front_matter(&fields);
    let body = body.trim_end();
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    out
}

/// Reduces arbitrary text to a path-safe slug: accents folded to ASCII,
/// lowercase, anything outside `[a-z0-9-_/]` replaced by `-`, repeated
/// separators collapsed, and `/` or `-` trimmed from both ends.
pub fn normalize_slug(text: &str) -> String {
    let folded: String = text
        .trim()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    for ch in folded.chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' | '_' | '/' => ch,
            _ => '-',
        };
        let repeated = matches!(mapped, '-' | '/') && slug.ends_with(mapped);
        if !repeated {
            slug.push(mapped);
        }
    }

    slug.trim_matches(['/', '-']).to_string()
}

/// Human-readable title for a slug: the last path segment with dashes turned
/// into spaces and each word capitalized.
pub fn title_from_slug(slug: &str) -> String {
    let last = slug.rsplit('/').next().unwrap_or(slug);
    last.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
