pub mod categories;
pub mod error;
pub mod front_matter;
pub mod import;
pub mod manifest;
pub mod normalize;
pub mod persistence;
pub mod residual;
pub mod rewrite;
pub mod substitution;
pub mod template;
pub mod walker;
pub mod workspace;

pub use categories::{
    Category, CategoryPlan, MoveReport, MovedArticle, apply_category_groups, category_groups,
    move_articles, write_index_pages,
};
pub use error::MdxkitError;
pub use front_matter::{
    Document, FrontMatter, FrontMatterSplit, compose, is_valid_front_matter_key,
    remove_front_matter_field, render_front_matter, repair_collapsed_front_matter,
    set_front_matter_field, split_front_matter,
};
pub use import::{
    ArticleRecord, ImportBatch, ImportOptions, ImportedDocument, import_articles, normalize_slug,
    title_from_slug,
};
pub use manifest::{GroupChange, NavGroup, NavigationManifest, PageEntry, PruneReport, list_pages};
pub use normalize::{NormalizeOptions, Normalizer, normalize_html};
pub use persistence::{write_atomic, write_atomic_json};
pub use residual::{ResidualReport, check_tree, find_residual_html};
pub use rewrite::{
    ContentTransform, FrontMatterEdit, HtmlToMarkdown, Rebrand, WriteMode, rewrite_file,
};
pub use substitution::{RuleSet, Substitution, SubstitutionRule};
pub use template::{IndexArticle, IndexPageContext, IndexPageEngine};
pub use walker::{ContentWalker, DEFAULT_EXCLUSIONS, SkippedFile, WalkReport};
pub use workspace::{DocsWorkspace, MANIFEST_FILE, discover as discover_workspace};
