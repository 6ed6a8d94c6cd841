use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::MdxkitError;
use crate::front_matter::{
    FrontMatter, is_valid_front_matter_key, remove_front_matter_field,
    repair_collapsed_front_matter, set_front_matter_field, split_front_matter,
};
use crate::normalize::Normalizer;
use crate::persistence::write_atomic;
use crate::substitution::RuleSet;

/// A whole-file rewrite applied by [`rewrite_file`] and the tree walker.
pub trait ContentTransform {
    fn transform(&self, path: &Path, content: &str) -> Result<String, MdxkitError>;
}

/// Converts the HTML body of a Document to Markdown, leaving its front matter untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlToMarkdown {
    normalizer: Normalizer,
    repair_front_matter: bool,
}

impl HtmlToMarkdown {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            repair_front_matter: false,
        }
    }

    /// Expand title-only front matter collapsed onto one line before splitting.
    pub fn repair_front_matter(mut self, enabled: bool) -> Self {
        self.repair_front_matter = enabled;
        self
    }
}

impl ContentTransform for HtmlToMarkdown {
    fn transform(&self, path: &Path, content: &str) -> Result<String, MdxkitError> {
        let repaired = if self.repair_front_matter {
            repair_collapsed_front_matter(content)
        } else {
            None
        };
        let source = repaired.as_deref().unwrap_or(content);

        let split = split_front_matter(source).map_err(|err| err.context(path.display()))?;
        let body = self.normalizer.normalize(split.body);
        if repaired.is_none() && body == split.body.trim_end_matches(['\n', '\r']) {
            return Ok(content.to_string());
        }
        Ok(split.with_body(&body))
    }
}

/// Applies an ordered [`RuleSet`] to the full file text, front matter included.
pub struct Rebrand {
    rules: RuleSet,
}

impl Rebrand {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl ContentTransform for Rebrand {
    fn transform(&self, path: &Path, content: &str) -> Result<String, MdxkitError> {
        let substitution = self.rules.apply(content);
        if substitution.changed() {
            debug!(path = %path.display(), rules = ?substitution.applied, "substitution rules applied");
        }
        Ok(substitution.text)
    }
}

/// Sets or removes one top-level front matter key. Other YAML lines, the
/// markers and the body are left byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrontMatterEdit {
    Set { key: String, value: String },
    Unset { key: String },
}

impl FrontMatterEdit {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Result<Self, MdxkitError> {
        let key = checked_key(key.into())?;
        Ok(Self::Set {
            key,
            value: value.into(),
        })
    }

    pub fn unset(key: impl Into<String>) -> Result<Self, MdxkitError> {
        Ok(Self::Unset {
            key: checked_key(key.into())?,
        })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Unset { key } => key,
        }
    }
}

fn checked_key(key: String) -> Result<String, MdxkitError> {
    if is_valid_front_matter_key(&key) {
        Ok(key)
    } else {
        Err(MdxkitError::MalformedFrontMatter(format!(
            "`{key}` is not a valid front matter key"
        )))
    }
}

impl ContentTransform for FrontMatterEdit {
    fn transform(&self, path: &Path, content: &str) -> Result<String, MdxkitError> {
        let split = split_front_matter(content).map_err(|err| err.context(path.display()))?;
        FrontMatter::from_yaml_str(split.yaml).map_err(|err| err.context(path.display()))?;

        let yaml = match self {
            Self::Set { key, value } => set_front_matter_field(split.yaml, key, value),
            Self::Unset { key } => match remove_front_matter_field(split.yaml, key) {
                Some(yaml) => yaml,
                None => return Ok(content.to_string()),
            },
        };
        if yaml == split.yaml {
            return Ok(content.to_string());
        }
        Ok(split.with_yaml(&yaml))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Write,
    /// Report what would change without touching the file.
    DryRun,
}

/// Rewrites one file in place. Returns whether the content changed.
pub fn rewrite_file(
    path: &Path,
    transform: &dyn ContentTransform,
    mode: WriteMode,
) -> Result<bool, MdxkitError> {
    let content = fs::read_to_string(path)?;
    let updated = transform.transform(path, &content)?;
    if updated == content {
        return Ok(false);
    }

    match mode {
        WriteMode::Write => {
            write_atomic(path, &updated)?;
            info!(path = %path.display(), "rewrote file");
        }
        WriteMode::DryRun => info!(path = %path.display(), "would rewrite file"),
    }
    Ok(true)
}
