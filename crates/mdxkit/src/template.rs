use std::fs;
use std::path::Path;

use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

use crate::error::MdxkitError;
use crate::front_matter::escape_yaml_string;

const INDEX_TEMPLATE: &str = "category-index";

/// Built-in category landing page. `quoted` renders a YAML double-quoted string.
pub const DEFAULT_INDEX_TEMPLATE: &str = r#"---
title: {{quoted title}}
description: {{quoted description}}
---

# {{title}}

{{description}}

## Articles in this category

{{#each articles}}
- [{{this.title}}]({{this.href}})
{{/each}}
"#;

handlebars_helper!(quoted: |value: str| format!("\"{}\"", escape_yaml_string(value)));

/// Tokens available to an index page template.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct IndexPageContext {
    pub title: String,
    pub description: String,
    /// Site-absolute link to the category, e.g. `/en/help-center/publishing`.
    pub href: String,
    pub articles: Vec<IndexArticle>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct IndexArticle {
    pub title: String,
    pub slug: String,
    pub href: String,
}

/// Renders category index pages. Output is Markdown, so nothing is HTML-escaped.
pub struct IndexPageEngine {
    registry: Handlebars<'static>,
}

impl IndexPageEngine {
    pub fn new() -> Result<Self, MdxkitError> {
        Self::with_template(DEFAULT_INDEX_TEMPLATE)
    }

    pub fn with_template(template: &str) -> Result<Self, MdxkitError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("quoted", Box::new(quoted));
        registry
            .register_template_string(INDEX_TEMPLATE, template)
            .map_err(|err| MdxkitError::Template(err.to_string()))?;
        Ok(Self { registry })
    }

    pub fn from_file(path: &Path) -> Result<Self, MdxkitError> {
        let raw = fs::read_to_string(path)?;
        Self::with_template(&raw).map_err(|err| err.context(path.display()))
    }

    pub fn render(&self, context: &IndexPageContext) -> Result<String, MdxkitError> {
        self.registry
            .render(INDEX_TEMPLATE, context)
            .map_err(|err| MdxkitError::Template(err.to_string()))
    }
}
