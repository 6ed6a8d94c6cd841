use std::fs;
use std::path::Path;

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::MdxkitError;

/// One find/replace pair. Literal unless `regex` is set.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl SubstitutionRule {
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            regex: false,
            case_insensitive: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<SubstitutionRule>,
}

struct CompiledRule {
    source: SubstitutionRule,
    matcher: Regex,
}

/// An ordered list of substitution rules. Each rule runs over the output of the one before it.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

/// Result of applying a [`RuleSet`] to some text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Indexes of the rules that matched at least once, in application order.
    pub applied: Vec<usize>,
}

impl Substitution {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

impl RuleSet {
    pub fn compile(rules: Vec<SubstitutionRule>) -> Result<Self, MdxkitError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (idx, rule) in rules.into_iter().enumerate() {
            if rule.from.is_empty() {
                return Err(MdxkitError::Rules(format!(
                    "rule {} has an empty `from` pattern",
                    idx + 1
                )));
            }
            let pattern = if rule.regex {
                rule.from.clone()
            } else {
                regex::escape(&rule.from)
            };
            let matcher = RegexBuilder::new(&pattern)
                .case_insensitive(rule.case_insensitive)
                .build()
                .map_err(|err| {
                    MdxkitError::Rules(format!("rule {} (`{}`): {err}", idx + 1, rule.from))
                })?;
            compiled.push(CompiledRule {
                source: rule,
                matcher,
            });
        }
        Ok(Self { rules: compiled })
    }

    /// Parses a YAML document with a top-level `rules:` list.
    pub fn from_yaml_str(raw: &str) -> Result<Self, MdxkitError> {
        let file: RuleFile =
            serde_yaml::from_str(raw).map_err(|err| MdxkitError::Rules(err.to_string()))?;
        Self::compile(file.rules)
    }

    pub fn load(path: &Path) -> Result<Self, MdxkitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw).map_err(|err| err.context(path.display()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter().map(|rule| &rule.source)
    }

    pub fn apply(&self, text: &str) -> Substitution {
        let mut current = text.to_string();
        let mut applied = Vec::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            if !rule.matcher.is_match(&current) {
                continue;
            }
            let replaced = if rule.source.regex {
                rule.matcher
                    .replace_all(&current, rule.source.to.as_str())
                    .into_owned()
            } else {
                rule.matcher
                    .replace_all(&current, NoExpand(&rule.source.to))
                    .into_owned()
            };
            if replaced != current {
                current = replaced;
                applied.push(idx);
            }
        }
        Substitution {
            text: current,
            applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_apply_in_declared_order() {
        let rules = RuleSet::compile(vec![
            SubstitutionRule::literal("Buffer", "Aitoearn"),
            SubstitutionRule::literal("Buffer Help Center", "Never Reached"),
        ])
        .unwrap();
        let out = rules.apply("Welcome to Buffer Help Center");
        assert_eq!(out.text, "Welcome to Aitoearn Help Center");
        assert_eq!(out.applied, vec![0]);

        let reversed = RuleSet::compile(vec![
            SubstitutionRule::literal("Buffer Help Center", "Support Hub"),
            SubstitutionRule::literal("Buffer", "Aitoearn"),
        ])
        .unwrap();
        assert_eq!(
            reversed.apply("Buffer Help Center by Buffer").text,
            "Support Hub by Aitoearn"
        );
    }

    #[test]
    fn literal_rules_escape_metacharacters() {
        let rules =
            RuleSet::compile(vec![SubstitutionRule::literal("buffer.com", "aitoearn.com")]).unwrap();
        let out = rules.apply("bufferxcom and buffer.com");
        assert_eq!(out.text, "bufferxcom and aitoearn.com");
    }

    #[test]
    fn literal_replacements_do_not_expand_captures() {
        let rules = RuleSet::compile(vec![SubstitutionRule::literal("price", "$1 off")]).unwrap();
        assert_eq!(rules.apply("price").text, "$1 off");
    }

    #[test]
    fn regex_rules_support_captures_and_case_folding() {
        let rules = RuleSet::compile(vec![SubstitutionRule {
            from: r"(\w+)\.buffer\.com".into(),
            to: "${1}.aitoearn.com".into(),
            regex: true,
            case_insensitive: true,
        }])
        .unwrap();
        assert_eq!(
            rules.apply("see Support.BUFFER.com").text,
            "see Support.aitoearn.com"
        );
    }

    #[test]
    fn unchanged_text_reports_no_rules() {
        let rules = RuleSet::compile(vec![SubstitutionRule::literal("x", "y")]).unwrap();
        let out = rules.apply("abc");
        assert!(!out.changed());
        assert_eq!(out.text, "abc");
    }

    #[test]
    fn identity_replacements_are_not_reported() {
        let rules = RuleSet::compile(vec![
            SubstitutionRule::literal("Aitoearn", "Aitoearn"),
            SubstitutionRule::literal("docs", "guides"),
        ])
        .unwrap();
        let out = rules.apply("Aitoearn docs");
        assert_eq!(out.text, "Aitoearn guides");
        assert_eq!(out.applied, vec![1]);

        let only_identity = rules.apply("Aitoearn");
        assert!(!only_identity.changed());
        assert_eq!(only_identity.text, "Aitoearn");
    }

    #[test]
    fn invalid_rules_are_rejected_up_front() {
        let err = RuleSet::compile(vec![SubstitutionRule {
            from: "(".into(),
            to: String::new(),
            regex: true,
            case_insensitive: false,
        }])
        .err()
        .expect("invalid regex");
        assert!(matches!(err, MdxkitError::Rules(_)));

        let err = RuleSet::compile(vec![SubstitutionRule::literal("", "x")])
            .err()
            .expect("empty pattern");
        assert!(matches!(err, MdxkitError::Rules(_)));
    }

    #[test]
    fn rules_load_from_yaml() {
        let rules = RuleSet::from_yaml_str(
            "rules:\n  - from: Mintlify\n    to: Aitoearn\n  - from: 'hi@(\\w+)\\.com'\n    to: 'hello@$1.com'\n    regex: true\n",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.apply("Mintlify: hi@mintlify.com").text,
            "Aitoearn: hello@mintlify.com"
        );
    }
}
