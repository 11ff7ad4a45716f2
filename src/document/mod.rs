//! Rule and glossary documents.
//!
//! A document on disk is a YAML frontmatter block followed by a markdown
//! body. [`loader`] reads them; this module holds the typed model.

pub mod loader;
pub mod tree;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub use tree::{Block, DocumentTree};

/// Requirement code (`wcag21:2.1.4`) → how the rule maps onto it, in
/// source order.
pub type Requirements = IndexMap<String, Option<RequirementMeta>>;

/// Outcome of a requirement when a rule has a given outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementOutcome {
    #[serde(rename = "satisfied")]
    Satisfied,
    #[serde(rename = "not satisfied")]
    NotSatisfied,
    #[serde(rename = "further testing needed")]
    FurtherTestingNeeded,
}

/// How a rule relates to one accessibility requirement.
///
/// Copied verbatim into published pages, never computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementMeta {
    #[serde(rename = "forConformance")]
    pub for_conformance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<RequirementOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<RequirementOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inapplicable: Option<RequirementOutcome>,
    /// Keys this model does not know about, kept as written.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Atomic,
    Composite,
}

/// People, funding and assets credited in a rule's footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgments {
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_authors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub funding: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assets: Vec<String>,
}

/// Frontmatter of a rule document.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFrontmatter {
    pub id: String,
    pub name: String,
    pub rule_type: RuleType,
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_aspects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accessibility_requirements: Requirements,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acknowledgments: Acknowledgments,
    /// Either `true` or a deprecation notice.
    #[serde(default)]
    pub deprecated: Option<serde_yaml::Value>,
}

impl RuleFrontmatter {
    pub fn is_deprecated(&self) -> bool {
        match &self.deprecated {
            Some(serde_yaml::Value::Bool(flag)) => *flag,
            Some(serde_yaml::Value::String(notice)) => !notice.trim().is_empty(),
            _ => false,
        }
    }
}

/// A parsed rule document.
#[derive(Debug, Clone)]
pub struct RuleDocument {
    pub frontmatter: RuleFrontmatter,
    /// File name relative to the rules directory, e.g. `image-alt-23a2a8.md`.
    pub filename: String,
    /// Markdown body, frontmatter removed.
    pub body: String,
    pub tree: DocumentTree,
}

impl RuleDocument {
    pub fn id(&self) -> &str {
        &self.frontmatter.id
    }

    pub fn name(&self) -> &str {
        &self.frontmatter.name
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryFrontmatter {
    pub title: String,
    pub key: String,
}

/// One glossary definition.
#[derive(Debug, Clone)]
pub struct GlossaryEntry {
    pub key: String,
    pub title: String,
    pub body: String,
    pub tree: DocumentTree,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONTMATTER: &str = r#"
id: abc123
name: Image has accessible name
rule_type: atomic
description: |
  This rule checks images.
input_aspects:
  - DOM Tree
accessibility_requirements:
  wcag20:1.1.1: # Non-text Content (A)
    forConformance: true
    failed: not satisfied
    passed: further testing needed
    inapplicable: further testing needed
  wcag-technique:H37:
    forConformance: false
    failed: not satisfied
    passed: further testing needed
    inapplicable: further testing needed
    secondary: true
acknowledgments:
  authors:
    - Anne Thyme Nørregaard
  previous_authors:
"#;

    #[test]
    fn test_rule_frontmatter_parses() {
        let fm: RuleFrontmatter = serde_yaml::from_str(FRONTMATTER).unwrap();

        assert_eq!(fm.id, "abc123");
        assert_eq!(fm.rule_type, RuleType::Atomic);
        assert_eq!(fm.input_aspects, vec!["DOM Tree"]);
        assert_eq!(fm.acknowledgments.authors, vec!["Anne Thyme Nørregaard"]);
        assert!(fm.acknowledgments.previous_authors.is_empty());
        assert!(!fm.is_deprecated());
    }

    #[test]
    fn test_requirements_keep_source_order_and_extra_keys() {
        let fm: RuleFrontmatter = serde_yaml::from_str(FRONTMATTER).unwrap();
        let keys: Vec<_> = fm.accessibility_requirements.keys().collect();
        assert_eq!(keys, vec!["wcag20:1.1.1", "wcag-technique:H37"]);

        let technique = fm.accessibility_requirements["wcag-technique:H37"]
            .as_ref()
            .unwrap();
        assert_eq!(technique.failed, Some(RequirementOutcome::NotSatisfied));
        assert_eq!(
            technique.extra.get("secondary"),
            Some(&serde_yaml::Value::Bool(true))
        );

        let yaml = serde_yaml::to_string(&fm.accessibility_requirements).unwrap();
        assert!(yaml.contains("secondary: true"));
        assert!(yaml.contains("forConformance: false"));
    }

    #[test]
    fn test_unknown_outcome_is_rejected() {
        let yaml = "forConformance: true\nfailed: broken\n";
        assert!(serde_yaml::from_str::<RequirementMeta>(yaml).is_err());
    }

    #[test]
    fn test_null_sections_default() {
        let yaml = "id: x\nname: n\nrule_type: composite\ndescription: d\naccessibility_requirements:\nacknowledgments:\n";
        let fm: RuleFrontmatter = serde_yaml::from_str(yaml).unwrap();
        assert!(fm.accessibility_requirements.is_empty());
        assert_eq!(fm.acknowledgments, Acknowledgments::default());
    }

    #[test]
    fn test_deprecated_flag_or_notice() {
        let base = "id: x\nname: n\nrule_type: atomic\ndescription: d\n";
        let flagged: RuleFrontmatter =
            serde_yaml::from_str(&format!("{base}deprecated: true\n")).unwrap();
        assert!(flagged.is_deprecated());

        let notice: RuleFrontmatter =
            serde_yaml::from_str(&format!("{base}deprecated: Replaced by abc123.\n")).unwrap();
        assert!(notice.is_deprecated());
    }
}
