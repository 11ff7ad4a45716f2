//! Frontmatter of a published rule page.
//!
//! The page frontmatter is derived entirely from the rule's own
//! frontmatter, the vocabulary and the generation date. Field order is
//! fixed by the struct declarations below, which keeps the output stable
//! across runs.

use super::title::strip_markup;
use crate::{
    document::{Requirements, RuleDocument, RuleType},
    error::RuleError,
    utils::{
        date::Date,
        paths::{GITHUB_REPOSITORY, rule_permalink, source_path},
    },
    vocab::{Aspect, Criterion, Vocabulary},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PageFrontmatter<'a> {
    title: String,
    permalink: String,
    #[serde(rename = "ref")]
    reference: String,
    lang: &'static str,
    github: Github,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    proposed: bool,
    rule_meta: RuleMeta<'a>,
}

#[derive(Debug, Serialize)]
struct Github {
    repository: &'static str,
    path: String,
}

#[derive(Debug, Serialize)]
struct RuleMeta<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    rule_type: RuleType,
    scs_tested: Vec<&'a Criterion>,
    input_aspects: Vec<&'a Aspect>,
    last_modified: String,
    accessibility_requirements: &'a Requirements,
}

/// Success criteria tested by a rule, in requirement order.
///
/// Requirement codes that are not success criteria, or that the vocabulary
/// does not know, are left out.
pub fn scs_tested<'v>(requirements: &Requirements, vocab: &'v Vocabulary) -> Vec<&'v Criterion> {
    requirements
        .keys()
        .filter_map(|code| vocab.criterion(code))
        .collect()
}

/// Input aspects of a rule. Every aspect must be known.
pub fn input_aspects<'v>(
    rule: &RuleDocument,
    vocab: &'v Vocabulary,
) -> Result<Vec<&'v Aspect>, RuleError> {
    rule.frontmatter
        .input_aspects
        .iter()
        .map(|name| {
            vocab.aspect(name).ok_or_else(|| RuleError::UnknownInputAspect {
                rule_id: rule.id().to_owned(),
                aspect: name.clone(),
            })
        })
        .collect()
}

/// Render the frontmatter block of a rule page, `---` lines included.
pub fn build_frontmatter(
    rule: &RuleDocument,
    vocab: &Vocabulary,
    date: Date,
    proposed: bool,
) -> Result<String, RuleError> {
    let fm = &rule.frontmatter;
    let permalink = rule_permalink(rule.stem(), proposed);

    let page = PageFrontmatter {
        title: strip_markup(&fm.name),
        reference: permalink.clone(),
        permalink,
        lang: "en",
        github: Github {
            repository: GITHUB_REPOSITORY,
            path: source_path(&rule.filename),
        },
        proposed,
        rule_meta: RuleMeta {
            id: &fm.id,
            name: &fm.name,
            description: &fm.description,
            rule_type: fm.rule_type,
            scs_tested: scs_tested(&fm.accessibility_requirements, vocab),
            input_aspects: input_aspects(rule, vocab)?,
            last_modified: date.to_string(),
            accessibility_requirements: &fm.accessibility_requirements,
        },
    };

    let yaml = serde_yaml::to_string(&page)?;
    Ok(format!("---\n{yaml}---"))
}
