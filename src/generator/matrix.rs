//! Requirement matrix files.
//!
//! Each processed rule gets a small JSON summary of the requirements it
//! maps to, kept apart for stable and proposed rules:
//!
//! ```text
//! {out}/_data/matrix/stable/23a2a8.json
//! {out}/_data/matrix/proposed/23a2a8.json
//! ```

use crate::{
    document::{Requirements, RuleDocument},
    log,
    utils::gate::{WriteStatus, write_if_changed},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Writes the matrix artifact of one rule.
pub trait MatrixWriter {
    fn write_matrix(&self, out_dir: &Path, rule: &RuleDocument, proposed: bool) -> Result<()>;
}

/// Default matrix: one JSON file per rule listing its requirements and
/// their outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementMatrix;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixFile<'a> {
    rule_id: &'a str,
    rule_name: &'a str,
    proposed: bool,
    requirements: &'a Requirements,
}

/// Location of a rule's matrix file.
pub fn matrix_path(out_dir: &Path, rule_id: &str, proposed: bool) -> PathBuf {
    let status = if proposed { "proposed" } else { "stable" };
    out_dir
        .join("_data")
        .join("matrix")
        .join(status)
        .join(format!("{rule_id}.json"))
}

impl RequirementMatrix {
    fn render(rule: &RuleDocument, proposed: bool) -> Result<String> {
        let file = MatrixFile {
            rule_id: rule.id(),
            rule_name: rule.name(),
            proposed,
            requirements: &rule.frontmatter.accessibility_requirements,
        };
        serde_json::to_string_pretty(&file)
            .with_context(|| format!("Failed to serialize matrix of {}", rule.id()))
    }
}

impl MatrixWriter for RequirementMatrix {
    fn write_matrix(&self, out_dir: &Path, rule: &RuleDocument, proposed: bool) -> Result<()> {
        let path = matrix_path(out_dir, rule.id(), proposed);
        let content = Self::render(rule, proposed)?;
        if write_if_changed(&path, &content)? == WriteStatus::Written {
            log!("matrix"; "{}", path.display());
        }
        Ok(())
    }
}
