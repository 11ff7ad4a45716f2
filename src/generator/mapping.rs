//! WCAG mapping generation.
//!
//! `wcag-mapping.json` lists every published rule with the success criteria
//! and techniques it covers:
//!
//! ```json
//! {
//!   "act-rules": [
//!     {
//!       "id": "23a2a8",
//!       "title": "Image has non-empty accessible name",
//!       "permalink": "/standards-guidelines/act/rules/image-non-empty-accessible-name-23a2a8/",
//!       "successCriteria": ["1.1.1"],
//!       "wcagTechniques": ["H37"],
//!       "proposed": false
//!     }
//!   ]
//! }
//! ```
//!
//! Several runs write into the same file, each with a subset of the rules.
//! A run replaces the entries of its own rules and leaves every other entry,
//! and every other top-level key, exactly as it found them.

use crate::{
    document::RuleDocument,
    error::RuleError,
    rule::title::strip_markup,
    utils::paths::rule_permalink,
    vocab::{sc_number, technique_id},
};
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fs, io::ErrorKind, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// Top-level key holding the rule entries.
pub const MAPPING_KEY: &str = "act-rules";

/// File name of the mapping inside the output directory.
pub const MAPPING_FILE: &str = "wcag-mapping.json";

// ============================================================================
// Entries
// ============================================================================

/// Mapping entry of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub id: String,
    pub title: String,
    pub permalink: String,
    pub success_criteria: Vec<String>,
    pub wcag_techniques: Vec<String>,
    pub proposed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl MappingEntry {
    pub fn from_rule(rule: &RuleDocument, proposed: bool) -> Self {
        let codes = rule.frontmatter.accessibility_requirements.keys();
        Self {
            id: rule.id().to_owned(),
            title: strip_markup(rule.name()),
            permalink: rule_permalink(rule.stem(), proposed),
            success_criteria: codes
                .clone()
                .filter_map(|code| sc_number(code))
                .map(str::to_owned)
                .collect(),
            wcag_techniques: codes
                .filter_map(|code| technique_id(code))
                .map(str::to_owned)
                .collect(),
            proposed,
            deprecated: rule.frontmatter.is_deprecated(),
        }
    }

    fn key(&self) -> (&str, bool) {
        (self.id.as_str(), self.proposed)
    }
}

/// Merge key of an entry already in the file.
///
/// Entries written before the `proposed` flag existed count as stable.
fn value_key(entry: &Value) -> (&str, bool) {
    let id = entry.get("id").and_then(Value::as_str).unwrap_or_default();
    let proposed = entry
        .get("proposed")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    (id, proposed)
}

// ============================================================================
// Aggregate mapping
// ============================================================================

/// The whole mapping file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateMapping {
    root: Map<String, Value>,
}

impl AggregateMapping {
    /// Parse a mapping. Blank text is an empty mapping.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str(text).context("Invalid mapping JSON")? {
            Value::Object(root) => Ok(Self { root }),
            _ => bail!("mapping must be a JSON object"),
        }
    }

    /// Read the mapping at `path`. A missing file is an empty mapping.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                Self::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Entries under [`MAPPING_KEY`].
    pub fn entries(&self) -> &[Value] {
        self.root
            .get(MAPPING_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace the entries of the rules in `current` and keep all others.
    ///
    /// Entries are matched on `(id, proposed)`. The result is sorted by id,
    /// stable entries before proposed ones, regardless of input order.
    pub fn merge(mut self, current: Vec<MappingEntry>) -> Result<Self, RuleError> {
        let mut replaced = FxHashSet::default();
        for entry in &current {
            if !replaced.insert(entry.key()) {
                return Err(RuleError::DuplicateRule {
                    rule_id: entry.id.clone(),
                });
            }
        }

        let existing = match self.root.get_mut(MAPPING_KEY) {
            Some(Value::Array(entries)) => std::mem::take(entries),
            _ => Vec::new(),
        };

        let mut entries: Vec<Value> = existing
            .into_iter()
            .filter(|entry| !replaced.contains(&value_key(entry)))
            .collect();
        for entry in &current {
            entries.push(serde_json::to_value(entry)?);
        }
        entries.sort_by(|a, b| value_key(a).cmp(&value_key(b)));

        // An existing key keeps its position among the top-level keys.
        self.root.insert(MAPPING_KEY.to_owned(), Value::Array(entries));
        Ok(self)
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root).context("Failed to serialize mapping")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write mapping to {}", path.display()))
    }
}

// ============================================================================
// Tests
// ============================================================================
