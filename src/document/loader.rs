//! Reading rule and glossary documents from disk.

use super::{
    DocumentTree, GlossaryEntry, GlossaryFrontmatter, RuleDocument, RuleFrontmatter,
};
use crate::error::RuleError;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

pub const FRONTMATTER_DELIMITER: &str = "---";

/// Split a document into its frontmatter and body.
///
/// The frontmatter must start on the first line with `---` and end at the
/// next line consisting of `---`. Blank lines directly after the closing
/// delimiter are not part of the body.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix(FRONTMATTER_DELIMITER)?
        .strip_prefix('\n')
        .or_else(|| text[FRONTMATTER_DELIMITER.len()..].strip_prefix("\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONTMATTER_DELIMITER {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the text of a rule document. `filename` is relative to the rules
/// directory.
pub fn parse_rule(path: &Path, filename: String, text: &str) -> Result<RuleDocument, RuleError> {
    let (yaml, body) = split_frontmatter(text).ok_or_else(|| RuleError::MissingFrontmatter {
        path: path.to_path_buf(),
    })?;
    let frontmatter: RuleFrontmatter =
        serde_yaml::from_str(yaml).map_err(|source| RuleError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(RuleDocument {
        frontmatter,
        filename,
        body: body.to_owned(),
        tree: DocumentTree::parse(body),
    })
}

pub fn parse_glossary(path: &Path, text: &str) -> Result<GlossaryEntry, RuleError> {
    let (yaml, body) = split_frontmatter(text).ok_or_else(|| RuleError::MissingFrontmatter {
        path: path.to_path_buf(),
    })?;
    let frontmatter: GlossaryFrontmatter =
        serde_yaml::from_str(yaml).map_err(|source| RuleError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(GlossaryEntry {
        key: frontmatter.key,
        title: frontmatter.title,
        body: body.to_owned(),
        tree: DocumentTree::parse(body),
    })
}

/// Collect all markdown files below `dir`, sorted by path.
pub fn collect_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}

/// Load every rule document in `dir`.
///
/// Reading a file is an I/O error for the whole run; a document that can
/// not be parsed is returned as a per-rule error. When `ids` is non-empty
/// only rules with those ids are returned, and unparsable documents are
/// dropped since their id is unknown.
pub fn load_rules(dir: &Path, ids: &[String]) -> Result<Vec<Result<RuleDocument, RuleError>>> {
    let mut rules = Vec::new();
    for path in collect_markdown_files(dir) {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read rule {}", path.display()))?;
        let filename = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        let rule = parse_rule(&path, filename, &text);
        let wanted = match &rule {
            Ok(rule) => ids.is_empty() || ids.iter().any(|id| id == rule.id()),
            Err(_) => ids.is_empty(),
        };
        if wanted {
            rules.push(rule);
        }
    }
    Ok(rules)
}

/// Load every glossary definition in `dir`.
///
/// The glossary is shared by all rules, so any broken definition fails the
/// whole run.
pub fn load_glossary(dir: &Path) -> Result<Vec<GlossaryEntry>> {
    collect_markdown_files(dir)
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read definition {}", path.display()))?;
            Ok(parse_glossary(&path, &text)?)
        })
        .collect()
}
