//! Change-aware writes.
//!
//! Every run stamps pages with the generation date, in the frontmatter's
//! `rule_meta.last_modified` field and in the footer's `Date:` line.
//! Rewriting a page whose only difference is that date would churn version
//! control, so those two fields are masked out before comparing old and new
//! content. The date appearing anywhere else is ordinary content.

use crate::{
    document::loader::{FRONTMATTER_DELIMITER, split_frontmatter},
    rule::footer::date_paragraph,
    utils::date::Date,
};
use anyhow::{Context, Result};
use std::{fs, io::ErrorKind, path::Path};

/// Placeholder that replaces the generation date before comparing.
const DATE_MASK: &str = "\u{0}last_modified\u{0}";

const LAST_MODIFIED_KEY: &str = "last_modified:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// Whether `new` must be written over `existing`.
///
/// Missing prior content is always written. Otherwise the documents are
/// compared byte for byte after masking each one's generated date fields.
pub fn should_write(existing: Option<&str>, new: &str) -> bool {
    match existing {
        None => true,
        Some(existing) => mask_date(existing) != mask_date(new),
    }
}

/// Generation date of a document, read through its frontmatter.
pub fn last_modified(document: &str) -> Option<String> {
    let (yaml, _) = split_frontmatter(document)?;
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    value
        .get("rule_meta")?
        .get("last_modified")?
        .as_str()
        .map(str::to_owned)
}

/// Mask the generated date fields of a document: the `last_modified` line
/// of the frontmatter and the footer's date paragraph. Documents without a
/// well-formed date are left as they are.
fn mask_date(document: &str) -> String {
    let Some(date) = last_modified(document).filter(|date| Date::parse_long(date).is_some())
    else {
        return document.to_owned();
    };
    let footer = date_paragraph(&date);

    let mut masked = String::with_capacity(document.len());
    // Lines up to and including the closing delimiter are frontmatter.
    let mut delimiters = 0;
    for line in document.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let eol = &line[content.len()..];
        let in_frontmatter = delimiters < 2;

        if in_frontmatter && content.trim_end() == FRONTMATTER_DELIMITER {
            delimiters += 1;
            masked.push_str(line);
        } else if in_frontmatter
            && let Some(value) = content.trim_start().strip_prefix(LAST_MODIFIED_KEY)
            && value.trim() == date
        {
            let indent = &content[..content.len() - content.trim_start().len()];
            masked.push_str(&format!("{indent}{LAST_MODIFIED_KEY} {DATE_MASK}{eol}"));
        } else if !in_frontmatter && content == footer {
            masked.push_str(&date_paragraph(DATE_MASK));
            masked.push_str(eol);
        } else {
            masked.push_str(line);
        }
    }
    masked
}

/// Write `content` to `path` unless the file already holds equivalent
/// content. Parent directories are created as needed.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteStatus> {
    let existing = match fs::read_to_string(path) {
        Ok(existing) => Some(existing),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    if !should_write(existing.as_deref(), content) {
        return Ok(WriteStatus::Unchanged);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(WriteStatus::Written)
}
