//! Per-rule validation errors.
//!
//! Each of these aborts processing of one rule only; a batch run reports
//! them and moves on to the next rule.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("`{path}` has no frontmatter block")]
    MissingFrontmatter { path: PathBuf },

    #[error("frontmatter of `{path}` is invalid")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("rule `{rule_id}` declares unknown input aspect `{aspect}`")]
    UnknownInputAspect { rule_id: String, aspect: String },

    #[error("rule `{rule_id}` has an example with unknown outcome `{keyword}`")]
    UnknownOutcome { rule_id: String, keyword: String },

    #[error("rule `{rule_id}` has more than one test case with id `{testcase_id}`")]
    DuplicateTestcase { rule_id: String, testcase_id: String },

    #[error("rule id `{rule_id}` appears more than once")]
    DuplicateRule { rule_id: String },

    #[error("failed to serialize frontmatter")]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to serialize mapping entry")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// Whether this error is a validation failure of one rule, as opposed to
    /// a problem reading the document at all.
    pub const fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::MissingFrontmatter { .. }
                | Self::Frontmatter { .. }
                | Self::Serialize(_)
                | Self::Json(_)
        )
    }
}
