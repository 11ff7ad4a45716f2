//! `[transform]` section configuration.
//!
//! Options of the `transform` command, which turns rule documents into
//! published pages.

use super::defaults;
use crate::utils::date::Date;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[transform]` section in act-tools.toml.
///
/// # Example
/// ```toml
/// [transform]
/// rules_dir = "act-rules/_rules"
/// glossary_dir = "act-rules/pages/glossary"
/// out_dir = "wcag-act-rules"
/// rule_ids = ["23a2a8", "b5c3f8"]
/// proposed = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Directory holding rule documents.
    #[serde(default = "defaults::current_dir")]
    #[educe(Default = defaults::current_dir())]
    pub rules_dir: PathBuf,

    /// Directory holding glossary definitions.
    #[serde(default = "defaults::current_dir")]
    #[educe(Default = defaults::current_dir())]
    pub glossary_dir: PathBuf,

    /// Root of the published site.
    #[serde(default = "defaults::current_dir")]
    #[educe(Default = defaults::current_dir())]
    pub out_dir: PathBuf,

    /// Only transform these rules. Empty means all.
    #[serde(default)]
    pub rule_ids: Vec<String>,

    /// Publish as proposed rules instead of stable ones.
    #[serde(default)]
    pub proposed: bool,

    /// Leave out the "Open in a new tab" links after examples.
    #[serde(default)]
    pub no_example_links: bool,

    /// Regenerate requirement matrix files.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub matrix: bool,

    /// Where the extracted test cases are hosted.
    #[serde(default = "defaults::transform::testcase_url")]
    #[educe(Default = defaults::transform::testcase_url())]
    pub testcase_url: String,

    /// Generation date. Today when unset.
    #[serde(skip)]
    pub date: Option<Date>,
}
