//! `[examples]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[examples]` section in act-tools.toml - test case extraction.
///
/// # Example
/// ```toml
/// [examples]
/// rules_dir = "_rules"
/// out_dir = "public"
/// base_url = "https://act-rules.github.io"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ExamplesConfig {
    #[serde(default = "defaults::current_dir")]
    #[educe(Default = defaults::current_dir())]
    pub rules_dir: PathBuf,

    #[serde(default = "defaults::current_dir")]
    #[educe(Default = defaults::current_dir())]
    pub out_dir: PathBuf,

    /// Site the test cases are published on.
    #[serde(default = "defaults::examples::base_url")]
    #[educe(Default = defaults::examples::base_url())]
    pub base_url: String,

    #[serde(default)]
    pub rule_ids: Vec<String>,
}
