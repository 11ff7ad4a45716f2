//! Tool configuration from `act-tools.toml` and the command line.
//!
//! # Sections
//!
//! | Section       | Purpose                                   |
//! |---------------|-------------------------------------------|
//! | `[transform]` | Rule pages, WCAG mapping, matrix files    |
//! | `[examples]`  | Test case extraction                      |
//!
//! The file is optional. Every value has a default, and command line
//! arguments override the file.
//!
//! # Example
//!
//! ```toml
//! [transform]
//! rules_dir = "act-rules/_rules"
//! glossary_dir = "act-rules/pages/glossary"
//! out_dir = "."
//! matrix = false
//!
//! [examples]
//! rules_dir = "act-rules/_rules"
//! out_dir = "content-assets/wcag-act-rules"
//! ```

pub mod defaults;
mod error;
mod examples;
mod transform;

pub use error::ConfigError;
pub use examples::ExamplesConfig;
pub use transform::TransformConfig;

use crate::cli::{Cli, Commands, ExamplesArgs, TransformArgs};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE: &str = "act-tools.toml";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing act-tools.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Path of the config file, when one was read
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub examples: ExamplesConfig,
}

impl ToolConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: ToolConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the config for a command line, apply its overrides and
    /// validate the result.
    ///
    /// An explicitly given config file must exist; the default one is
    /// optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) if !path.exists() => bail!(ConfigError::Io(
                path.clone(),
                io::Error::from(ErrorKind::NotFound)
            )),
            Some(path) => Self::from_path(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_path(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Transform { args } => self.update_transform(args),
            Commands::Examples { args } => self.update_examples(args),
        }
    }

    fn update_transform(&mut self, args: &TransformArgs) {
        let transform = &mut self.transform;
        Self::update_option(&mut transform.rules_dir, args.rules_dir.as_ref());
        Self::update_option(&mut transform.glossary_dir, args.glossary_dir.as_ref());
        Self::update_option(&mut transform.out_dir, args.out_dir.as_ref());
        Self::update_option(&mut transform.proposed, args.proposed.as_ref());
        Self::update_option(&mut transform.no_example_links, args.no_example_links.as_ref());
        Self::update_option(&mut transform.matrix, args.matrix.as_ref());
        if !args.rule_ids.is_empty() {
            transform.rule_ids = args.rule_ids.clone();
        }
        if args.date.is_some() {
            transform.date = args.date;
        }
    }

    fn update_examples(&mut self, args: &ExamplesArgs) {
        let examples = &mut self.examples;
        Self::update_option(&mut examples.rules_dir, args.rules_dir.as_ref());
        Self::update_option(&mut examples.out_dir, args.out_dir.as_ref());
        Self::update_option(&mut examples.base_url, args.base_url.as_ref());
        if !args.rule_ids.is_empty() {
            examples.rule_ids = args.rule_ids.clone();
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Self::check_url("[transform.testcase_url]", &self.transform.testcase_url)?;
        Self::check_url("[examples.base_url]", &self.examples.base_url)?;

        for (field, ids) in [
            ("[transform.rule_ids]", &self.transform.rule_ids),
            ("[examples.rule_ids]", &self.examples.rule_ids),
        ] {
            if ids.iter().any(|id| id.trim().is_empty()) {
                bail!(ConfigError::Validation(format!(
                    "{field} must not contain empty ids"
                )));
            }
        }

        Ok(())
    }

    fn check_url(field: &str, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!(ConfigError::Validation(format!(
                "{field} must start with http:// or https://"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
