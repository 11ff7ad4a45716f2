//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::utils::date::Date;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Publish ACT rules: rule pages, the WCAG mapping and test cases
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file (default: act-tools.toml, when present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments of the `transform` command
#[derive(clap::Args, Debug, Clone)]
pub struct TransformArgs {
    /// Directory of rule documents
    #[arg(short, long)]
    pub rules_dir: Option<PathBuf>,

    /// Directory of glossary definitions
    #[arg(short, long)]
    pub glossary_dir: Option<PathBuf>,

    /// Root directory of the published site
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Only transform the rule with this id (repeatable)
    #[arg(long = "rule-id", value_name = "ID")]
    pub rule_ids: Vec<String>,

    /// Publish as proposed rules
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub proposed: Option<bool>,

    /// Leave out links to hosted test cases after each example
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub no_example_links: Option<bool>,

    /// Regenerate requirement matrix files
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub matrix: Option<bool>,

    /// Generation date written into pages (YYYY-MM-DD), today by default.
    ///
    /// Useful for reproducible output, e.g. when regenerating a release.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
}

/// Arguments of the `examples` command
#[derive(clap::Args, Debug, Clone)]
pub struct ExamplesArgs {
    /// Directory of rule documents
    #[arg(short, long)]
    pub rules_dir: Option<PathBuf>,

    /// Directory the test cases are written to
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Site the test cases are published on
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Only extract from the rule with this id (repeatable)
    #[arg(long = "rule-id", value_name = "ID")]
    pub rule_ids: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Transform rule documents into pages and update wcag-mapping.json
    Transform {
        #[command(flatten)]
        args: TransformArgs,
    },

    /// Extract the test cases of rule documents into files
    Examples {
        #[command(flatten)]
        args: ExamplesArgs,
    },
}

fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse_ymd(s).ok_or_else(|| format!("`{s}` is not a valid YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transform() {
        let cli = Cli::parse_from([
            "act-tools",
            "transform",
            "-r",
            "_rules",
            "--no-example-links",
            "--rule-id",
            "abc123",
        ]);
        let Commands::Transform { args } = cli.command else {
            panic!("expected transform");
        };
        assert_eq!(args.rules_dir, Some(PathBuf::from("_rules")));
        assert_eq!(args.no_example_links, Some(true));
        assert_eq!(args.proposed, None);
        assert_eq!(args.rule_ids, vec!["abc123"]);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["act-tools", "examples", "-C", "other.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-07"), Ok(Date::new(2025, 3, 7)));
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("7 March 2025").is_err());
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Cli::try_parse_from(["act-tools", "transform", "--date", "tomorrow"]).is_err());
    }
}
