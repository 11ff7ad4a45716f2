//! act-tools - publish ACT rules as WCAG pages, mappings and test cases.

mod cli;
mod config;
mod document;
mod error;
mod extract;
mod generator;
mod rule;
mod transform;
mod utils;
mod vocab;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::ToolConfig;
use extract::build_examples;
use transform::transform_rules;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ToolConfig::load(&cli)?;

    match &cli.command {
        Commands::Transform { .. } => transform_rules(&config).map(|_| ()),
        Commands::Examples { .. } => build_examples(&config).map(|_| ()),
    }
}
