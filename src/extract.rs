//! The `examples` command.
//!
//! Extracts the test cases of every rule into standalone files plus a
//! `testcases.json` manifest, in rule order and then document order.

use crate::{
    config::ToolConfig,
    document::loader::load_rules,
    generator::testcases::{MANIFEST_FILE, write_test_cases},
    log,
    rule::extract_test_cases,
};
use anyhow::{Result, bail};

/// Run the `examples` command. Returns the number of test cases.
pub fn build_examples(config: &ToolConfig) -> Result<usize> {
    let opts = &config.examples;
    let mut records = Vec::new();
    let mut failed = 0;

    for rule in load_rules(&opts.rules_dir, &opts.rule_ids)? {
        match rule.and_then(|rule| extract_test_cases(&rule, &opts.base_url)) {
            Ok(rule_records) => records.extend(rule_records),
            Err(err) => {
                log!("error"; "{err}");
                failed += 1;
            }
        }
    }

    let summary = write_test_cases(&opts.out_dir, &records, &opts.base_url)?;
    log!(
        "examples";
        "{} test cases, {} written, {} unchanged",
        records.len(),
        summary.written,
        summary.unchanged
    );
    log!("write"; "{}", opts.out_dir.join(MANIFEST_FILE).display());

    if failed > 0 {
        bail!("{failed} rule(s) failed validation");
    }
    Ok(records.len())
}
