//! Test case files and their manifest.
//!
//! ```text
//! {out}/testcases/{ruleId}/{testcaseId}.{language}
//! {out}/testcases.json
//! ```

use crate::{
    rule::{TestCaseRecord, examples::TestCaseMeta},
    utils::gate::{WriteStatus, write_if_changed},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "testcases.json";

const MANIFEST_NAME: &str = "ACT Rules community test cases";
const MANIFEST_LICENSE: &str = "https://act-rules.github.io/pages/license/";
const MANIFEST_DESCRIPTION: &str = "Accessibility conformance testing rules for HTML";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'static str,
    website: &'a str,
    license: &'static str,
    description: &'static str,
    count: usize,
    testcases: Vec<&'a TestCaseMeta>,
}

/// Outcome of writing a set of test cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCaseSummary {
    pub written: usize,
    pub unchanged: usize,
}

/// Render the manifest of `records`, in the given order.
pub fn render_manifest(records: &[TestCaseRecord], website: &str) -> Result<String> {
    let manifest = Manifest {
        name: MANIFEST_NAME,
        website,
        license: MANIFEST_LICENSE,
        description: MANIFEST_DESCRIPTION,
        count: records.len(),
        testcases: records.iter().map(|r| &r.metadata).collect(),
    };
    serde_json::to_string_pretty(&manifest).context("Failed to serialize test case manifest")
}

/// Write every test case below `out_dir`, then the manifest.
pub fn write_test_cases(
    out_dir: &Path,
    records: &[TestCaseRecord],
    website: &str,
) -> Result<TestCaseSummary> {
    let mut summary = TestCaseSummary::default();
    for record in records {
        match write_if_changed(&out_dir.join(&record.relative_path), &record.code_snippet)? {
            WriteStatus::Written => summary.written += 1,
            WriteStatus::Unchanged => summary.unchanged += 1,
        }
    }

    write_if_changed(&out_dir.join(MANIFEST_FILE), &render_manifest(records, website)?)?;
    Ok(summary)
}
