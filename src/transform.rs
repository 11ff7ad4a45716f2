//! The `transform` command.
//!
//! Turns rule documents into published pages:
//!
//! ```text
//! {out}/content/rules/{id}/index.md      (or proposed.md)
//! {out}/_data/matrix/{stable|proposed}/{id}.json
//! {out}/wcag-mapping.json
//! ```
//!
//! Rules are processed one at a time. A rule that fails validation is
//! reported and skipped; the run goes on and fails at the end.

use crate::{
    config::ToolConfig,
    document::{
        RuleDocument,
        loader::{load_glossary, load_rules},
    },
    error::RuleError,
    generator::{
        mapping::{AggregateMapping, MAPPING_FILE, MappingEntry},
        matrix::{MatrixWriter, RequirementMatrix},
    },
    log,
    rule::{ComposeOptions, Composer},
    utils::{
        date::Date,
        gate::{WriteStatus, write_if_changed},
        paths::rule_output_path,
    },
    vocab::Vocabulary,
};
use anyhow::{Result, bail};
use rustc_hash::{FxHashMap, FxHashSet};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Run the `transform` command.
pub fn transform_rules(config: &ToolConfig) -> Result<TransformSummary> {
    let summary = transform_with(config, &RequirementMatrix)?;
    log!(
        "transform";
        "{} written, {} unchanged, {} failed",
        summary.written,
        summary.skipped,
        summary.failed
    );
    if summary.failed > 0 {
        bail!("{} rule(s) failed validation", summary.failed);
    }
    Ok(summary)
}

/// Run the `transform` command with a custom matrix writer.
pub fn transform_with(config: &ToolConfig, matrix: &dyn MatrixWriter) -> Result<TransformSummary> {
    let opts = &config.transform;
    let mut summary = TransformSummary::default();

    let rules = accept_rules(load_rules(&opts.rules_dir, &opts.rule_ids)?, &mut summary);
    let glossary = load_glossary(&opts.glossary_dir)?;

    let compose_options = ComposeOptions {
        proposed: opts.proposed,
        no_example_links: opts.no_example_links,
        testcase_url: opts.testcase_url.clone(),
        date: opts.date.unwrap_or_else(Date::today),
    };
    let composer = Composer::new(Vocabulary::builtin(), &glossary, &rules, compose_options);

    let mut entries = Vec::with_capacity(rules.len());
    for rule in &rules {
        let page = match composer.compose(rule) {
            Ok(page) => page,
            Err(err) => {
                report(&err);
                summary.failed += 1;
                continue;
            }
        };

        let path = rule_output_path(&opts.out_dir, rule.id(), opts.proposed);
        match write_if_changed(&path, &page.text())? {
            WriteStatus::Written => {
                log!("write"; "{}", path.display());
                summary.written += 1;
            }
            WriteStatus::Unchanged => {
                log!("skip"; "{} (no changes)", path.display());
                summary.skipped += 1;
            }
        }

        if opts.matrix {
            matrix.write_matrix(&opts.out_dir, rule, opts.proposed)?;
        }
        entries.push(MappingEntry::from_rule(rule, opts.proposed));
    }

    let mapping_path = opts.out_dir.join(MAPPING_FILE);
    let mapping = AggregateMapping::load(&mapping_path)?.merge(entries)?;
    mapping.write(&mapping_path)?;
    log!("mapping"; "{} ({} rules)", mapping_path.display(), mapping.entries().len());

    Ok(summary)
}

/// Keep the rules that parsed and whose id no other document shares.
///
/// Every document of a duplicated id is rejected, so the published page
/// never depends on file order.
fn accept_rules(
    loaded: Vec<Result<RuleDocument, RuleError>>,
    summary: &mut TransformSummary,
) -> Vec<RuleDocument> {
    let mut parsed = Vec::with_capacity(loaded.len());
    for rule in loaded {
        match rule {
            Ok(rule) => parsed.push(rule),
            Err(err) => {
                report(&err);
                summary.failed += 1;
            }
        }
    }

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for rule in &parsed {
        *counts.entry(rule.id()).or_default() += 1;
    }
    let duplicated: FxHashSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_owned())
        .collect();

    parsed
        .into_iter()
        .filter(|rule| {
            if !duplicated.contains(rule.id()) {
                return true;
            }
            report(&RuleError::DuplicateRule {
                rule_id: rule.id().to_owned(),
            });
            summary.failed += 1;
            false
        })
        .collect()
}

fn report(err: &RuleError) {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    let module = if err.is_validation() { "invalid" } else { "error" };
    log!(module; "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, fs, path::Path};
    use tempfile::TempDir;

    const RULE_A: &str = "---\nid: abc123\nname: Image has *name*\nrule_type: atomic\ndescription: Checks images.\ninput_aspects:\n  - DOM Tree\naccessibility_requirements:\n  wcag20:1.1.1:\n    forConformance: true\n    failed: not satisfied\n    passed: further testing needed\n    inapplicable: further testing needed\nacknowledgments:\n  authors:\n    - Billy Jean\n---\n\n## Applicability\n\nAny [visible](#visible) image. See [b](/rules/xyz789/).\n\n## Test Cases\n\n#### Passed Example 1\n\n```html\n<img alt=\"x\" src=\"a.png\" />\n```\n";

    const RULE_B: &str = "---\nid: xyz789\nname: Button has name\nrule_type: atomic\ndescription: Checks buttons.\ninput_aspects:\n  - Accessibility Tree\naccessibility_requirements:\n  wcag20:4.1.2:\n    forConformance: true\n---\n\nBody.\n";

    const BROKEN: &str = "---\nid: bad000\nname: Broken\nrule_type: atomic\ndescription: d\ninput_aspects:\n  - Smell\n---\n\nBody.\n";

    const TERM: &str = "---\ntitle: Visible\nkey: visible\n---\n\nPerceivable by sight.\n";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let rules = dir.path().join("rules");
            let glossary = dir.path().join("glossary");
            fs::create_dir_all(&rules).unwrap();
            fs::create_dir_all(&glossary).unwrap();
            fs::write(rules.join("image-name-abc123.md"), RULE_A).unwrap();
            fs::write(rules.join("button-name-xyz789.md"), RULE_B).unwrap();
            fs::write(glossary.join("visible.md"), TERM).unwrap();
            Self { dir }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn config(&self, date: Date) -> ToolConfig {
            let mut config = ToolConfig::default();
            config.transform.rules_dir = self.path().join("rules");
            config.transform.glossary_dir = self.path().join("glossary");
            config.transform.out_dir = self.path().join("out");
            config.transform.date = Some(date);
            config
        }

        fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.path().join("out").join(relative)).unwrap()
        }
    }

    #[test]
    fn test_transform_writes_pages_matrix_and_mapping() {
        let fixture = Fixture::new();
        let summary = transform_rules(&fixture.config(Date::new(2025, 3, 7))).unwrap();
        assert_eq!(
            summary,
            TransformSummary {
                written: 2,
                skipped: 0,
                failed: 0
            }
        );

        let page = fixture.read("content/rules/abc123/index.md");
        assert!(page.starts_with("---\ntitle: Image has name\n"));
        assert!(page.contains("last_modified: 7 March 2025"));
        assert!(page.contains("Any [visible](#visible) image."));
        assert!(page.contains("[b](/standards-guidelines/act/rules/button-name-xyz789/)"));
        assert!(page.contains("### Visible {#visible}"));
        assert!(page.contains("testcases/abc123/passed-example-1.html"));
        assert!(page.contains("<p><strong>Authors:</strong> Billy Jean."));

        assert!(fixture.path().join("out/_data/matrix/stable/abc123.json").exists());

        let mapping: serde_json::Value =
            serde_json::from_str(&fixture.read(MAPPING_FILE)).unwrap();
        let ids: Vec<_> = mapping["act-rules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["abc123", "xyz789"]);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let fixture = Fixture::new();
        transform_rules(&fixture.config(Date::new(2025, 3, 7))).unwrap();
        let page = fixture.read("content/rules/abc123/index.md");
        let mapping = fixture.read(MAPPING_FILE);

        let summary = transform_rules(&fixture.config(Date::new(2025, 4, 1))).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(fixture.read("content/rules/abc123/index.md"), page);
        assert_eq!(fixture.read(MAPPING_FILE), mapping);
    }

    #[test]
    fn test_subset_run_keeps_other_entries() {
        let fixture = Fixture::new();
        transform_rules(&fixture.config(Date::new(2025, 3, 7))).unwrap();
        let before: serde_json::Value =
            serde_json::from_str(&fixture.read(MAPPING_FILE)).unwrap();

        let mut config = fixture.config(Date::new(2025, 3, 7));
        config.transform.rule_ids = vec!["abc123".into()];
        config.transform.proposed = true;
        transform_rules(&config).unwrap();

        assert!(fixture.path().join("out/content/rules/abc123/proposed.md").exists());
        let after: serde_json::Value = serde_json::from_str(&fixture.read(MAPPING_FILE)).unwrap();
        let entries = after["act-rules"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], before["act-rules"][0]);
        assert_eq!(entries[1]["proposed"], true);
        assert_eq!(entries[2], before["act-rules"][1]);
    }

    #[test]
    fn test_failed_rule_does_not_stop_the_run() {
        let fixture = Fixture::new();
        fs::write(fixture.path().join("rules/broken-bad000.md"), BROKEN).unwrap();

        let config = fixture.config(Date::new(2025, 3, 7));
        let summary = transform_with(&config, &RequirementMatrix).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 2);
        assert!(!fixture.path().join("out/content/rules/bad000").exists());

        assert!(transform_rules(&config).is_err());
    }

    #[test]
    fn test_duplicate_rule_ids_fail() {
        let fixture = Fixture::new();
        fs::write(fixture.path().join("rules/copy-abc123.md"), RULE_A).unwrap();
        let summary = transform_with(&fixture.config(Date::new(2025, 3, 7)), &RequirementMatrix)
            .unwrap();
        // Neither copy is published.
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.written, 1);
        assert!(!fixture.path().join("out/content/rules/abc123").exists());

        let mapping: serde_json::Value =
            serde_json::from_str(&fixture.read(MAPPING_FILE)).unwrap();
        assert_eq!(mapping["act-rules"].as_array().unwrap().len(), 1);
        assert_eq!(mapping["act-rules"][0]["id"], "xyz789");
    }

    #[derive(Default)]
    struct RecordingMatrix {
        calls: RefCell<Vec<(String, bool)>>,
    }

    impl MatrixWriter for RecordingMatrix {
        fn write_matrix(&self, _: &Path, rule: &RuleDocument, proposed: bool) -> Result<()> {
            self.calls.borrow_mut().push((rule.id().to_owned(), proposed));
            Ok(())
        }
    }

    #[test]
    fn test_matrix_toggle() {
        let fixture = Fixture::new();
        let mut config = fixture.config(Date::new(2025, 3, 7));

        let matrix = RecordingMatrix::default();
        transform_with(&config, &matrix).unwrap();
        assert_eq!(
            matrix.calls.borrow().as_slice(),
            &[("xyz789".to_owned(), false), ("abc123".to_owned(), false)]
        );

        config.transform.matrix = false;
        let matrix = RecordingMatrix::default();
        transform_with(&config, &matrix).unwrap();
        assert!(matrix.calls.borrow().is_empty());
    }
}
