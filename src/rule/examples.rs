//! Test case extraction.
//!
//! Rules embed their test cases as headings followed by a fenced code
//! block:
//!
//! ````markdown
//! #### Passed Example 1
//!
//! This `img` has an accessible name.
//!
//! ```html
//! <img alt="W3C logo" src="/test-assets/shared/w3c-logo.png" />
//! ```
//! ````
//!
//! The heading keyword gives the expected outcome. An explicit id can be
//! given as `{#my-id}` at the end of the heading; otherwise the id is
//! `{expected}-example-{N}`.

use crate::{
    document::{Block, Requirements, RuleDocument, tree::Span},
    error::RuleError,
    utils::paths::{join_url, testcase_path},
};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::LazyLock;

static RE_EXAMPLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<keyword>[A-Za-z]+)\s+[Ee]xample(?:\s+(?P<num>\d+))?\s*(?:[:(\-][^{]*)?(?:\{#(?P<id>[A-Za-z0-9_-]+)\})?\s*$",
    )
    .unwrap()
});

static RE_EXPLICIT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{#[A-Za-z0-9_-]+\}\s*$").unwrap());

/// Expected outcome of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expected {
    Passed,
    Failed,
    Inapplicable,
}

impl Expected {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "inapplicable" => Some(Self::Inapplicable),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Inapplicable => "inapplicable",
        }
    }
}

/// One example of a rule, as written in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleExample {
    pub code: String,
    pub language: String,
    pub expected: Expected,
    pub testcase_id: String,
    /// Heading text, without an explicit id.
    pub title: String,
    /// Source lines of the code block, fences included.
    pub span: Span,
}

struct PendingExample {
    expected: Expected,
    testcase_id: String,
    title: String,
}

/// Examples of a rule, in document order.
pub fn rule_examples(rule: &RuleDocument) -> Result<Vec<RuleExample>, RuleError> {
    let mut examples = Vec::new();
    let mut pending: Option<PendingExample> = None;
    let mut sequence = [0usize; 3];
    let mut seen = FxHashSet::default();
    let mut taken = numbered_ids(rule);

    for block in rule.tree.walk() {
        match block {
            Block::Heading { text, .. } => {
                pending = example_heading(rule, text, &mut sequence, &mut taken)?;
            }
            Block::Code {
                lang: Some(lang),
                value,
                span,
                ..
            } => {
                let Some(example) = pending.take() else {
                    continue;
                };
                if !seen.insert(example.testcase_id.clone()) {
                    return Err(RuleError::DuplicateTestcase {
                        rule_id: rule.id().to_owned(),
                        testcase_id: example.testcase_id,
                    });
                }
                examples.push(RuleExample {
                    code: value.clone(),
                    language: lang.clone(),
                    expected: example.expected,
                    testcase_id: example.testcase_id,
                    title: example.title,
                    span: *span,
                });
            }
            _ => {}
        }
    }

    Ok(examples)
}

/// Ids written out in example headings, explicitly or by number.
fn numbered_ids(rule: &RuleDocument) -> FxHashSet<String> {
    rule.tree
        .walk()
        .filter_map(|block| match block {
            Block::Heading { text, .. } => RE_EXAMPLE_HEADING.captures(text.trim()),
            _ => None,
        })
        .filter_map(|caps| match (caps.name("id"), caps.name("num")) {
            (Some(id), _) => Some(id.as_str().to_owned()),
            (None, Some(num)) => {
                let expected = Expected::from_keyword(&caps["keyword"])?;
                Some(format!("{}-example-{}", expected.as_str(), num.as_str()))
            }
            (None, None) => None,
        })
        .collect()
}

/// Recognize an example heading. Headings that are not examples return
/// `None`; example headings with an unknown outcome are an error.
///
/// Unnumbered headings take the next id of their outcome that no other
/// heading uses.
fn example_heading(
    rule: &RuleDocument,
    text: &str,
    sequence: &mut [usize; 3],
    taken: &mut FxHashSet<String>,
) -> Result<Option<PendingExample>, RuleError> {
    let text = text.trim();
    let Some(caps) = RE_EXAMPLE_HEADING.captures(text) else {
        return Ok(None);
    };

    let keyword = &caps["keyword"];
    let expected = Expected::from_keyword(keyword).ok_or_else(|| RuleError::UnknownOutcome {
        rule_id: rule.id().to_owned(),
        keyword: keyword.to_owned(),
    })?;

    let counter = &mut sequence[expected as usize];
    *counter += 1;

    let testcase_id = match (caps.name("id"), caps.name("num")) {
        (Some(id), _) => id.as_str().to_owned(),
        (None, Some(num)) => format!("{}-example-{}", expected.as_str(), num.as_str()),
        (None, None) => loop {
            let id = format!("{}-example-{}", expected.as_str(), counter);
            if taken.insert(id.clone()) {
                break id;
            }
            *counter += 1;
        },
    };

    Ok(Some(PendingExample {
        expected,
        testcase_id,
        title: RE_EXPLICIT_ID.replace(text, "").into_owned(),
    }))
}

// ============================================================================
// Test case records
// ============================================================================

/// Metadata of one published test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseMeta {
    pub rule_id: String,
    pub rule_name: String,
    pub rule_accessibility_requirements: Requirements,
    pub expected: Expected,
    pub testcase_id: String,
    pub testcase_title: String,
    pub relative_path: String,
    pub url: String,
    #[serde(rename = "rulePage")]
    pub rule_page_url: String,
}

/// A test case ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseRecord {
    pub code_snippet: String,
    pub relative_path: String,
    pub metadata: TestCaseMeta,
}

/// Test cases of a rule, hosted below `base_url`.
pub fn extract_test_cases(
    rule: &RuleDocument,
    base_url: &str,
) -> Result<Vec<TestCaseRecord>, RuleError> {
    let rule_page_url = join_url(base_url, &format!("rules/{}", rule.id()));

    let records = rule_examples(rule)?
        .into_iter()
        .map(|example| {
            let relative_path = testcase_path(rule.id(), &example.testcase_id, &example.language);
            let metadata = TestCaseMeta {
                rule_id: rule.id().to_owned(),
                rule_name: rule.name().to_owned(),
                rule_accessibility_requirements: rule.frontmatter.accessibility_requirements.clone(),
                expected: example.expected,
                testcase_id: example.testcase_id,
                testcase_title: example.title,
                relative_path: relative_path.clone(),
                url: join_url(base_url, &relative_path),
                rule_page_url: rule_page_url.clone(),
            };
            TestCaseRecord {
                code_snippet: example.code,
                relative_path,
                metadata,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::loader::parse_rule;
    use std::path::Path;

    const HEAD: &str = "---\nid: abc123\nname: Image has name\nrule_type: atomic\ndescription: d\naccessibility_requirements:\n  wcag20:1.1.1:\n    forConformance: true\n    failed: not satisfied\n    passed: further testing needed\n    inapplicable: further testing needed\n---\n\n";

    fn rule(body: &str) -> RuleDocument {
        parse_rule(Path::new("rule.md"), "rule.md".into(), &format!("{HEAD}{body}")).unwrap()
    }

    const THREE: &str = "## Test Cases

### Passed

#### Passed Example 1

This image has an `alt`.

```html
<img alt=\"W3C\" src=\"/logo.png\" />
```

### Failed

#### Failed Example 1

```svg
<svg xmlns=\"http://www.w3.org/2000/svg\">
  <circle r=\"5\" />
</svg>
```

### Inapplicable

#### Inapplicable Example 1

```xhtml
<p>No image.</p>
```
";

    #[test]
    fn test_three_examples_in_order() {
        let records = extract_test_cases(&rule(THREE), "https://act-rules.github.io").unwrap();
        assert_eq!(records.len(), 3);

        let expected: Vec<_> = records.iter().map(|r| r.metadata.expected).collect();
        assert_eq!(
            expected,
            vec![Expected::Passed, Expected::Failed, Expected::Inapplicable]
        );

        let paths: Vec<_> = records.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "testcases/abc123/passed-example-1.html",
                "testcases/abc123/failed-example-1.svg",
                "testcases/abc123/inapplicable-example-1.xhtml",
            ]
        );

        let failed = &records[1];
        assert_eq!(
            failed.code_snippet,
            "<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <circle r=\"5\" />\n</svg>"
        );
        assert_eq!(failed.metadata.testcase_title, "Failed Example 1");
        assert_eq!(
            failed.metadata.url,
            "https://act-rules.github.io/testcases/abc123/failed-example-1.svg"
        );
        assert_eq!(failed.metadata.rule_page_url, "https://act-rules.github.io/rules/abc123");
        assert_eq!(failed.metadata.rule_name, "Image has name");
        assert_eq!(failed.metadata.rule_accessibility_requirements.len(), 1);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let records = extract_test_cases(&rule(THREE), "https://act-rules.github.io").unwrap();
        let json = serde_json::to_value(&records[0].metadata).unwrap();
        assert_eq!(json["ruleId"], "abc123");
        assert_eq!(json["expected"], "passed");
        assert_eq!(json["testcaseId"], "passed-example-1");
        assert_eq!(json["relativePath"], "testcases/abc123/passed-example-1.html");
        assert_eq!(json["rulePage"], "https://act-rules.github.io/rules/abc123");
        assert!(json["ruleAccessibilityRequirements"]["wcag20:1.1.1"]["forConformance"] == true);
    }

    #[test]
    fn test_heading_without_code_is_skipped() {
        let body = "#### Passed Example 1\n\nNo code here.\n\n#### Passed Example 2\n\n```html\n<b>x</b>\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].testcase_id, "passed-example-2");
    }

    #[test]
    fn test_code_without_language_is_not_an_example() {
        let body = "#### Passed Example 1\n\n```\nplain\n```\n\n```html\n<i>x</i>\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].code, "<i>x</i>");
    }

    #[test]
    fn test_code_is_verbatim() {
        let body = "#### Passed Example 1\n\n```html\n\n    <div>\n\t<span>x</span>\n    </div>\n\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        assert_eq!(examples[0].code, "\n    <div>\n\t<span>x</span>\n    </div>\n");
    }

    #[test]
    fn test_unknown_keyword_fails() {
        let body = "#### Passing Example 1\n\n```html\n<b>x</b>\n```\n";
        match rule_examples(&rule(body)).unwrap_err() {
            RuleError::UnknownOutcome { rule_id, keyword } => {
                assert_eq!(rule_id, "abc123");
                assert_eq!(keyword, "Passing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_other_headings_are_ignored() {
        let body = "## Examples\n\n## Expectation\n\n```html\n<b>x</b>\n```\n";
        assert!(rule_examples(&rule(body)).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_id_and_sequence() {
        let body = "#### Passed Example {#custom-id}\n\n```html\n<a></a>\n```\n\n#### Passed Example\n\n```html\n<b></b>\n```\n\n#### Failed Example: broken image\n\n```html\n<img>\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        let ids: Vec<_> = examples.iter().map(|e| e.testcase_id.as_str()).collect();
        assert_eq!(ids, vec!["custom-id", "passed-example-2", "failed-example-1"]);
        assert_eq!(examples[0].title, "Passed Example");
        assert_eq!(examples[2].title, "Failed Example: broken image");
    }

    #[test]
    fn test_unnumbered_ids_skip_numbered_ones() {
        let body = "#### Passed Example 2\n\n```html\n<a></a>\n```\n\n#### Passed Example\n\n```html\n<b></b>\n```\n\n#### Failed Example\n\n```html\n<i></i>\n```\n\n#### Failed Example 1\n\n```html\n<s></s>\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        let ids: Vec<_> = examples.iter().map(|e| e.testcase_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["passed-example-2", "passed-example-3", "failed-example-2", "failed-example-1"]
        );
    }

    #[test]
    fn test_duplicate_testcase_id_fails() {
        let body = "#### Passed Example 1\n\n```html\n<a></a>\n```\n\n#### Passed Example 1\n\n```html\n<b></b>\n```\n";
        assert!(matches!(
            rule_examples(&rule(body)).unwrap_err(),
            RuleError::DuplicateTestcase { testcase_id, .. } if testcase_id == "passed-example-1"
        ));
    }

    #[test]
    fn test_examples_inside_containers() {
        let body = "> #### Passed Example 1\n>\n> ```html\n> <q>x</q>\n> ```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].code, "<q>x</q>");
    }

    #[test]
    fn test_code_span_covers_fences() {
        let body = "#### Passed Example 1\n\n```html\n<a></a>\n```\n";
        let examples = rule_examples(&rule(body)).unwrap();
        assert_eq!(examples[0].span, Span { start: 2, end: 5 });
    }
}
