//! Published locations of rule pages and test cases.
//!
//! | What | Example |
//! |------|---------|
//! | permalink | `/standards-guidelines/act/rules/image-alt-23a2a8/` |
//! | proposed permalink | `/standards-guidelines/act/rules/image-alt-23a2a8/proposed/` |
//! | page file | `{out}/content/rules/23a2a8/index.md` |
//! | proposed page file | `{out}/content/rules/23a2a8/proposed.md` |
//! | test case | `testcases/23a2a8/passed-example-1.html` |

use std::path::{Path, PathBuf};

/// URL prefix of every published rule page.
pub const RULES_URL_PREFIX: &str = "/standards-guidelines/act/rules/";

/// Repository that hosts the published rule pages.
pub const GITHUB_REPOSITORY: &str = "w3c/wcag-act-rules";

/// Permalink of a rule page, from the rule's file stem.
pub fn rule_permalink(stem: &str, proposed: bool) -> String {
    if proposed {
        format!("{RULES_URL_PREFIX}{stem}/proposed/")
    } else {
        format!("{RULES_URL_PREFIX}{stem}/")
    }
}

/// Output file of a rule page. Proposed and stable pages never share a file.
pub fn rule_output_path(out_dir: &Path, rule_id: &str, proposed: bool) -> PathBuf {
    let file = if proposed { "proposed.md" } else { "index.md" };
    out_dir.join("content").join("rules").join(rule_id).join(file)
}

/// Path of the rule source inside the published repository.
pub fn source_path(filename: &str) -> String {
    format!("content/{filename}")
}

/// Relative path of an extracted test case.
pub fn testcase_path(rule_id: &str, testcase_id: &str, language: &str) -> String {
    format!("testcases/{rule_id}/{testcase_id}.{language}")
}

/// Join a base URL and a relative path with exactly one slash.
pub fn join_url(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
