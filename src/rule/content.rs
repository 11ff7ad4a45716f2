//! Composition of a complete rule page.
//!
//! A page is the synthesized frontmatter followed by the rule body with its
//! links rewritten for the publishing site, the definitions of every
//! glossary term the rule uses, and the acknowledgment footer.
//!
//! # Link rewriting
//!
//! | Source target | Published target |
//! |---------------|------------------|
//! | `#term`, `/glossary/#term` (known term) | `#term` |
//! | `/rules/{id}/` (rule in this run) | permalink of that rule |
//! | `/rules/{id}/` (other rule) | `https://act-rules.github.io/rules/{id}` |
//!
//! Only inline links and link reference definitions are rewritten, and
//! never inside fenced code.

use super::{
    examples::rule_examples,
    footer::{build_footer, escape_html},
    frontmatter::build_frontmatter,
};
use crate::{
    document::{Block, DocumentTree, GlossaryEntry, RuleDocument},
    error::RuleError,
    utils::{
        date::Date,
        paths::{join_url, rule_permalink, testcase_path},
    },
    vocab::Vocabulary,
};
use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::{collections::BTreeSet, sync::LazyLock};

/// Site of the rules that are not part of the current run.
const ACT_RULES_SITE: &str = "https://act-rules.github.io";

static RE_LINK_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<lead>\]\(\s*)(?P<url>[^\s)]+)").unwrap()
});

static RE_RULE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/rules/(?P<id>[A-Za-z0-9]+)/?(?P<fragment>#.*)?$").unwrap()
});

/// Options that apply to every page of a run.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    pub proposed: bool,
    pub no_example_links: bool,
    /// Where extracted test cases are hosted.
    pub testcase_url: String,
    pub date: Date,
}

/// A composed rule page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    /// Frontmatter block, `---` lines included.
    pub frontmatter: String,
    pub body: String,
}

impl ComposedDocument {
    /// Full page text.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.frontmatter, self.body)
    }
}

/// Glossary entries by key.
#[derive(Debug, Default)]
pub struct GlossaryIndex<'a> {
    entries: FxHashMap<&'a str, &'a GlossaryEntry>,
}

impl<'a> GlossaryIndex<'a> {
    pub fn new(entries: &'a [GlossaryEntry]) -> Self {
        Self {
            entries: entries.iter().map(|e| (e.key.as_str(), e)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a GlossaryEntry> {
        self.entries.get(key).copied()
    }
}

/// A glossary definition ready to append to pages.
#[derive(Debug)]
struct Term {
    title: String,
    body: String,
    /// Keys of the terms this definition links to.
    refs: BTreeSet<String>,
}

/// Link targets known to a run.
struct Links<'c, 'a> {
    glossary: &'c GlossaryIndex<'a>,
    permalinks: &'c FxHashMap<&'a str, String>,
}

impl Links<'_, '_> {
    /// Rewrite the links of a markdown text, recording referenced terms.
    fn rewrite(&self, text: &str, tree: &DocumentTree, refs: &mut BTreeSet<String>) -> Vec<String> {
        let code = code_lines(tree);
        let definitions = definition_lines(tree);
        text.lines()
            .enumerate()
            .map(|(no, line)| {
                if code.contains(&no) {
                    line.to_owned()
                } else if let Some(block) = definitions.get(&no) {
                    self.rewrite_definition(line, block, refs)
                } else {
                    self.rewrite_line(line, refs)
                }
            })
            .collect()
    }

    /// `[label]: url "title"`, with the url resolved. The line prefix
    /// (indentation, quote markers) is kept.
    fn rewrite_definition(&self, line: &str, block: &Block, refs: &mut BTreeSet<String>) -> String {
        let Block::Definition { label, url, title, .. } = block else {
            return line.to_owned();
        };
        let Some(resolved) = self.resolve(url, refs) else {
            return line.to_owned();
        };
        let prefix = line.find('[').map_or("", |at| &line[..at]);
        match title {
            Some(title) => format!("{prefix}[{label}]: {resolved} \"{title}\""),
            None => format!("{prefix}[{label}]: {resolved}"),
        }
    }

    fn rewrite_line(&self, line: &str, refs: &mut BTreeSet<String>) -> String {
        RE_LINK_TARGET
            .replace_all(line, |caps: &Captures<'_>| match self.resolve(&caps["url"], refs) {
                Some(url) => format!("{}{url}", &caps["lead"]),
                None => caps[0].to_owned(),
            })
            .into_owned()
    }

    fn resolve(&self, url: &str, refs: &mut BTreeSet<String>) -> Option<String> {
        let anchor = url
            .strip_prefix("/glossary/#")
            .or_else(|| url.strip_prefix('#'));
        if let Some(key) = anchor
            && self.glossary.get(key).is_some()
        {
            refs.insert(key.to_owned());
            return Some(format!("#{key}"));
        }

        let caps = RE_RULE_URL.captures(url)?;
        let id = &caps["id"];
        let fragment = caps.name("fragment").map_or("", |m| m.as_str());
        let target = match self.permalinks.get(id) {
            Some(permalink) => permalink.clone(),
            None => format!("{ACT_RULES_SITE}/rules/{id}"),
        };
        Some(format!("{target}{fragment}"))
    }
}

/// Indentation and `>` markers in front of the content of `line`.
fn container_prefix(line: &str) -> &str {
    let len = line
        .find(|c: char| !c.is_whitespace() && c != '>')
        .unwrap_or(line.len());
    &line[..len]
}

/// Link reference definitions by line number.
fn definition_lines(tree: &DocumentTree) -> FxHashMap<usize, &Block> {
    tree.walk()
        .filter(|block| matches!(block, Block::Definition { .. }))
        .map(|block| (block.span().start, block))
        .collect()
}

/// Line numbers covered by fenced code anywhere in the tree.
fn code_lines(tree: &DocumentTree) -> FxHashSet<usize> {
    tree.walk()
        .filter(|block| matches!(block, Block::Code { .. }))
        .flat_map(|block| {
            let span = block.span();
            span.start..span.end
        })
        .collect()
}

/// Composes rule pages for one run.
///
/// Glossary definitions and rule permalinks are resolved once, when the
/// composer is built.
pub struct Composer<'a> {
    vocab: &'a Vocabulary,
    glossary: GlossaryIndex<'a>,
    permalinks: FxHashMap<&'a str, String>,
    terms: FxHashMap<&'a str, Term>,
    options: ComposeOptions,
}

impl<'a> Composer<'a> {
    pub fn new(
        vocab: &'a Vocabulary,
        glossary: &'a [GlossaryEntry],
        rules: impl IntoIterator<Item = &'a RuleDocument>,
        options: ComposeOptions,
    ) -> Self {
        let glossary = GlossaryIndex::new(glossary);
        let permalinks: FxHashMap<&str, String> = rules
            .into_iter()
            .map(|rule| (rule.id(), rule_permalink(rule.stem(), options.proposed)))
            .collect();

        let links = Links {
            glossary: &glossary,
            permalinks: &permalinks,
        };
        let terms = glossary
            .entries
            .iter()
            .map(|(key, entry)| {
                let mut refs = BTreeSet::new();
                let body = links.rewrite(&entry.body, &entry.tree, &mut refs).join("\n");
                let term = Term {
                    title: entry.title.clone(),
                    body,
                    refs,
                };
                (*key, term)
            })
            .collect();

        Self {
            vocab,
            glossary,
            permalinks,
            terms,
            options,
        }
    }

    /// Compose the page of `rule`.
    pub fn compose(&self, rule: &RuleDocument) -> Result<ComposedDocument, RuleError> {
        let opts = &self.options;
        let frontmatter = build_frontmatter(rule, self.vocab, opts.date, opts.proposed)?;
        let examples = rule_examples(rule)?;

        let links = Links {
            glossary: &self.glossary,
            permalinks: &self.permalinks,
        };
        let mut refs = BTreeSet::new();
        let lines = links.rewrite(&rule.body, &rule.tree, &mut refs);

        let mut example_links: FxHashMap<usize, Vec<String>> = FxHashMap::default();
        if !opts.no_example_links {
            for example in &examples {
                let path = testcase_path(rule.id(), &example.testcase_id, &example.language);
                let link = format!(
                    "<a class=\"example-link\" title=\"{}\" target=\"_blank\" href=\"{}\">Open in a new tab</a>",
                    escape_html(&example.title),
                    join_url(&opts.testcase_url, &path)
                );
                example_links
                    .entry(example.span.end.saturating_sub(1))
                    .or_default()
                    .push(link);
            }
        }

        let mut body = String::with_capacity(rule.body.len() * 2);
        for (no, line) in lines.iter().enumerate() {
            body.push_str(line);
            body.push('\n');
            // Links stay inside the list item or block quote of their example.
            let prefix = container_prefix(line);
            for link in example_links.get(&no).into_iter().flatten() {
                body.push_str(prefix.trim_end());
                body.push('\n');
                body.push_str(prefix);
                body.push_str(link);
                body.push('\n');
            }
        }

        self.push_glossary(&mut body, refs);

        body.push('\n');
        body.push_str(&build_footer(rule, opts.date));
        body.push('\n');

        Ok(ComposedDocument { frontmatter, body })
    }

    /// Append the definitions of `refs` and every term they reference in
    /// turn, sorted by key.
    fn push_glossary(&self, body: &mut String, refs: BTreeSet<String>) {
        let mut resolved = BTreeSet::new();
        let mut pending: Vec<String> = refs.into_iter().collect();
        while let Some(key) = pending.pop() {
            let Some(term) = self.terms.get(key.as_str()) else {
                continue;
            };
            pending.extend(term.refs.iter().filter(|r| !resolved.contains(*r)).cloned());
            resolved.insert(key);
        }

        if resolved.is_empty() {
            return;
        }
        body.push_str("\n## Glossary\n");
        for key in &resolved {
            if let Some(term) = self.terms.get(key.as_str()) {
                body.push_str(&format!(
                    "\n### {} {{#{key}}}\n\n{}\n",
                    term.title,
                    term.body.trim()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::loader::{parse_glossary, parse_rule};
    use std::path::Path;

    const HEAD: &str = "---\nid: abc123\nname: Image has name\nrule_type: atomic\ndescription: d\ninput_aspects:\n  - DOM Tree\nacknowledgments:\n  authors:\n    - Billy Jean\n---\n\n";

    fn rule(body: &str) -> RuleDocument {
        rule_with(HEAD, "image-has-name-abc123.md", body)
    }

    fn rule_with(head: &str, filename: &str, body: &str) -> RuleDocument {
        parse_rule(Path::new(filename), filename.into(), &format!("{head}{body}")).unwrap()
    }

    fn term(key: &str, title: &str, body: &str) -> GlossaryEntry {
        let text = format!("---\ntitle: {title}\nkey: {key}\n---\n\n{body}");
        parse_glossary(Path::new("term.md"), &text).unwrap()
    }

    fn options() -> ComposeOptions {
        ComposeOptions {
            proposed: false,
            no_example_links: false,
            testcase_url: "https://www.w3.org/WAI/content-assets/wcag-act-rules".into(),
            date: Date::new(2025, 3, 7),
        }
    }

    fn glossary() -> Vec<GlossaryEntry> {
        vec![
            term("visible", "Visible", "Content perceivable through [sight](#outcome).\n"),
            term("outcome", "Outcome", "A conclusion of a rule.\n"),
            term("unused", "Unused", "Never linked.\n"),
        ]
    }

    #[test]
    fn test_page_layout() {
        let rule = rule("## Applicability\n\nAny `img` element.\n");
        let glossary = glossary();
        let composer = Composer::new(Vocabulary::builtin(), &glossary, [&rule], options());
        let page = composer.compose(&rule).unwrap();
        let text = page.text();

        assert!(text.starts_with("---\ntitle: Image has name\n"));
        assert!(text.contains("---\n\n## Applicability\n\nAny `img` element.\n"));
        assert!(text.contains("<p><strong>Authors:</strong> Billy Jean."));
        assert!(text.ends_with("</p>\n"));
        assert!(!text.contains("## Glossary"));
    }

    #[test]
    fn test_glossary_terms_resolved_transitively() {
        let rule = rule("Each [visible][] image.\n\n[visible]: #visible\n\nSee [outcome](/glossary/#outcome) and [x](#nowhere).\n");
        let glossary = glossary();
        let composer = Composer::new(Vocabulary::builtin(), &glossary, [&rule], options());
        let body = composer.compose(&rule).unwrap().body;

        assert!(body.contains("[visible]: #visible"));
        assert!(body.contains("[outcome](#outcome)"));
        assert!(body.contains("[x](#nowhere)"));

        let glossary_at = body.find("## Glossary").unwrap();
        let outcome_at = body.find("### Outcome {#outcome}").unwrap();
        let visible_at = body.find("### Visible {#visible}").unwrap();
        assert!(glossary_at < outcome_at && outcome_at < visible_at);
        assert!(body.contains("Content perceivable through [sight](#outcome)."));
        assert!(!body.contains("{#unused}"));
        assert_eq!(body.matches("{#outcome}").count(), 1);
    }

    #[test]
    fn test_transitive_only_term() {
        let rule = rule("Only [visible](#visible) here.\n");
        let glossary = glossary();
        let composer = Composer::new(Vocabulary::builtin(), &glossary, [&rule], options());
        let body = composer.compose(&rule).unwrap().body;
        assert!(body.contains("### Outcome {#outcome}"));
    }

    #[test]
    fn test_rule_links() {
        let other = rule_with(
            "---\nid: xyz789\nname: Other\nrule_type: atomic\ndescription: d\n---\n\n",
            "other-rule-xyz789.md",
            "Text.\n",
        );
        let rule = rule("Uses [other](/rules/xyz789/) and [remote](/rules/qwe456#expectation).\n");
        let composer = Composer::new(Vocabulary::builtin(), &[], [&rule, &other], options());
        let body = composer.compose(&rule).unwrap().body;

        assert!(body.contains("[other](/standards-guidelines/act/rules/other-rule-xyz789/)"));
        assert!(body.contains("[remote](https://act-rules.github.io/rules/qwe456#expectation)"));

        let proposed = ComposeOptions {
            proposed: true,
            ..options()
        };
        let composer = Composer::new(Vocabulary::builtin(), &[], [&rule, &other], proposed);
        let body = composer.compose(&rule).unwrap().body;
        assert!(body.contains("[other](/standards-guidelines/act/rules/other-rule-xyz789/proposed/)"));
    }

    #[test]
    fn test_definitions_rewritten() {
        let rule = rule("See [a][] and [b][].\n\n[a]: </rules/qwe456/> 'Other rule'\n[b]: https://example.com\n");
        let composer = Composer::new(Vocabulary::builtin(), &[], [&rule], options());
        let body = composer.compose(&rule).unwrap().body;
        assert!(body.contains("[a]: https://act-rules.github.io/rules/qwe456 \"Other rule\""));
        assert!(body.contains("[b]: https://example.com\n"));
    }

    #[test]
    fn test_code_is_not_rewritten() {
        let rule = rule("```md\n[x](#visible)\n```\n\n[y](#visible)\n");
        let glossary = glossary();
        let composer = Composer::new(Vocabulary::builtin(), &glossary, [&rule], options());
        let body = composer.compose(&rule).unwrap().body;
        assert!(body.contains("```md\n[x](#visible)\n```"));
    }

    const EXAMPLES: &str = "#### Passed Example 1\n\n```html\n<img alt=\"x\" />\n```\n\n#### Failed Example 1\n\n```html\n<img />\n```\n";

    #[test]
    fn test_example_links() {
        let rule = rule(EXAMPLES);
        let composer = Composer::new(Vocabulary::builtin(), &[], [&rule], options());
        let body = composer.compose(&rule).unwrap().body;

        assert!(body.contains(
            "```html\n<img alt=\"x\" />\n```\n\n<a class=\"example-link\" title=\"Passed Example 1\" target=\"_blank\" href=\"https://www.w3.org/WAI/content-assets/wcag-act-rules/testcases/abc123/passed-example-1.html\">Open in a new tab</a>\n"
        ));
        assert_eq!(body.matches("Open in a new tab").count(), 2);
    }

    #[test]
    fn test_example_links_stay_in_containers() {
        let list = "- Item:\n\n  #### Passed Example 1\n\n  ```html\n  <img alt=\"x\" />\n  ```\n\n  Trailing text.\n";
        let quote = "> #### Passed Example 1\n>\n> ```html\n> <a/>\n> ```\n>\n> Trailing text.\n";

        for body in [list, quote] {
            let rule = rule(body);
            let composer = Composer::new(Vocabulary::builtin(), &[], [&rule], options());
            let composed = composer.compose(&rule).unwrap().body;
            assert!(composed.contains("passed-example-1.html"));

            // The container, then the footer paragraph.
            let tree = DocumentTree::parse(&composed);
            assert_eq!(tree.blocks.len(), 2, "{composed}");
            assert!(matches!(
                tree.blocks[0],
                Block::List { .. } | Block::BlockQuote { .. }
            ));
        }
    }

    #[test]
    fn test_container_prefix() {
        assert_eq!(container_prefix("  ```"), "  ");
        assert_eq!(container_prefix("> ```"), "> ");
        assert_eq!(container_prefix(">   ~~~"), ">   ");
        assert_eq!(container_prefix("```"), "");
    }

    #[test]
    fn test_no_example_links() {
        let rule = rule(EXAMPLES);
        let opts = ComposeOptions {
            no_example_links: true,
            ..options()
        };
        let composer = Composer::new(Vocabulary::builtin(), &[], [&rule], opts);
        let body = composer.compose(&rule).unwrap().body;
        assert!(!body.contains("example-link"));
        assert!(body.starts_with(EXAMPLES));
    }

    #[test]
    fn test_validation_errors_propagate() {
        let broken = rule("#### Passing Example 1\n\n```html\n<b></b>\n```\n");
        let composer = Composer::new(Vocabulary::builtin(), &[], [&broken], options());
        assert!(matches!(
            composer.compose(&broken),
            Err(RuleError::UnknownOutcome { .. })
        ));
    }

    #[test]
    fn test_glossary_index() {
        let glossary = glossary();
        let index = GlossaryIndex::new(&glossary);
        assert_eq!(index.get("visible").map(|e| e.title.as_str()), Some("Visible"));
        assert!(index.get("missing").is_none());
    }
}
