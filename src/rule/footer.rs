//! Acknowledgment footer of a rule page.
//!
//! Every line is a complete `<p>` element, so the footer renders the same
//! whatever markdown processor picks the page up.

use crate::{
    document::{Acknowledgments, RuleDocument},
    utils::date::Date,
};

const CONTRIBUTORS_URL: &str = "https://www.w3.org/community/act-r/participants";
const COMMUNITY_GROUP_URL: &str = "https://w3.org/community/act-r/";
const WAI_COOP_URL: &str = "https://www.w3.org/WAI/about/projects/wai-coop/";
const WAI_TOOLS_URL: &str = "https://www.w3.org/WAI/about/projects/wai-tools/";

/// Render the footer of `rule`, one paragraph per line.
pub fn build_footer(rule: &RuleDocument, date: Date) -> String {
    footer_lines(rule.id(), &rule.frontmatter.acknowledgments, date).join("\n")
}

fn footer_lines(rule_id: &str, ack: &Acknowledgments, date: Date) -> Vec<String> {
    let mut lines = vec![
        paragraph(&format!(
            "<strong>Rule Identifier:</strong> {}",
            escape_html(rule_id)
        )),
        date_paragraph(&date.to_string()),
    ];

    if !ack.authors.is_empty() {
        lines.push(paragraph(&format!(
            "<strong>Authors:</strong> {}. <strong>Contributors:</strong> <a href=\"{CONTRIBUTORS_URL}\">Participants of the ACT Rules Community Group (CG)</a>.",
            name_list(&ack.authors)
        )));
    }
    if !ack.previous_authors.is_empty() {
        lines.push(paragraph(&format!(
            "<strong>Previous Authors:</strong> {}.",
            name_list(&ack.previous_authors)
        )));
    }

    lines.push(paragraph(&format!(
        "This rule was written in the <a href=\"{COMMUNITY_GROUP_URL}\">ACT Rules Community Group</a>."
    )));
    lines.push(paragraph(&format!(
        "It is written as part of the EU-funded <a href=\"{WAI_COOP_URL}\">WAI-CooP Project</a>."
    )));

    for program in &ack.funding {
        if program.eq_ignore_ascii_case("WAI-CooP") {
            continue;
        }
        let line = if program.eq_ignore_ascii_case("WAI-Tools") {
            format!(
                "The rule was originally written as part of the <a href=\"{WAI_TOOLS_URL}\">WAI-Tools Project</a>."
            )
        } else {
            format!(
                "Development of this rule was supported by {}.",
                escape_html(program)
            )
        };
        lines.push(paragraph(&line));
    }

    if !ack.assets.is_empty() {
        lines.push(paragraph(&format!(
            "<strong>Assets:</strong> test cases use assets from the following sources: {}.",
            name_list(&ack.assets)
        )));
    }

    lines
}

/// The footer line stamped with the generation date.
pub fn date_paragraph(date: &str) -> String {
    paragraph(&format!("<strong>Date:</strong> Updated {date}"))
}

fn paragraph(inner: &str) -> String {
    format!("<p>{inner}</p>")
}

fn name_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| escape_html(name.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer(ack: Acknowledgments) -> String {
        footer_lines("abc123", &ack, Date::new(2025, 3, 7)).join("\n")
    }

    fn authors(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn test_one_paragraph_per_line() {
        let text = footer(Acknowledgments {
            authors: authors(&["Billy Jean"]),
            previous_authors: authors(&["Fannybaws"]),
            funding: authors(&["WAI-Tools", "Acme Fund"]),
            assets: authors(&["Hello"]),
        });
        for line in text.split('\n') {
            assert!(line.starts_with("<p>"), "{line}");
            assert!(line.ends_with("</p>"), "{line}");
        }
    }

    #[test]
    fn test_date_and_rule_id() {
        let text = footer(Acknowledgments::default());
        assert!(text.contains("Date:"));
        assert!(text.contains("7 March 2025"));
        assert!(text.contains("abc123"));
    }

    #[test]
    fn test_authors_only_when_present() {
        let text = footer(Acknowledgments::default());
        assert!(!text.contains("Authors:"));
        assert!(!text.contains("Previous Authors:"));

        let text = footer(Acknowledgments {
            authors: authors(&["Billy Jean"]),
            ..Default::default()
        });
        assert!(text.contains("Authors:"));
        assert!(text.contains("Billy Jean"));
        assert!(!text.contains("Previous Authors:"));
    }

    #[test]
    fn test_previous_authors() {
        let text = footer(Acknowledgments {
            authors: authors(&["Billy Jean"]),
            previous_authors: authors(&["Fannybaws"]),
            ..Default::default()
        });
        assert!(text.contains("Previous Authors:"));
        assert!(text.contains("Fannybaws"));
    }

    #[test]
    fn test_fixed_links() {
        let text = footer(Acknowledgments::default());
        assert!(text.contains(COMMUNITY_GROUP_URL));
        assert!(text.contains(WAI_COOP_URL));
        assert!(!text.contains(WAI_TOOLS_URL));
    }

    #[test]
    fn test_funding() {
        let text = footer(Acknowledgments {
            funding: authors(&["WAI-tools", "WAI-CooP", "Acme <Fund>"]),
            ..Default::default()
        });
        assert!(text.contains(WAI_TOOLS_URL));
        assert_eq!(text.matches(WAI_COOP_URL).count(), 1);
        assert!(text.contains("Acme &lt;Fund&gt;"));
    }

    #[test]
    fn test_assets_only_when_present() {
        assert!(!footer(Acknowledgments::default()).contains("Assets:"));

        let text = footer(Acknowledgments {
            assets: authors(&["Hello", "World"]),
            ..Default::default()
        });
        assert!(text.contains("Assets:"));
        assert!(text.contains("Hello, World"));
    }
}
