//! Controlled vocabularies used when publishing rules.
//!
//! - WCAG 2.x success criteria, looked up from requirement codes such as
//!   `wcag21:2.1.4`.
//! - ACT input aspects, looked up by name (`DOM Tree`).

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::LazyLock;

/// Base URL of the ACT Rules Format input aspects section.
const ASPECTS_URL: &str = "https://www.w3.org/TR/act-rules-aspects/#input-aspects-";

/// `(number, handle, level)` for every WCAG 2.0, 2.1 and 2.2 success criterion.
const SUCCESS_CRITERIA: &[(&str, &str, &str)] = &[
    ("1.1.1", "Non-text Content", "A"),
    ("1.2.1", "Audio-only and Video-only (Prerecorded)", "A"),
    ("1.2.2", "Captions (Prerecorded)", "A"),
    ("1.2.3", "Audio Description or Media Alternative (Prerecorded)", "A"),
    ("1.2.4", "Captions (Live)", "AA"),
    ("1.2.5", "Audio Description (Prerecorded)", "AA"),
    ("1.2.6", "Sign Language (Prerecorded)", "AAA"),
    ("1.2.7", "Extended Audio Description (Prerecorded)", "AAA"),
    ("1.2.8", "Media Alternative (Prerecorded)", "AAA"),
    ("1.2.9", "Audio-only (Live)", "AAA"),
    ("1.3.1", "Info and Relationships", "A"),
    ("1.3.2", "Meaningful Sequence", "A"),
    ("1.3.3", "Sensory Characteristics", "A"),
    ("1.3.4", "Orientation", "AA"),
    ("1.3.5", "Identify Input Purpose", "AA"),
    ("1.3.6", "Identify Purpose", "AAA"),
    ("1.4.1", "Use of Color", "A"),
    ("1.4.2", "Audio Control", "A"),
    ("1.4.3", "Contrast (Minimum)", "AA"),
    ("1.4.4", "Resize Text", "AA"),
    ("1.4.5", "Images of Text", "AA"),
    ("1.4.6", "Contrast (Enhanced)", "AAA"),
    ("1.4.7", "Low or No Background Audio", "AAA"),
    ("1.4.8", "Visual Presentation", "AAA"),
    ("1.4.9", "Images of Text (No Exception)", "AAA"),
    ("1.4.10", "Reflow", "AA"),
    ("1.4.11", "Non-text Contrast", "AA"),
    ("1.4.12", "Text Spacing", "AA"),
    ("1.4.13", "Content on Hover or Focus", "AA"),
    ("2.1.1", "Keyboard", "A"),
    ("2.1.2", "No Keyboard Trap", "A"),
    ("2.1.3", "Keyboard (No Exception)", "AAA"),
    ("2.1.4", "Character Key Shortcuts", "A"),
    ("2.2.1", "Timing Adjustable", "A"),
    ("2.2.2", "Pause, Stop, Hide", "A"),
    ("2.2.3", "No Timing", "AAA"),
    ("2.2.4", "Interruptions", "AAA"),
    ("2.2.5", "Re-authenticating", "AAA"),
    ("2.2.6", "Timeouts", "AAA"),
    ("2.3.1", "Three Flashes or Below Threshold", "A"),
    ("2.3.2", "Three Flashes", "AAA"),
    ("2.3.3", "Animation from Interactions", "AAA"),
    ("2.4.1", "Bypass Blocks", "A"),
    ("2.4.2", "Page Titled", "A"),
    ("2.4.3", "Focus Order", "A"),
    ("2.4.4", "Link Purpose (In Context)", "A"),
    ("2.4.5", "Multiple Ways", "AA"),
    ("2.4.6", "Headings and Labels", "AA"),
    ("2.4.7", "Focus Visible", "AA"),
    ("2.4.8", "Location", "AAA"),
    ("2.4.9", "Link Purpose (Link Only)", "AAA"),
    ("2.4.10", "Section Headings", "AAA"),
    ("2.4.11", "Focus Not Obscured (Minimum)", "AA"),
    ("2.4.12", "Focus Not Obscured (Enhanced)", "AAA"),
    ("2.4.13", "Focus Appearance", "AAA"),
    ("2.5.1", "Pointer Gestures", "A"),
    ("2.5.2", "Pointer Cancellation", "A"),
    ("2.5.3", "Label in Name", "A"),
    ("2.5.4", "Motion Actuation", "A"),
    ("2.5.5", "Target Size (Enhanced)", "AAA"),
    ("2.5.6", "Concurrent Input Mechanisms", "AAA"),
    ("2.5.7", "Dragging Movements", "AA"),
    ("2.5.8", "Target Size (Minimum)", "AA"),
    ("3.1.1", "Language of Page", "A"),
    ("3.1.2", "Language of Parts", "AA"),
    ("3.1.3", "Unusual Words", "AAA"),
    ("3.1.4", "Abbreviations", "AAA"),
    ("3.1.5", "Reading Level", "AAA"),
    ("3.1.6", "Pronunciation", "AAA"),
    ("3.2.1", "On Focus", "A"),
    ("3.2.2", "On Input", "A"),
    ("3.2.3", "Consistent Navigation", "AA"),
    ("3.2.4", "Consistent Identification", "AA"),
    ("3.2.5", "Change on Request", "AAA"),
    ("3.2.6", "Consistent Help", "A"),
    ("3.3.1", "Error Identification", "A"),
    ("3.3.2", "Labels or Instructions", "A"),
    ("3.3.3", "Error Suggestion", "AA"),
    ("3.3.4", "Error Prevention (Legal, Financial, Data)", "AA"),
    ("3.3.5", "Help", "AAA"),
    ("3.3.6", "Error Prevention (All)", "AAA"),
    ("3.3.7", "Redundant Entry", "A"),
    ("3.3.8", "Accessible Authentication (Minimum)", "AA"),
    ("3.3.9", "Accessible Authentication (Enhanced)", "AAA"),
    ("4.1.1", "Parsing", "A"),
    ("4.1.2", "Name, Role, Value", "A"),
    ("4.1.3", "Status Messages", "AA"),
];

/// `(name, anchor)` of every ACT input aspect.
const INPUT_ASPECTS: &[(&str, &str)] = &[
    ("Accessibility Tree", "accessibility"),
    ("Audio Output", "audio-out"),
    ("CSS Styling", "css"),
    ("DOM Tree", "dom"),
    ("HTTP Messages", "http"),
    ("Language", "text"),
    ("Visual Output", "visual-out"),
];

/// A success criterion as listed in a rule's `scs_tested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criterion {
    pub num: String,
    pub handle: String,
    pub level: String,
}

/// An input aspect as listed in a rule's `input_aspects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aspect {
    pub handle: String,
    pub url: String,
}

/// Lookup tables from requirement codes and aspect names.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    criteria: FxHashMap<String, Criterion>,
    /// Keyed by lowercased name.
    aspects: FxHashMap<String, Aspect>,
}

static BUILTIN: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(
        SUCCESS_CRITERIA.iter().map(|(num, handle, level)| Criterion {
            num: (*num).to_owned(),
            handle: (*handle).to_owned(),
            level: (*level).to_owned(),
        }),
        INPUT_ASPECTS.iter().map(|(name, anchor)| Aspect {
            handle: (*name).to_owned(),
            url: format!("{ASPECTS_URL}{anchor}"),
        }),
    )
});

static RE_SC_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^wcag2\d:(?P<num>\d+\.\d+\.\d+)$").unwrap());
static RE_TECHNIQUE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^wcag-technique:(?P<id>[A-Za-z]+\d+)$").unwrap());

impl Vocabulary {
    pub fn new(
        criteria: impl IntoIterator<Item = Criterion>,
        aspects: impl IntoIterator<Item = Aspect>,
    ) -> Self {
        Self {
            criteria: criteria.into_iter().map(|c| (c.num.clone(), c)).collect(),
            aspects: aspects
                .into_iter()
                .map(|a| (a.handle.to_lowercase(), a))
                .collect(),
        }
    }

    /// WCAG 2.0 / 2.1 / 2.2 success criteria and the ACT input aspects.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Success criterion for a requirement code, if it is one we know.
    pub fn criterion(&self, code: &str) -> Option<&Criterion> {
        let num = sc_number(code)?;
        self.criteria.get(num)
    }

    /// Input aspect by name, ignoring case.
    pub fn aspect(&self, name: &str) -> Option<&Aspect> {
        self.aspects.get(&name.trim().to_lowercase())
    }
}

/// Success criterion number of a `wcag2x:N.N.N` requirement code.
pub fn sc_number(code: &str) -> Option<&str> {
    RE_SC_CODE
        .captures(code)
        .and_then(|caps| caps.name("num"))
        .map(|m| m.as_str())
}

/// Technique id of a `wcag-technique:XX00` requirement code.
pub fn technique_id(code: &str) -> Option<&str> {
    RE_TECHNIQUE_CODE
        .captures(code)
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str())
}
