//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

use std::path::PathBuf;

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn current_dir() -> PathBuf {
    ".".into()
}

// ============================================================================
// [transform] Section Defaults
// ============================================================================

pub mod transform {
    pub fn testcase_url() -> String {
        "https://www.w3.org/WAI/content-assets/wcag-act-rules".into()
    }
}

// ============================================================================
// [examples] Section Defaults
// ============================================================================

pub mod examples {
    pub fn base_url() -> String {
        "https://act-rules.github.io".into()
    }
}
