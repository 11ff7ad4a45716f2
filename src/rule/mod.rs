//! Rule page generation: frontmatter, test cases, body and footer.

pub mod content;
pub mod examples;
pub mod footer;
pub mod frontmatter;
pub mod title;

pub use content::{ComposeOptions, Composer};
pub use examples::{TestCaseRecord, extract_test_cases};
