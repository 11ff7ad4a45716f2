//! Generated artifacts besides the rule pages.

pub mod mapping;
pub mod matrix;
pub mod testcases;
