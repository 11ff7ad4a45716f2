//! Shared helpers for the rule pipeline.

pub mod date;
pub mod gate;
pub mod log;
pub mod paths;
