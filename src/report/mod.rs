//! Reporting: dataset summary and investment environment as terminal text.

pub mod format;

pub use format::*;
