//! Input/output helpers.
//!
//! - dataset snapshot JSON read/write (`dataset`)

pub mod dataset;

pub use dataset::*;
