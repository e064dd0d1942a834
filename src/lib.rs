//! `krw-gap` library crate.
//!
//! The binary (`krw`) is a thin wrapper around this library so that:
//!
//! - the numerical core (interpolation, valuation, assembly, rules) is testable
//!   without network access or spawning processes
//! - the data sources sit behind a trait and can be swapped in tests

pub mod app;
pub mod assemble;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod signal;
pub mod valuation;
