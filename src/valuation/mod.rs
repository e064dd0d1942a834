//! Valuation engine: fair rate, gap and auxiliary macro ratios.
//!
//! Functions here are pure and stateless so the assembler can call them per date
//! and the results stay reproducible from a dataset snapshot.

pub mod composite;
pub mod rates;

pub use composite::*;
pub use rates::*;
