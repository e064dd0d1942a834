//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - upstream observations (`TimePoint`, `SeriesKind`, `RawSeries`)
//! - assembly settings (`AssembleConfig`)
//! - the persisted snapshot (`Dataset`, `DailyRecord`, `Sources`)

pub mod types;

pub use types::*;
