//! Command-line parsing for the KRW fair-value tool.
//!
//! Argument parsing stays here; `app` does the dispatch and the pipeline does
//! the work.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::AssembleConfig;
use crate::error::AppError;

pub const DEFAULT_DATA_PATH: &str = "data/krw-data.json";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "krw", version, about = "KRW fair value from the KR/US M2 ratio, with an investment-timing signal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch live series (ECOS, FRED, ExchangeRate-API), assemble and write the dataset.
    Refresh(RefreshArgs),
    /// Write a synthetic dataset for offline use.
    Sample(SampleArgs),
    /// Evaluate the investment conditions for the latest (or a given) record.
    Signal(SignalArgs),
    /// Print base settings, coverage and the latest record of the dataset.
    Summary(DataArgs),
}

/// Base-period settings shared by `refresh` and `sample`.
#[derive(Debug, Args, Clone)]
pub struct BaseArgs {
    /// Base date (YYYY-MM-DD) at which the fair rate equals the base rate.
    #[arg(long, env = "BASE_DATE", default_value = "2010-01-01")]
    pub base_date: NaiveDate,

    /// USD/KRW at the base date.
    #[arg(long, env = "BASE_RATE", default_value_t = 1167.0)]
    pub base_rate: f64,

    /// Base KR M2 (trillion KRW). Defaults to the interpolated value at the base date.
    #[arg(long, env = "BASE_KR_M2")]
    pub base_kr_m2: Option<f64>,

    /// Base US M2 (billion USD). Defaults to the interpolated value at the base date.
    #[arg(long, env = "BASE_US_M2")]
    pub base_us_m2: Option<f64>,
}

impl BaseArgs {
    pub fn assemble_config(&self) -> Result<AssembleConfig, AppError> {
        if !(self.base_rate.is_finite() && self.base_rate > 0.0) {
            return Err(AppError::new(2, "--base-rate must be a positive number."));
        }
        for (flag, value) in [("--base-kr-m2", self.base_kr_m2), ("--base-us-m2", self.base_us_m2)] {
            if value.is_some_and(|v| !(v.is_finite() && v > 0.0)) {
                return Err(AppError::new(2, format!("{flag} must be a positive number.")));
            }
        }
        Ok(AssembleConfig {
            base_date: self.base_date,
            base_rate: self.base_rate,
            base_kr_m2: self.base_kr_m2,
            base_us_m2: self.base_us_m2,
        })
    }
}

#[derive(Debug, Args, Clone)]
pub struct RefreshArgs {
    #[command(flatten)]
    pub base: BaseArgs,

    /// Where to write the dataset JSON.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_DATA_PATH)]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub base: BaseArgs,

    /// Where to write the dataset JSON.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_DATA_PATH)]
    pub out: PathBuf,

    /// Random seed; the same seed and window reproduce the same dataset.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Dataset JSON written by `krw refresh` or `krw sample`.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SignalArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Evaluate the record on this date instead of the latest one.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the evaluation as JSON.
    #[arg(long)]
    pub json: bool,
}
