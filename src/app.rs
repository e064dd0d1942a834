//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs the refresh / sample pipeline or loads the dataset snapshot
//! - prints reports

use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, DataArgs, RefreshArgs, SampleArgs, SignalArgs};
use crate::data::LiveSource;
use crate::domain::{DailyRecord, Dataset};
use crate::error::AppError;
use crate::io::{read_dataset_json, write_dataset_json};
use crate::signal::InvestmentEnvironment;

pub mod pipeline;

/// Entry point for the `krw` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    // `krw` alone, or `krw --date ...`, means `krw signal ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Refresh(args) => handle_refresh(args),
        Command::Sample(args) => handle_sample(args),
        Command::Signal(args) => handle_signal(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn handle_refresh(args: RefreshArgs) -> Result<(), AppError> {
    let config = args.base.assemble_config()?;
    let source = LiveSource::from_env()?;
    let dataset = pipeline::run_refresh(&source, &config)?;
    write_dataset_json(&args.out, &dataset)?;

    println!("{}", crate::report::format_dataset_summary(&dataset));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = args.base.assemble_config()?;
    let dataset = pipeline::run_sample(&config, args.seed)?;
    write_dataset_json(&args.out, &dataset)?;

    println!("{}", crate::report::format_dataset_summary(&dataset));
    Ok(())
}

fn handle_signal(args: SignalArgs) -> Result<(), AppError> {
    let dataset = load_dataset(&args.data.data)?;
    let record = select_record(&dataset, args.date, &args.data.data)?;
    let environment = crate::signal::evaluate(record);

    if args.json {
        let report = SignalReport {
            date: record.date,
            record,
            environment: &environment,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::new(2, format!("Failed to serialize signal: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_environment(&environment, record));
    }
    Ok(())
}

fn handle_summary(args: DataArgs) -> Result<(), AppError> {
    let dataset = load_dataset(&args.data)?;
    println!("{}", crate::report::format_dataset_summary(&dataset));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignalReport<'a> {
    date: NaiveDate,
    record: &'a DailyRecord,
    environment: &'a InvestmentEnvironment,
}

fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    read_dataset_json(path).map_err(|err| {
        AppError::new(
            err.exit_code(),
            format!(
                "Cannot load dataset: {}\nRun `krw refresh` (live) or `krw sample` (offline) first.",
                err.message()
            ),
        )
    })
}

fn select_record<'a>(dataset: &'a Dataset, date: Option<NaiveDate>, path: &Path) -> Result<&'a DailyRecord, AppError> {
    match date {
        Some(date) => dataset
            .record_on(date)
            .ok_or_else(|| AppError::new(2, format!("No record for {date} in '{}'.", path.display()))),
        None => {
            if let Some((record, skipped)) = crate::signal::latest_complete(dataset) {
                if let (Some(first), Some(last)) = (skipped.first(), skipped.last()) {
                    log::warn!(
                        "Skipping {} newer record(s) {}..{} missing rate differential, DXY or VIX; evaluating {}",
                        skipped.len(),
                        first.date,
                        last.date,
                        record.date
                    );
                }
                return Ok(record);
            }
            let latest = dataset
                .latest()
                .ok_or_else(|| AppError::new(2, format!("Dataset '{}' has no records.", path.display())))?;
            log::warn!("No record carries every critical indicator; evaluating {}", latest.date);
            Ok(latest)
        }
    }
}

/// Rewrite argv so `krw` defaults to `krw signal`.
///
/// Rules:
/// - `krw`                       -> `krw signal`
/// - `krw --date 2024-03-05 ...` -> `krw signal --date 2024-03-05 ...`
/// - `krw --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("signal".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "refresh" | "sample" | "signal" | "summary");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "signal".to_string());
        return argv;
    }

    argv
}
