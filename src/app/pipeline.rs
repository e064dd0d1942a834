//! Shared refresh pipeline used by the `refresh` and `sample` commands.
//!
//! fetch (or generate) raw series -> GDP levels to growth -> assemble
//!
//! The CLI only decides where the raw series come from and what to print.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rayon::prelude::*;

use crate::assemble::assemble_at;
use crate::data::SeriesSource;
use crate::data::sample::generate_raw;
use crate::domain::{AssembleConfig, Dataset, RawSeries, SeriesKind, TimePoint};
use crate::error::AppError;
use crate::valuation::yoy_growth;

/// Months fetched before the base date so year-over-year indicators exist from the start.
const LOOKBACK_MONTHS: u32 = 12;

/// Fetch every series in `[start, end]`.
///
/// Required series are fetched one after another and the first failure aborts.
/// Optional series are fetched concurrently; a failure only leaves that series
/// absent. The result is returned once every fetch has finished.
pub fn collect_raw<S>(source: &S, start: NaiveDate, end: NaiveDate) -> Result<RawSeries, AppError>
where
    S: SeriesSource + ?Sized,
{
    let [kr_m2, us_m2, market_rate] = SeriesKind::REQUIRED;
    let kr_m2 = fetch_required(source, kr_m2, start, end)?;
    let us_m2 = fetch_required(source, us_m2, start, end)?;
    let market_rate = fetch_required(source, market_rate, start, end)?;

    let optional: Vec<(SeriesKind, Option<Vec<TimePoint>>)> = SeriesKind::OPTIONAL
        .par_iter()
        .map(|&kind| (kind, fetch_optional(source, kind, start, end)))
        .collect();

    let mut raw = RawSeries::core(kr_m2, us_m2, market_rate);
    let mut fetched = 0;
    for (kind, series) in optional {
        fetched += usize::from(series.is_some());
        if let Some(slot) = raw.optional_slot(kind) {
            *slot = series;
        }
    }
    log::info!(
        "Collected required series and {fetched}/{} optional series",
        SeriesKind::OPTIONAL.len()
    );

    Ok(raw)
}

fn fetch_required<S>(source: &S, kind: SeriesKind, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError>
where
    S: SeriesSource + ?Sized,
{
    let points = source.fetch(kind, start, end)?;
    if points.is_empty() {
        return Err(AppError::new(
            4,
            format!("No observations returned for {}.", kind.display_name()),
        ));
    }
    log::info!("Fetched {} ({} observations)", kind.display_name(), points.len());
    Ok(points)
}

fn fetch_optional<S>(source: &S, kind: SeriesKind, start: NaiveDate, end: NaiveDate) -> Option<Vec<TimePoint>>
where
    S: SeriesSource + ?Sized,
{
    match source.fetch(kind, start, end) {
        Ok(points) if points.is_empty() => {
            log::warn!("{}: no observations, continuing without it", kind.display_name());
            None
        }
        Ok(points) => Some(points),
        Err(err) => {
            log::warn!("{}: fetch failed, continuing without it: {err}", kind.display_name());
            None
        }
    }
}

/// Replace the GDP level series with their year-over-year growth.
pub fn gdp_levels_to_growth(raw: &mut RawSeries) {
    for kind in [SeriesKind::KrGdp, SeriesKind::UsGdp] {
        if let Some(slot) = raw.optional_slot(kind) {
            *slot = slot.take().map(|levels| yoy_growth(&levels));
        }
    }
}

/// Live refresh: fetch, convert, assemble.
pub fn run_refresh<S>(source: &S, config: &AssembleConfig) -> Result<Dataset, AppError>
where
    S: SeriesSource + ?Sized,
{
    run_refresh_at(source, config, Utc::now())
}

pub fn run_refresh_at<S>(source: &S, config: &AssembleConfig, now: DateTime<Utc>) -> Result<Dataset, AppError>
where
    S: SeriesSource + ?Sized,
{
    let today = now.date_naive();
    let start = config
        .base_date
        .checked_sub_months(Months::new(LOOKBACK_MONTHS))
        .unwrap_or(config.base_date);

    let mut raw = collect_raw(source, start, today)?;
    gdp_levels_to_growth(&mut raw);
    Ok(assemble_at(&raw, config, now)?)
}

/// Offline refresh from the seeded sample generator.
pub fn run_sample(config: &AssembleConfig, seed: u64) -> Result<Dataset, AppError> {
    run_sample_at(config, seed, Utc::now())
}

pub fn run_sample_at(config: &AssembleConfig, seed: u64, now: DateTime<Utc>) -> Result<Dataset, AppError> {
    let mut raw = generate_raw(config, seed, now.date_naive())?;
    gdp_levels_to_growth(&mut raw);
    Ok(assemble_at(&raw, config, now)?)
}
