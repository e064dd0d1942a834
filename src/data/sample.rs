//! Synthetic upstream series for offline use.
//!
//! Shapes follow the real series loosely: M2 grows exponentially, USD/KRW drifts
//! along a trend with monthly and quarterly cycles, indicators oscillate around
//! plausible levels. Everything is driven by one seeded `StdRng`, so a seed and a
//! date window always reproduce the same dataset.

use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{AssembleConfig, RawSeries, SeriesOrigin, TimePoint};
use crate::error::AppError;
use crate::math::round_to;

/// KR M2 at the start of the window (trillion KRW).
const KR_M2_START: f64 = 1500.0;
/// KR M2 at the end of the window (trillion KRW).
const KR_M2_END: f64 = 3800.0;
/// US M2 at the start of the window (billion USD).
const US_M2_START: f64 = 8500.0;
const US_M2_END: f64 = 21000.0;
/// Market rate at the end of the window, relative to the base rate (1448 / 1167).
const MARKET_RATE_DRIFT: f64 = 1448.0 / 1167.0;

const M2_NOISE: f64 = 0.005;
const RATE_NOISE: f64 = 0.005;

pub fn generate_raw(config: &AssembleConfig, seed: u64, today: NaiveDate) -> Result<RawSeries, AppError> {
    let start = config.base_date;
    if today < start {
        return Err(AppError::new(
            2,
            format!("Sample window is empty: base date {start} is after {today}."),
        ));
    }
    if !(config.base_rate.is_finite() && config.base_rate > 0.0) {
        return Err(AppError::new(2, "Sample generation needs a positive base rate."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;
    let mut z = move || normal.sample(&mut rng);

    let months = period_starts(start, today, 1);
    let quarters = period_starts(start, today, 3);
    let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= today).collect();

    let month_progress = |i: usize| progress(i, months.len());
    let day_progress = |i: usize| progress(i, days.len());

    let mut kr_m2 = Vec::with_capacity(months.len());
    let mut us_m2 = Vec::with_capacity(months.len());
    let mut kr_base_rate = Vec::with_capacity(months.len());
    let mut us_fed_rate = Vec::with_capacity(months.len());
    let mut kr_cpi = Vec::with_capacity(months.len());
    let mut us_cpi = Vec::with_capacity(months.len());
    let mut current_account = Vec::with_capacity(months.len());

    for (i, &date) in months.iter().enumerate() {
        let p = month_progress(i);
        let m = i as f64;
        let years = m / 12.0;

        let kr = exp_path(KR_M2_START, KR_M2_END, p) * (1.0 + M2_NOISE * z());
        let us = exp_path(US_M2_START, US_M2_END, p) * (1.0 + M2_NOISE * z());
        kr_m2.push(TimePoint::new(date, round_to(kr, 1)));
        us_m2.push(TimePoint::new(date, round_to(us, 1)));

        let kr_rate = (2.25 + 1.25 * (m / 18.0).sin()).max(0.5);
        let us_rate = (2.0 + 2.25 * (m / 15.0 + 1.0).sin()).max(0.25);
        kr_base_rate.push(TimePoint::new(date, quarter_point(kr_rate)));
        us_fed_rate.push(TimePoint::new(date, quarter_point(us_rate)));

        kr_cpi.push(TimePoint::new(date, round_to(100.0 * 1.022_f64.powf(years) + 0.2 * z(), 2)));
        us_cpi.push(TimePoint::new(date, round_to(217.0 * 1.026_f64.powf(years) + 0.3 * z(), 3)));

        let ca = 5e9 + 3e9 * (m / 9.0).sin() + 1e9 * z();
        current_account.push(TimePoint::new(date, ca.round()));
    }

    let mut kr_gdp = Vec::with_capacity(quarters.len());
    let mut us_gdp = Vec::with_capacity(quarters.len());
    let mut trade_balance = Vec::with_capacity(quarters.len());
    for (i, &date) in quarters.iter().enumerate() {
        let q = i as f64;
        let years = q / 4.0;
        kr_gdp.push(TimePoint::new(
            date,
            round_to(330_000.0 * 1.028_f64.powf(years) * (1.0 + 0.004 * z()), 1),
        ));
        us_gdp.push(TimePoint::new(
            date,
            round_to(15_600.0 * 1.022_f64.powf(years) * (1.0 + 0.004 * z()), 1),
        ));
        trade_balance.push(TimePoint::new(date, (8e9 + 6e9 * (q / 3.0).sin() + 2e9 * z()).round()));
    }

    let end_rate = config.base_rate * MARKET_RATE_DRIFT;
    let mut market_rate = Vec::with_capacity(days.len());
    let mut dxy = Vec::with_capacity(days.len());
    let mut vix = Vec::with_capacity(days.len());
    for (i, &date) in days.iter().enumerate() {
        let d = i as f64;
        let trend = config.base_rate + (end_rate - config.base_rate) * day_progress(i);
        let cycles = (d / 30.0).sin() * trend * 0.025 + (d / 90.0).sin() * trend * 0.015;
        let rate = trend + cycles + trend * RATE_NOISE * z();
        market_rate.push(TimePoint::new(date, round_to(rate, 2)));

        let index = 100.0 + 8.0 * (d / 365.0).sin() + 5.0 * (d / 90.0).sin() + z();
        dxy.push(TimePoint::new(date, round_to(index, 1)));

        let vol = (18.0 + 6.0 * (d / 200.0).sin() + 3.0 * z().abs()).max(9.0);
        vix.push(TimePoint::new(date, round_to(vol, 2)));
    }

    let mut raw = RawSeries::core(kr_m2, us_m2, market_rate);
    raw.origin = SeriesOrigin::Synthetic { seed };
    raw.dxy = Some(dxy);
    raw.kr_base_rate = Some(kr_base_rate);
    raw.us_fed_rate = Some(us_fed_rate);
    raw.vix = Some(vix);
    raw.kr_cpi = Some(kr_cpi);
    raw.us_cpi = Some(us_cpi);
    raw.kr_gdp_growth = Some(kr_gdp);
    raw.us_gdp_growth = Some(us_gdp);
    raw.current_account = Some(current_account);
    raw.trade_balance = Some(trade_balance);
    Ok(raw)
}

/// First day of every `step`-month period from `start`'s period through `end`.
fn period_starts(start: NaiveDate, end: NaiveDate, step: u32) -> Vec<NaiveDate> {
    let month0 = start.month0() - start.month0() % step;
    let Some(mut cur) = NaiveDate::from_ymd_opt(start.year(), month0 + 1, 1) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    while cur <= end {
        out.push(cur);
        match cur.checked_add_months(Months::new(step)) {
            Some(next) => cur = next,
            None => break,
        }
    }
    out
}

fn progress(i: usize, len: usize) -> f64 {
    if len <= 1 { 0.0 } else { i as f64 / (len - 1) as f64 }
}

fn exp_path(from: f64, to: f64, p: f64) -> f64 {
    from * (to / from).powf(p)
}

/// Policy rates move in 25bp steps.
fn quarter_point(rate: f64) -> f64 {
    (rate * 4.0).round() / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn config() -> AssembleConfig {
        AssembleConfig {
            base_date: d(2020, 1, 1),
            base_rate: 1167.0,
            base_kr_m2: None,
            base_us_m2: None,
        }
    }

    #[test]
    fn same_seed_reproduces_the_series() {
        let a = generate_raw(&config(), 7, d(2021, 6, 30)).unwrap();
        let b = generate_raw(&config(), 7, d(2021, 6, 30)).unwrap();
        assert_eq!(a.kr_m2, b.kr_m2);
        assert_eq!(a.market_rate, b.market_rate);
        assert_eq!(a.vix, b.vix);

        let c = generate_raw(&config(), 8, d(2021, 6, 30)).unwrap();
        assert_ne!(a.market_rate, c.market_rate);
    }

    #[test]
    fn series_cover_the_window_at_their_frequency() {
        let raw = generate_raw(&config(), 1, d(2021, 6, 30)).unwrap();
        assert_eq!(raw.origin, SeriesOrigin::Synthetic { seed: 1 });
        assert_eq!(raw.kr_m2.len(), 18);
        assert_eq!(raw.kr_m2[0].date, d(2020, 1, 1));
        assert_eq!(raw.market_rate.len(), 547);
        assert_eq!(raw.market_rate.last().unwrap().date, d(2021, 6, 30));
        assert_eq!(raw.kr_gdp_growth.as_ref().unwrap().len(), 6);
        assert!(raw.market_rate.iter().all(|p| p.value > 0.0 && p.value.is_finite()));
        assert!(raw.vix.as_ref().unwrap().iter().all(|p| p.value >= 9.0));
    }

    #[test]
    fn m2_starts_near_its_base_level() {
        let raw = generate_raw(&config(), 3, d(2020, 12, 31)).unwrap();
        let kr0 = raw.kr_m2[0].value;
        let us0 = raw.us_m2[0].value;
        assert!((kr0 / KR_M2_START - 1.0).abs() < 0.05, "kr m2 {kr0}");
        assert!((us0 / US_M2_START - 1.0).abs() < 0.05, "us m2 {us0}");
    }

    #[test]
    fn window_ending_before_base_date_is_rejected() {
        let err = generate_raw(&config(), 1, d(2019, 12, 31)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn quarter_starts_align_to_calendar_quarters() {
        let q = period_starts(d(2020, 2, 15), d(2020, 12, 31), 3);
        assert_eq!(q, vec![d(2020, 1, 1), d(2020, 4, 1), d(2020, 7, 1), d(2020, 10, 1)]);
    }
}
