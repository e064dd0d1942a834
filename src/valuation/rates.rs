//! Closed-form valuation formulas.
//!
//! Every function validates its denominators up front and returns a
//! `ValuationError` instead of producing `inf`/`NaN`.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use crate::domain::TimePoint;
use crate::error::ValuationError;
use crate::math::round_to;

/// Fair USD/KRW rate implied by relative M2 growth since the base period.
///
/// `base_rate × (cur_kr / base_kr) / (cur_us / base_us)`, rounded to whole won.
/// Equal growth on both sides returns `base_rate` untouched.
pub fn fair_rate(
    base_rate: f64,
    base_kr_m2: f64,
    base_us_m2: f64,
    cur_kr_m2: f64,
    cur_us_m2: f64,
) -> Result<f64, ValuationError> {
    relative_growth_rate("fair_rate", base_rate, base_kr_m2, base_us_m2, cur_kr_m2, cur_us_m2)
}

/// Purchasing-power-parity rate: the fair-rate formula driven by CPI ratios.
pub fn ppp_rate(
    base_rate: f64,
    base_kr_cpi: f64,
    base_us_cpi: f64,
    cur_kr_cpi: f64,
    cur_us_cpi: f64,
) -> Result<f64, ValuationError> {
    relative_growth_rate("ppp_rate", base_rate, base_kr_cpi, base_us_cpi, cur_kr_cpi, cur_us_cpi)
}

fn relative_growth_rate(
    what: &'static str,
    base_rate: f64,
    base_kr: f64,
    base_us: f64,
    cur_kr: f64,
    cur_us: f64,
) -> Result<f64, ValuationError> {
    ensure_finite(what, &[base_rate, base_kr, base_us, cur_kr, cur_us])?;
    if base_kr == 0.0 || base_us == 0.0 || cur_us == 0.0 {
        return Err(ValuationError::ZeroDenominator(what));
    }

    let kr_ratio = cur_kr / base_kr;
    let us_ratio = cur_us / base_us;
    if kr_ratio == us_ratio {
        return Ok(base_rate);
    }
    Ok((base_rate * (kr_ratio / us_ratio)).round())
}

/// Percentage gap of the market rate over the fair rate, 1 decimal.
///
/// Positive: KRW undervalued relative to the model. Negative: overvalued.
pub fn gap(market_rate: f64, fair_rate: f64) -> Result<f64, ValuationError> {
    ensure_finite("gap", &[market_rate, fair_rate])?;
    if fair_rate == 0.0 {
        return Err(ValuationError::ZeroDenominator("gap"));
    }
    Ok(round_to((market_rate - fair_rate) / fair_rate * 100.0, 1))
}

/// Korea minus US policy rate, percentage points, 2 decimals.
pub fn interest_rate_diff(kr_rate: f64, us_rate: f64) -> f64 {
    round_to(kr_rate - us_rate, 2)
}

/// Korea minus US real GDP growth, percentage points, 1 decimal.
pub fn gdp_growth_diff(kr_growth: f64, us_growth: f64) -> f64 {
    round_to(kr_growth - us_growth, 1)
}

/// Ratio of Korean to US year-over-year M2 growth, 3 decimals.
///
/// Above 1: Korea is expanding money supply faster than the US.
pub fn m2_growth_ratio(
    cur_kr_m2: f64,
    prev_kr_m2: f64,
    cur_us_m2: f64,
    prev_us_m2: f64,
) -> Result<f64, ValuationError> {
    ensure_finite("m2_growth_ratio", &[cur_kr_m2, prev_kr_m2, cur_us_m2, prev_us_m2])?;
    if prev_kr_m2 == 0.0 || prev_us_m2 == 0.0 {
        return Err(ValuationError::ZeroDenominator("m2_growth_ratio"));
    }

    let kr_growth = (cur_kr_m2 - prev_kr_m2) / prev_kr_m2;
    let us_growth = (cur_us_m2 - prev_us_m2) / prev_us_m2;
    if us_growth == 0.0 {
        return Err(ValuationError::ZeroDenominator("m2_growth_ratio (US growth)"));
    }
    Ok(round_to(kr_growth / us_growth, 3))
}

/// Year-over-year growth (percent, 1 decimal) of a level series.
///
/// A point produces a growth value only when an observation exists exactly
/// twelve months earlier and that observation is non-zero.
pub fn yoy_growth(points: &[TimePoint]) -> Vec<TimePoint> {
    let levels: BTreeMap<NaiveDate, f64> = points
        .iter()
        .filter(|p| p.value.is_finite())
        .map(|p| (p.date, p.value))
        .collect();

    levels
        .iter()
        .filter_map(|(&date, &cur)| {
            let prev_date = date.checked_sub_months(Months::new(12))?;
            let prev = *levels.get(&prev_date)?;
            if prev == 0.0 {
                return None;
            }
            Some(TimePoint::new(date, round_to((cur / prev - 1.0) * 100.0, 1)))
        })
        .collect()
}

fn ensure_finite(what: &'static str, values: &[f64]) -> Result<(), ValuationError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValuationError::NonFinite(what))
    }
}
