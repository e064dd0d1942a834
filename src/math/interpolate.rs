//! Monthly → daily linear interpolation.
//!
//! Money-supply statistics are published once a month. The assembler needs a
//! value for every calendar day, so each month is filled by a straight line from
//! that month's observation towards the next month's observation:
//!
//! ```text
//! v(d) = v_i + (v_{i+1} - v_i) × (d - day_i) / (days_in_month - day_i)
//! ```
//!
//! The last known month is carried forward flat. Nothing is extrapolated
//! backwards: dates before the first known month have no value.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::TimePoint;
use crate::error::ValuationError;

/// Interpolate a value for `target_day` between two month anchors.
///
/// Requires `end_day > start_day` and `start_day <= target_day <= end_day`.
/// The result is rounded half away from zero to an integer, except at the
/// interval ends which return the anchor values unchanged.
pub fn interpolate(
    start_value: f64,
    end_value: f64,
    start_day: u32,
    end_day: u32,
    target_day: u32,
) -> Result<f64, ValuationError> {
    if end_day <= start_day {
        return Err(ValuationError::DegenerateInterval {
            start: start_day,
            end: end_day,
        });
    }
    if target_day < start_day || target_day > end_day {
        return Err(ValuationError::TargetOutOfRange {
            start: start_day,
            end: end_day,
            target: target_day,
        });
    }
    if !(start_value.is_finite() && end_value.is_finite()) {
        return Err(ValuationError::NonFinite("interpolate"));
    }

    if target_day == start_day {
        return Ok(start_value);
    }
    if target_day == end_day {
        return Ok(end_value);
    }

    let span = f64::from(end_day - start_day);
    let offset = f64::from(target_day - start_day);
    let value = start_value + (end_value - start_value) * offset / span;
    Ok(value.round())
}

/// Expand monthly observations into one value per calendar day in `[start, end]`.
///
/// - input is sorted and reduced to one observation per calendar month (first wins)
/// - days of a month before its own observation day are skipped
/// - months without an observation are skipped
/// - the final known month, and every later date, carries the last value forward
pub fn interpolate_daily(
    points: &[TimePoint],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<NaiveDate, f64>, ValuationError> {
    let monthly = one_per_month(points);
    let mut out = BTreeMap::new();

    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return Ok(out);
    };
    let first_key = month_key(first.date);
    let last_key = month_key(last.date);

    let index: BTreeMap<(i32, u32), usize> = monthly
        .iter()
        .enumerate()
        .map(|(i, p)| (month_key(p.date), i))
        .collect();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let key = month_key(date);
        if key < first_key {
            continue;
        }
        if key >= last_key {
            out.insert(date, last.value);
            continue;
        }

        let Some(&i) = index.get(&key) else {
            continue;
        };
        let this = monthly[i];
        let next = monthly[i + 1];

        let start_day = this.date.day();
        let target_day = date.day();
        if target_day < start_day {
            continue;
        }

        let end_day = days_in_month(date.year(), date.month());
        let value = if start_day == end_day {
            this.value
        } else {
            interpolate(this.value, next.value, start_day, end_day, target_day)?
        };
        out.insert(date, value);
    }

    Ok(out)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn one_per_month(points: &[TimePoint]) -> Vec<TimePoint> {
    let mut sorted: Vec<TimePoint> = points.iter().copied().filter(|p| p.value.is_finite()).collect();
    sorted.sort_by_key(|p| p.date);
    sorted.dedup_by_key(|p| month_key(p.date));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn interpolate_hits_both_anchors_exactly() {
        assert_eq!(interpolate(3750.0, 3800.0, 1, 31, 1).unwrap(), 3750.0);
        assert_eq!(interpolate(3750.0, 3800.0, 1, 31, 31).unwrap(), 3800.0);
    }

    #[test]
    fn interpolate_mid_month_rounds_to_integer() {
        // 3750 + 50 × 14/30 = 3773.33…
        assert_eq!(interpolate(3750.0, 3800.0, 1, 31, 15).unwrap(), 3773.0);
        // 10 + 1 × 15/30 = 10.5 rounds away from zero.
        assert_eq!(interpolate(10.0, 11.0, 1, 31, 16).unwrap(), 11.0);
        assert_eq!(interpolate(-10.0, -11.0, 1, 31, 16).unwrap(), -11.0);
    }

    #[test]
    fn interpolate_rejects_degenerate_or_out_of_range_input() {
        assert_eq!(
            interpolate(1.0, 2.0, 5, 5, 5),
            Err(ValuationError::DegenerateInterval { start: 5, end: 5 })
        );
        assert_eq!(
            interpolate(1.0, 2.0, 1, 30, 31),
            Err(ValuationError::TargetOutOfRange { start: 1, end: 30, target: 31 })
        );
        assert!(interpolate(f64::NAN, 2.0, 1, 30, 3).is_err());
    }

    #[test]
    fn daily_series_fills_month_and_carries_last_value_forward() {
        let points = vec![
            TimePoint::new(d(2024, 10, 1), 3750.0),
            TimePoint::new(d(2024, 11, 1), 3800.0),
        ];
        let daily = interpolate_daily(&points, d(2024, 9, 28), d(2024, 11, 5)).unwrap();

        assert!(daily.get(&d(2024, 9, 30)).is_none());
        assert_eq!(daily[&d(2024, 10, 1)], 3750.0);
        assert_eq!(daily[&d(2024, 10, 15)], 3773.0);
        assert_eq!(daily[&d(2024, 10, 31)], 3800.0);
        for day in 1..=5 {
            assert_eq!(daily[&d(2024, 11, day)], 3800.0);
        }
        assert_eq!(daily.len(), 31 + 5);
    }

    #[test]
    fn daily_series_sorts_and_dedupes_input() {
        let points = vec![
            TimePoint::new(d(2024, 11, 1), 3800.0),
            TimePoint::new(d(2024, 10, 1), 3750.0),
            TimePoint::new(d(2024, 10, 1), 9999.0),
        ];
        let daily = interpolate_daily(&points, d(2024, 10, 1), d(2024, 10, 31)).unwrap();
        assert_eq!(daily[&d(2024, 10, 1)], 3750.0);
        assert_eq!(daily[&d(2024, 10, 15)], 3773.0);
    }

    #[test]
    fn months_without_observation_are_absent() {
        let points = vec![
            TimePoint::new(d(2024, 1, 1), 100.0),
            TimePoint::new(d(2024, 3, 1), 200.0),
        ];
        let daily = interpolate_daily(&points, d(2024, 1, 1), d(2024, 3, 10)).unwrap();
        assert!(daily.contains_key(&d(2024, 1, 20)));
        assert!(!daily.contains_key(&d(2024, 2, 10)));
        assert_eq!(daily[&d(2024, 3, 10)], 200.0);
    }

    #[test]
    fn empty_input_gives_empty_map() {
        let daily = interpolate_daily(&[], d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert!(daily.is_empty());
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }
}
