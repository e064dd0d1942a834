//! Weighted composite score across macro indicators.
//!
//! Each indicator is first mapped to a score in `[-1, +1]` (positive = factors
//! favouring KRW strength). The composite is the weighted mean of the scores that
//! are actually present, scaled to `[-100, +100]`.

use crate::domain::DailyRecord;
use crate::math::round_to;

/// Per-indicator scores in `[-1, +1]`. Absent scores are skipped, not zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositeScores {
    pub rate_diff: Option<f64>,
    pub current_account: Option<f64>,
    pub m2_gap: Option<f64>,
    pub gdp_growth: Option<f64>,
    pub cpi_gap: Option<f64>,
    pub vix: Option<f64>,
}

/// Indicator weights. `Default` sums to 1.00.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeWeights {
    pub rate_diff: f64,
    pub current_account: f64,
    pub m2_gap: f64,
    pub gdp_growth: f64,
    pub cpi_gap: f64,
    pub vix: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            rate_diff: 0.30,
            current_account: 0.25,
            m2_gap: 0.20,
            gdp_growth: 0.10,
            cpi_gap: 0.10,
            vix: 0.05,
        }
    }
}

// Scale at which an indicator saturates to a full ±1 score.
const RATE_DIFF_SCALE_PP: f64 = 2.0;
const CURRENT_ACCOUNT_SCALE_USD: f64 = 10e9;
const GAP_SCALE_PCT: f64 = 20.0;
const GDP_GROWTH_SCALE_PP: f64 = 2.0;
const CPI_GAP_SCALE_PCT: f64 = 20.0;
const VIX_NEUTRAL: f64 = 20.0;

impl CompositeScores {
    /// Score the indicators available on a record.
    pub fn from_record(record: &DailyRecord) -> Self {
        let cpi_gap = record
            .ppp_rate
            .filter(|ppp| *ppp != 0.0)
            .map(|ppp| (record.market_rate - ppp) / ppp * 100.0 / CPI_GAP_SCALE_PCT);

        Self {
            rate_diff: record.rate_diff.map(|v| v / RATE_DIFF_SCALE_PP),
            current_account: record.current_account.map(|v| v / CURRENT_ACCOUNT_SCALE_USD),
            m2_gap: Some(record.gap / GAP_SCALE_PCT),
            gdp_growth: record.gdp_growth_diff.map(|v| v / GDP_GROWTH_SCALE_PP),
            cpi_gap,
            vix: record.vix.map(|v| (VIX_NEUTRAL - v) / VIX_NEUTRAL),
        }
    }
}

/// Weighted mean of the present scores × 100, 1 decimal. No scores → 0.
pub fn composite_score(scores: &CompositeScores, weights: &CompositeWeights) -> f64 {
    let pairs = [
        (scores.rate_diff, weights.rate_diff),
        (scores.current_account, weights.current_account),
        (scores.m2_gap, weights.m2_gap),
        (scores.gdp_growth, weights.gdp_growth),
        (scores.cpi_gap, weights.cpi_gap),
        (scores.vix, weights.vix),
    ];

    let mut total_score = 0.0;
    let mut total_weight = 0.0;
    for (score, weight) in pairs {
        let Some(score) = score.filter(|s| s.is_finite()) else {
            continue;
        };
        total_score += score.clamp(-1.0, 1.0) * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        round_to(total_score / total_weight * 100.0, 1)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_weights_sum_to_one() {
        let w = CompositeWeights::default();
        let sum = w.rate_diff + w.current_account + w.m2_gap + w.gdp_growth + w.cpi_gap + w.vix;
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn no_scores_gives_zero() {
        assert_eq!(composite_score(&CompositeScores::default(), &CompositeWeights::default()), 0.0);
    }

    #[test]
    fn missing_scores_are_excluded_from_the_denominator() {
        let scores = CompositeScores {
            rate_diff: Some(0.5),
            m2_gap: Some(-0.5),
            ..Default::default()
        };
        // (0.5×0.30 − 0.5×0.20) / 0.50 × 100 = 10.0
        assert_eq!(composite_score(&scores, &CompositeWeights::default()), 10.0);
    }

    #[test]
    fn weights_can_be_overridden_individually() {
        let scores = CompositeScores {
            rate_diff: Some(1.0),
            vix: Some(-1.0),
            ..Default::default()
        };
        let weights = CompositeWeights {
            vix: 0.30,
            ..Default::default()
        };
        assert_eq!(composite_score(&scores, &weights), 0.0);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let scores = CompositeScores {
            m2_gap: Some(3.0),
            ..Default::default()
        };
        assert_eq!(composite_score(&scores, &CompositeWeights::default()), 100.0);
    }

    #[test]
    fn record_scores_follow_indicator_direction() {
        let record = DailyRecord {
            market_rate: 1400.0,
            gap: 10.0,
            rate_diff: Some(-1.0),
            vix: Some(30.0),
            ..Default::default()
        };
        let scores = CompositeScores::from_record(&record);
        assert_eq!(scores.m2_gap, Some(0.5));
        assert_eq!(scores.rate_diff, Some(-0.5));
        assert_eq!(scores.vix, Some(-0.5));
        assert_eq!(scores.cpi_gap, None);
    }
}
