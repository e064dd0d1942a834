//! Rule engine: five conditions → one investment signal.
//!
//! The M2 gap is the necessary condition; rate differential, dollar index and VIX
//! are blocking "trigger" conditions; the current account is informational.

pub mod conditions;

pub use conditions::*;

use serde::{Deserialize, Serialize};

use crate::domain::{DailyRecord, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalLevel {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalLevel {
    pub fn display_name(self) -> &'static str {
        match self {
            SignalLevel::StrongBuy => "STRONG BUY",
            SignalLevel::Buy => "BUY",
            SignalLevel::Hold => "HOLD",
            SignalLevel::Sell => "SELL",
            SignalLevel::StrongSell => "STRONG SELL",
        }
    }
}

/// The five evaluated conditions, one per `ConditionKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub value: InvestmentCondition,
    pub rate_diff: InvestmentCondition,
    pub dxy: InvestmentCondition,
    pub vix: InvestmentCondition,
    pub fundamental: InvestmentCondition,
}

impl Conditions {
    pub fn evaluate(record: &DailyRecord) -> Self {
        Self {
            value: ConditionKind::Value.evaluate(record),
            rate_diff: ConditionKind::RateDiff.evaluate(record),
            dxy: ConditionKind::Dxy.evaluate(record),
            vix: ConditionKind::Vix.evaluate(record),
            fundamental: ConditionKind::Fundamental.evaluate(record),
        }
    }

    pub fn get(&self, kind: ConditionKind) -> &InvestmentCondition {
        match kind {
            ConditionKind::Value => &self.value,
            ConditionKind::RateDiff => &self.rate_diff,
            ConditionKind::Dxy => &self.dxy,
            ConditionKind::Vix => &self.vix,
            ConditionKind::Fundamental => &self.fundamental,
        }
    }

    /// Conditions in display order.
    pub fn iter(&self) -> impl Iterator<Item = &InvestmentCondition> {
        ConditionKind::ALL.into_iter().map(|kind| self.get(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentEnvironment {
    pub overall_signal: SignalLevel,
    pub overall_message: String,
    pub conditions: Conditions,
    pub blockers: Vec<String>,
    pub ready_to_buy: bool,
    pub timing_guidance: String,
}

/// Latest record carrying every critical indicator, plus the newer records
/// that lack one.
///
/// Indicators are matched on their exact date, so the newest rows (a same-day
/// spot rate, lagging DXY/VIX publications) often have gaps.
pub fn latest_complete(dataset: &Dataset) -> Option<(&DailyRecord, &[DailyRecord])> {
    let idx = dataset
        .data
        .iter()
        .rposition(|r| ConditionKind::CRITICAL.into_iter().all(|kind| kind.current(r).is_some()))?;
    Some((&dataset.data[idx], &dataset.data[idx + 1..]))
}

/// Evaluate all conditions for one record and derive the overall signal.
pub fn evaluate(record: &DailyRecord) -> InvestmentEnvironment {
    let conditions = Conditions::evaluate(record);

    let blockers: Vec<String> = ConditionKind::CRITICAL
        .into_iter()
        .map(|kind| conditions.get(kind))
        .filter(|c| c.status == ConditionStatus::Fail)
        .filter_map(|c| c.current.map(|v| c.kind.blocker(v)))
        .collect();

    let value = conditions.value.status;
    let critical_pass = ConditionKind::CRITICAL
        .into_iter()
        .all(|kind| conditions.get(kind).status == ConditionStatus::Pass);
    let ready_to_buy = value == ConditionStatus::Pass && critical_pass;

    let (overall_signal, overall_message, timing_guidance) = if ready_to_buy {
        let signal = if record.gap > 20.0 { SignalLevel::StrongBuy } else { SignalLevel::Buy };
        (
            signal,
            "Buy signal",
            "All conditions are met. This is a point at which investing can be considered.".to_string(),
        )
    } else if value == ConditionStatus::Pass {
        (
            SignalLevel::Hold,
            "Hold (value attractive, timing unfavourable)",
            unfavourable_timing_guidance(&conditions, &blockers),
        )
    } else if value == ConditionStatus::Fail {
        let signal = if record.gap < -20.0 { SignalLevel::StrongSell } else { SignalLevel::Sell };
        (
            signal,
            "Sell / neutral",
            "The won is overvalued; this is not a suitable time to buy.".to_string(),
        )
    } else {
        (
            SignalLevel::Hold,
            "Hold (neutral range)",
            "Within the fair-value range. Keep monitoring the other conditions.".to_string(),
        )
    };

    InvestmentEnvironment {
        overall_signal,
        overall_message: overall_message.to_string(),
        conditions,
        blockers,
        ready_to_buy,
        timing_guidance,
    }
}

fn unfavourable_timing_guidance(conditions: &Conditions, blockers: &[String]) -> String {
    if !blockers.is_empty() {
        return format!(
            "Value is attractive on M2 terms, but blocking conditions are unfavourable: {}. Re-check when they improve.",
            blockers.join("; ")
        );
    }

    let missing: Vec<&str> = ConditionKind::CRITICAL
        .into_iter()
        .map(|kind| conditions.get(kind))
        .filter(|c| c.status == ConditionStatus::NotApplicable)
        .map(|c| c.name.as_str())
        .collect();
    format!(
        "Value is attractive on M2 terms, but timing cannot be confirmed without data for: {}. Re-check when it is available.",
        missing.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(gap: f64) -> DailyRecord {
        DailyRecord {
            gap,
            rate_diff: Some(0.5),
            dxy: Some(105.0),
            vix: Some(18.0),
            current_account: Some(5e9),
            ..Default::default()
        }
    }

    #[test]
    fn latest_complete_skips_records_missing_critical_indicators() {
        use chrono::{NaiveDate, TimeZone, Utc};

        use crate::domain::{DatasetMetadata, Sources};

        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let mut dataset = Dataset {
            metadata: DatasetMetadata {
                last_updated: Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
                base_date: day(1),
                base_rate: 1300.0,
                base_kr_m2: 3000.0,
                base_us_m2: 20000.0,
                sources: Sources::default(),
            },
            data: vec![
                DailyRecord { date: day(4), ..record(22.0) },
                DailyRecord { date: day(5), ..record(21.0) },
                DailyRecord { date: day(6), vix: None, ..record(20.5) },
            ],
        };

        let (record, skipped) = latest_complete(&dataset).unwrap();
        assert_eq!(record.date, day(5));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].date, day(6));
        assert!(evaluate(record).ready_to_buy);

        dataset.data.iter_mut().for_each(|r| r.dxy = None);
        assert!(latest_complete(&dataset).is_none());
    }

    #[test]
    fn all_conditions_pass_with_large_gap_is_strong_buy() {
        let env = evaluate(&record(22.0));
        assert_eq!(env.overall_signal, SignalLevel::StrongBuy);
        assert!(env.ready_to_buy);
        assert!(env.blockers.is_empty());
        assert!(env.conditions.iter().all(|c| c.status == ConditionStatus::Pass));
    }

    #[test]
    fn moderate_gap_with_all_pass_is_buy() {
        let env = evaluate(&record(18.0));
        assert_eq!(env.overall_signal, SignalLevel::Buy);
        assert!(env.ready_to_buy);
    }

    #[test]
    fn failed_rate_differential_blocks_the_buy() {
        let rec = DailyRecord {
            rate_diff: Some(-2.5),
            current_account: None,
            ..record(22.0)
        };
        let env = evaluate(&rec);
        assert_eq!(env.overall_signal, SignalLevel::Hold);
        assert!(!env.ready_to_buy);
        assert_eq!(env.blockers.len(), 1);
        assert!(env.blockers[0].starts_with("Rate differential"));
        assert!(env.blockers[0].contains("-2.50%p"));
        assert!(env.timing_guidance.contains(&env.blockers[0]));
    }

    #[test]
    fn missing_critical_data_prevents_buy_without_blockers() {
        let rec = DailyRecord {
            vix: None,
            ..record(22.0)
        };
        let env = evaluate(&rec);
        assert_eq!(env.overall_signal, SignalLevel::Hold);
        assert!(!env.ready_to_buy);
        assert!(env.blockers.is_empty());
        assert!(env.timing_guidance.contains("Volatility (VIX)"));
    }

    #[test]
    fn overvaluation_yields_sell_levels() {
        assert_eq!(evaluate(&record(-15.1)).overall_signal, SignalLevel::Sell);
        assert_eq!(evaluate(&record(-25.0)).overall_signal, SignalLevel::StrongSell);
    }

    #[test]
    fn neutral_gap_is_hold_even_when_critical_conditions_fail() {
        let rec = DailyRecord {
            vix: Some(30.0),
            ..record(15.0)
        };
        let env = evaluate(&rec);
        assert_eq!(env.conditions.value.status, ConditionStatus::NotApplicable);
        assert_eq!(env.overall_signal, SignalLevel::Hold);
        assert_eq!(env.overall_message, "Hold (neutral range)");
        assert_eq!(env.blockers.len(), 1);
    }

    #[test]
    fn environment_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(evaluate(&record(22.0))).unwrap();
        assert_eq!(json["overallSignal"], "STRONG_BUY");
        assert_eq!(json["readyToBuy"], true);
        assert_eq!(json["conditions"]["rateDiff"]["isCritical"], true);
        assert_eq!(json["conditions"]["value"]["status"], "PASS");
    }
}
