//! The five investment conditions.
//!
//! Each `ConditionKind` reads one field of a `DailyRecord` and maps it to a
//! status through a fixed threshold. Message phrasing branches on extra
//! severity levels; status never does.

use serde::{Deserialize, Serialize};

use crate::domain::DailyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ConditionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConditionStatus::Pass => "PASS",
            ConditionStatus::Fail => "FAIL",
            ConditionStatus::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKind {
    /// M2 valuation gap. Necessary condition, not blocking.
    Value,
    /// Korea − US policy rate. Blocking.
    RateDiff,
    /// Dollar index. Blocking.
    Dxy,
    /// Equity volatility. Blocking.
    Vix,
    /// Current-account balance. Informational.
    Fundamental,
}

/// Evaluated condition, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentCondition {
    pub kind: ConditionKind,
    pub name: String,
    pub status: ConditionStatus,
    pub current: Option<f64>,
    pub threshold: f64,
    pub threshold_label: String,
    pub message: String,
    pub is_critical: bool,
}

const VALUE_THRESHOLD: f64 = 15.0;
const RATE_DIFF_THRESHOLD: f64 = -1.5;
const DXY_THRESHOLD: f64 = 110.0;
const VIX_THRESHOLD: f64 = 25.0;
const CURRENT_ACCOUNT_THRESHOLD: f64 = 0.0;

impl ConditionKind {
    pub const ALL: [ConditionKind; 5] = [
        ConditionKind::Value,
        ConditionKind::RateDiff,
        ConditionKind::Dxy,
        ConditionKind::Vix,
        ConditionKind::Fundamental,
    ];

    pub const CRITICAL: [ConditionKind; 3] = [ConditionKind::RateDiff, ConditionKind::Dxy, ConditionKind::Vix];

    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Value => "Valuation (M2 gap)",
            ConditionKind::RateDiff => "Carry (rate differential)",
            ConditionKind::Dxy => "Sentiment (dollar index)",
            ConditionKind::Vix => "Volatility (VIX)",
            ConditionKind::Fundamental => "Fundamentals (current account)",
        }
    }

    pub fn threshold(self) -> f64 {
        match self {
            ConditionKind::Value => VALUE_THRESHOLD,
            ConditionKind::RateDiff => RATE_DIFF_THRESHOLD,
            ConditionKind::Dxy => DXY_THRESHOLD,
            ConditionKind::Vix => VIX_THRESHOLD,
            ConditionKind::Fundamental => CURRENT_ACCOUNT_THRESHOLD,
        }
    }

    pub fn threshold_label(self) -> &'static str {
        match self {
            ConditionKind::Value => "above +15%",
            ConditionKind::RateDiff => "above -1.5%p",
            ConditionKind::Dxy => "below 110",
            ConditionKind::Vix => "below 25",
            ConditionKind::Fundamental => "surplus",
        }
    }

    pub fn is_critical(self) -> bool {
        Self::CRITICAL.contains(&self)
    }

    /// The record field this condition reads.
    pub fn current(self, record: &DailyRecord) -> Option<f64> {
        match self {
            ConditionKind::Value => Some(record.gap),
            ConditionKind::RateDiff => record.rate_diff,
            ConditionKind::Dxy => record.dxy,
            ConditionKind::Vix => record.vix,
            ConditionKind::Fundamental => record.current_account,
        }
    }

    /// Map a field value to a status.
    pub fn status_for(self, value: Option<f64>) -> ConditionStatus {
        let Some(v) = value else {
            return ConditionStatus::NotApplicable;
        };
        let pass = match self {
            ConditionKind::Value => {
                if v > VALUE_THRESHOLD {
                    true
                } else if v < -VALUE_THRESHOLD {
                    false
                } else {
                    return ConditionStatus::NotApplicable;
                }
            }
            ConditionKind::RateDiff => v > RATE_DIFF_THRESHOLD,
            ConditionKind::Dxy => v < DXY_THRESHOLD,
            ConditionKind::Vix => v < VIX_THRESHOLD,
            ConditionKind::Fundamental => v > CURRENT_ACCOUNT_THRESHOLD,
        };
        if pass {
            ConditionStatus::Pass
        } else {
            ConditionStatus::Fail
        }
    }

    pub fn evaluate(self, record: &DailyRecord) -> InvestmentCondition {
        let current = self.current(record);
        let status = self.status_for(current);
        InvestmentCondition {
            kind: self,
            name: self.name().to_string(),
            status,
            current,
            threshold: self.threshold(),
            threshold_label: self.threshold_label().to_string(),
            message: self.message(current, status),
            is_critical: self.is_critical(),
        }
    }

    /// Blocker line for a failed critical condition.
    pub fn blocker(self, current: f64) -> String {
        match self {
            ConditionKind::RateDiff => format!(
                "Rate differential: {} required (current: {current:.2}%p)",
                self.threshold_label()
            ),
            ConditionKind::Dxy => format!("Dollar index: {} required (current: {current:.1})", self.threshold_label()),
            ConditionKind::Vix => format!("VIX: {} required (current: {current:.1})", self.threshold_label()),
            ConditionKind::Value | ConditionKind::Fundamental => {
                format!("{}: {} required (current: {current:.1})", self.name(), self.threshold_label())
            }
        }
    }

    fn message(self, current: Option<f64>, status: ConditionStatus) -> String {
        let Some(v) = current else {
            return "No data".to_string();
        };
        let pass = status == ConditionStatus::Pass;

        match self {
            ConditionKind::Value => match status {
                ConditionStatus::Pass => format!(
                    "Undervalued. M2 gap {v:+.1}% (threshold: above +15%). Attractive value for a long-term position."
                ),
                ConditionStatus::Fail => format!(
                    "Overvalued. M2 gap {v:+.1}% (threshold: above +15%). Not a range to buy in."
                ),
                ConditionStatus::NotApplicable => format!(
                    "Fair-value range. M2 gap {v:+.1}% (range: -15% to +15%). No clear under- or overvaluation."
                ),
            },
            ConditionKind::RateDiff => {
                if pass {
                    let color = if v > 1.0 {
                        "Higher Korean rates favour holding KRW."
                    } else {
                        "The rate gap is limited."
                    };
                    format!("Acceptable. Rate differential {v:+.2}%p (threshold: above -1.5%p). {color} Condition met.")
                } else if v < -2.0 {
                    format!(
                        "US rates are far higher. Rate differential {v:+.2}%p (threshold: above -1.5%p). Holding dollars is strongly favoured. Condition not met."
                    )
                } else {
                    format!(
                        "US rates are higher. Rate differential {v:+.2}%p (threshold: above -1.5%p). Holding dollars is favoured. Condition not met."
                    )
                }
            }
            ConditionKind::Dxy => {
                if pass {
                    format!("Normal range. DXY {v:.1} (threshold: below 110). No extreme dollar strength. Condition met.")
                } else if v >= 120.0 {
                    format!(
                        "Historic dollar strength. DXY {v:.1} (threshold: below 110). Risk aversion is severe. Condition not met."
                    )
                } else {
                    format!(
                        "Strong dollar. DXY {v:.1} (threshold: below 110). Safe-haven demand is elevated. Condition not met."
                    )
                }
            }
            ConditionKind::Vix => {
                if pass {
                    let color = if v < 15.0 {
                        "Markets are very calm."
                    } else {
                        "Volatility is manageable."
                    };
                    format!("Normal range. VIX {v:.1} (threshold: below 25). {color} Condition met.")
                } else if v >= 40.0 {
                    format!(
                        "Extreme fear. VIX {v:.1} (threshold: below 25). Sharp risk-asset sell-offs are likely. Condition not met."
                    )
                } else {
                    format!(
                        "Risk-off. VIX {v:.1} (threshold: below 25). Unstable markets pressure capital outflows. Condition not met."
                    )
                }
            }
            ConditionKind::Fundamental => {
                let billions = v / 1e9;
                if pass {
                    format!(
                        "Surplus. Current account ${billions:.1}B (threshold: surplus). Exports support the won. Positive factor."
                    )
                } else {
                    format!(
                        "Deficit. Current account ${billions:.1}B (threshold: surplus). Deficits weigh on the won. Negative factor."
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_condition_boundaries() {
        let k = ConditionKind::Value;
        assert_eq!(k.status_for(Some(15.0)), ConditionStatus::NotApplicable);
        assert_eq!(k.status_for(Some(-15.0)), ConditionStatus::NotApplicable);
        assert_eq!(k.status_for(Some(15.1)), ConditionStatus::Pass);
        assert_eq!(k.status_for(Some(-15.1)), ConditionStatus::Fail);
    }

    #[test]
    fn critical_condition_boundaries() {
        assert_eq!(ConditionKind::RateDiff.status_for(Some(-1.5)), ConditionStatus::Fail);
        assert_eq!(ConditionKind::RateDiff.status_for(Some(-1.49)), ConditionStatus::Pass);
        assert_eq!(ConditionKind::Dxy.status_for(Some(110.0)), ConditionStatus::Fail);
        assert_eq!(ConditionKind::Dxy.status_for(Some(109.9)), ConditionStatus::Pass);
        assert_eq!(ConditionKind::Vix.status_for(Some(25.0)), ConditionStatus::Fail);
        assert_eq!(ConditionKind::Vix.status_for(None), ConditionStatus::NotApplicable);
        assert_eq!(ConditionKind::Fundamental.status_for(Some(0.0)), ConditionStatus::Fail);
    }

    #[test]
    fn only_rate_dxy_and_vix_are_critical() {
        let critical: Vec<_> = ConditionKind::ALL.into_iter().filter(|k| k.is_critical()).collect();
        assert_eq!(critical, ConditionKind::CRITICAL.to_vec());
    }

    #[test]
    fn messages_branch_on_severity_without_changing_status() {
        let record = DailyRecord {
            vix: Some(45.0),
            dxy: Some(112.0),
            rate_diff: Some(-2.5),
            ..Default::default()
        };
        let vix = ConditionKind::Vix.evaluate(&record);
        assert_eq!(vix.status, ConditionStatus::Fail);
        assert!(vix.message.starts_with("Extreme fear"));

        let dxy = ConditionKind::Dxy.evaluate(&record);
        assert_eq!(dxy.status, ConditionStatus::Fail);
        assert!(dxy.message.starts_with("Strong dollar"));

        let rate = ConditionKind::RateDiff.evaluate(&record);
        assert!(rate.message.starts_with("US rates are far higher"));
        assert!(rate.message.contains("-2.50%p"));
    }

    #[test]
    fn missing_field_reads_no_data() {
        let cond = ConditionKind::Fundamental.evaluate(&DailyRecord::default());
        assert_eq!(cond.status, ConditionStatus::NotApplicable);
        assert_eq!(cond.message, "No data");
        assert_eq!(cond.current, None);
    }

    #[test]
    fn status_serializes_with_display_labels() {
        assert_eq!(serde_json::to_string(&ConditionStatus::NotApplicable).unwrap(), "\"N/A\"");
        assert_eq!(serde_json::to_string(&ConditionStatus::Pass).unwrap(), "\"PASS\"");
    }
}
