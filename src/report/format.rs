//! Formatted terminal output.
//!
//! Everything returns a `String`; printing is left to the caller so output can
//! be asserted on in tests.

use crate::domain::{DailyRecord, Dataset};
use crate::signal::{ConditionKind, InvestmentCondition, InvestmentEnvironment};

/// Base settings, coverage and the latest record of a dataset.
pub fn format_dataset_summary(dataset: &Dataset) -> String {
    let meta = &dataset.metadata;
    let mut out = String::new();

    out.push_str("=== krw - KRW fair value (M2 ratio) ===\n");
    out.push_str(&format!(
        "Base: {} @ {:.2} KRW/USD | KR M2 {:.1} tn KRW | US M2 {:.1} bn USD\n",
        meta.base_date, meta.base_rate, meta.base_kr_m2, meta.base_us_m2
    ));
    out.push_str(&format!("Updated: {}\n", meta.last_updated.to_rfc3339()));

    let (Some(first), Some(latest)) = (dataset.data.first(), dataset.latest()) else {
        out.push_str("Records: none\n");
        return out;
    };
    out.push_str(&format!(
        "Records: n={} | {} .. {}\n",
        dataset.data.len(),
        first.date,
        latest.date
    ));

    out.push_str(&format!("\nLatest ({}):\n", latest.date));
    out.push_str(&format_core(latest));

    let indicators = format_indicators(latest);
    if !indicators.is_empty() {
        out.push_str("\nIndicators:\n");
        out.push_str(&indicators);
    }

    out.push_str("\nSources:\n");
    out.push_str(&format!("  {:<16} {}\n", "KR M2", meta.sources.kr_m2));
    out.push_str(&format!("  {:<16} {}\n", "US M2", meta.sources.us_m2));
    out.push_str(&format!("  {:<16} {}\n", "USD/KRW", meta.sources.exchange_rate));
    let optional = [
        ("DXY", &meta.sources.dxy),
        ("KR base rate", &meta.sources.kr_base_rate),
        ("US fed funds", &meta.sources.us_fed_rate),
        ("VIX", &meta.sources.vix),
        ("KR CPI", &meta.sources.kr_cpi),
        ("US CPI", &meta.sources.us_cpi),
        ("KR GDP growth", &meta.sources.kr_gdp_growth),
        ("US GDP growth", &meta.sources.us_gdp_growth),
        ("Current account", &meta.sources.current_account),
        ("Trade balance", &meta.sources.trade_balance),
    ];
    for (label, source) in optional {
        if let Some(source) = source {
            out.push_str(&format!("  {label:<16} {source}\n"));
        }
    }

    out
}

/// Signal header, per-condition lines, blockers and timing guidance.
pub fn format_environment(env: &InvestmentEnvironment, record: &DailyRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Investment signal: {} ({}) ===\n",
        env.overall_signal.display_name(),
        record.date
    ));
    out.push_str(&format!("{}\n", env.overall_message));
    out.push_str(&format!(
        "Market {:.2} | Fair {:.2} | Gap {:+.1}% ({})\n",
        record.market_rate,
        record.calculated_rate,
        record.gap,
        gap_reading(record.gap)
    ));
    if let Some(score) = record.composite_score {
        out.push_str(&format!("Composite score: {score:+.1}\n"));
    }

    out.push_str("\nConditions (* = blocking):\n");
    for cond in env.conditions.iter() {
        let marker = if cond.is_critical { "*" } else { " " };
        out.push_str(&format!(
            "{marker} [{:<4}] {:<31} {:>10}  {}\n",
            cond.status.label(),
            cond.name,
            fmt_current(cond),
            cond.threshold_label
        ));
        out.push_str(&format!("         {}\n", cond.message));
    }

    if !env.blockers.is_empty() {
        out.push_str("\nBlockers:\n");
        for blocker in &env.blockers {
            out.push_str(&format!("  - {blocker}\n"));
        }
    }

    let verdict = if env.ready_to_buy { "ready to buy" } else { "not ready to buy" };
    out.push_str(&format!("\nTiming ({verdict}): {}\n", env.timing_guidance));

    out
}

fn format_core(record: &DailyRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<16} {:>12.2} KRW\n", "Market rate", record.market_rate));
    out.push_str(&format!("  {:<16} {:>12.2} KRW\n", "M2 fair rate", record.calculated_rate));
    out.push_str(&format!(
        "  {:<16} {:>11.1}%  ({})\n",
        "Gap",
        record.gap,
        gap_reading(record.gap)
    ));
    out.push_str(&format!("  {:<16} {:>12.1} tn KRW\n", "KR M2", record.kr_m2));
    out.push_str(&format!("  {:<16} {:>12.1} bn USD\n", "US M2", record.us_m2));
    out
}

fn format_indicators(record: &DailyRecord) -> String {
    let rows = [
        ("DXY", record.dxy.map(|v| format!("{v:.1}"))),
        ("KR base rate", record.kr_base_rate.map(|v| format!("{v:.2}%"))),
        ("US fed funds", record.us_fed_rate.map(|v| format!("{v:.2}%"))),
        ("Rate diff", record.rate_diff.map(|v| format!("{v:+.2}%p"))),
        ("VIX", record.vix.map(|v| format!("{v:.1}"))),
        ("KR CPI", record.kr_cpi.map(|v| format!("{v:.2}"))),
        ("US CPI", record.us_cpi.map(|v| format!("{v:.2}"))),
        ("PPP rate", record.ppp_rate.map(|v| format!("{v:.2} KRW"))),
        ("KR GDP growth", record.kr_gdp_growth.map(|v| format!("{v:.1}%"))),
        ("US GDP growth", record.us_gdp_growth.map(|v| format!("{v:.1}%"))),
        ("GDP growth diff", record.gdp_growth_diff.map(|v| format!("{v:+.1}%p"))),
        ("M2 growth ratio", record.m2_growth_ratio.map(|v| format!("{v:.3}"))),
        ("Current account", record.current_account.map(|v| format!("${:.1}B", v / 1e9))),
        ("Trade balance", record.trade_balance.map(|v| format!("${:.1}B", v / 1e9))),
        ("Composite score", record.composite_score.map(|v| format!("{v:+.1}"))),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        if let Some(value) = value {
            out.push_str(&format!("  {label:<16} {value:>12}\n"));
        }
    }
    out
}

fn fmt_current(cond: &InvestmentCondition) -> String {
    let Some(v) = cond.current else {
        return "n/a".to_string();
    };
    match cond.kind {
        ConditionKind::Value => format!("{v:+.1}%"),
        ConditionKind::RateDiff => format!("{v:+.2}%p"),
        ConditionKind::Dxy | ConditionKind::Vix => format!("{v:.1}"),
        ConditionKind::Fundamental => format!("${:.1}B", v / 1e9),
    }
}

fn gap_reading(gap: f64) -> &'static str {
    if gap > 0.0 {
        "won undervalued"
    } else if gap < 0.0 {
        "won overvalued"
    } else {
        "at fair value"
    }
}
