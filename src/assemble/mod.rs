//! Dataset assembly.
//!
//! Turns independently sourced `RawSeries` into one `Dataset`:
//!
//! 1. interpolate both M2 series to daily values over `[base_date, today]`
//! 2. resolve the base M2 levels
//! 3. keep dates where market rate, KR M2 and US M2 are all present
//! 4. derive fair rate, gap and the extended indicators per date
//!
//! All date lookups are built once per call and never mutated afterwards, so
//! assembling the same inputs with the same clock is deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveDate, Utc};

use crate::domain::{
    AssembleConfig, DailyRecord, Dataset, DatasetMetadata, RawSeries, SeriesKind, SeriesOrigin, Sources, TimePoint,
};
use crate::error::ValuationError;
use crate::math::interpolate_daily;
use crate::valuation::{
    CompositeScores, CompositeWeights, composite_score, fair_rate, gap, gdp_growth_diff, interest_rate_diff,
    m2_growth_ratio, ppp_rate,
};

type Lookup = BTreeMap<NaiveDate, f64>;

/// Assemble a dataset using the wall clock for `today` and `lastUpdated`.
pub fn assemble(raw: &RawSeries, config: &AssembleConfig) -> Result<Dataset, ValuationError> {
    assemble_at(raw, config, Utc::now())
}

/// Assemble a dataset as of `now`.
pub fn assemble_at(
    raw: &RawSeries,
    config: &AssembleConfig,
    now: DateTime<Utc>,
) -> Result<Dataset, ValuationError> {
    let today = now.date_naive();

    let kr_daily = interpolate_daily(&raw.kr_m2, config.base_date, today)?;
    let us_daily = interpolate_daily(&raw.us_m2, config.base_date, today)?;
    let market = series_lookup(&raw.market_rate);
    let extended = ExtendedLookups::new(raw);

    let complete: Vec<(NaiveDate, f64, f64, f64)> = kr_daily
        .iter()
        .filter_map(|(&date, &kr_m2)| {
            let us_m2 = *us_daily.get(&date)?;
            let market_rate = *market.get(&date)?;
            [kr_m2, us_m2, market_rate]
                .iter()
                .all(|v| is_present(*v))
                .then_some((date, market_rate, kr_m2, us_m2))
        })
        .collect();

    let dropped = kr_daily.len() - complete.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} dates without a complete market rate / M2 triple");
    }

    let base_kr_m2 = config.base_kr_m2.or_else(|| kr_daily.get(&config.base_date).copied()).unwrap_or(0.0);
    let base_us_m2 = config.base_us_m2.or_else(|| us_daily.get(&config.base_date).copied()).unwrap_or(0.0);

    if !complete.is_empty() {
        if !is_present(base_kr_m2) {
            return Err(ValuationError::MissingBase("KR M2"));
        }
        if !is_present(base_us_m2) {
            return Err(ValuationError::MissingBase("US M2"));
        }
    }

    let base = BaseLevels {
        rate: config.base_rate,
        kr_m2: base_kr_m2,
        us_m2: base_us_m2,
        kr_cpi: extended.kr_cpi.as_of(config.base_date),
        us_cpi: extended.us_cpi.as_of(config.base_date),
    };

    let weights = CompositeWeights::default();
    let mut data = Vec::with_capacity(complete.len());
    for (date, market_rate, kr_m2, us_m2) in complete {
        let calculated_rate = fair_rate(base.rate, base.kr_m2, base.us_m2, kr_m2, us_m2)?;
        let gap_pct = gap(market_rate, calculated_rate)?;

        let mut record = DailyRecord {
            date,
            market_rate,
            kr_m2,
            us_m2,
            calculated_rate,
            gap: gap_pct,
            ..Default::default()
        };
        extended.enrich(&mut record, &base, &kr_daily, &us_daily);
        record.composite_score = Some(composite_score(&CompositeScores::from_record(&record), &weights));
        data.push(record);
    }

    match (data.first(), data.last()) {
        (Some(first), Some(last)) => log::info!(
            "Assembled {} records ({} .. {}), base KR M2 {:.1}, base US M2 {:.1}",
            data.len(),
            first.date,
            last.date,
            base_kr_m2,
            base_us_m2
        ),
        _ => log::warn!("Assembled an empty dataset: no date has market rate and both M2 series"),
    }

    Ok(Dataset {
        metadata: DatasetMetadata {
            last_updated: now,
            base_date: config.base_date,
            base_rate: config.base_rate,
            base_kr_m2,
            base_us_m2,
            sources: sources_for(raw),
        },
        data,
    })
}

struct BaseLevels {
    rate: f64,
    kr_m2: f64,
    us_m2: f64,
    kr_cpi: Option<f64>,
    us_cpi: Option<f64>,
}

/// Date-exact lookup for daily series; first observation wins on duplicates.
fn series_lookup(points: &[TimePoint]) -> Lookup {
    let mut sorted: Vec<&TimePoint> = points.iter().filter(|p| p.value.is_finite()).collect();
    sorted.sort_by_key(|p| p.date);
    let mut out = Lookup::new();
    for p in sorted {
        out.entry(p.date).or_insert(p.value);
    }
    out
}

/// Latest observation on or before a date, for monthly / quarterly series.
struct AsOf(Lookup);

impl AsOf {
    fn new(points: Option<&[TimePoint]>) -> Self {
        Self(points.map(series_lookup).unwrap_or_default())
    }

    fn as_of(&self, date: NaiveDate) -> Option<f64> {
        self.0.range(..=date).next_back().map(|(_, v)| *v)
    }
}

struct ExtendedLookups {
    dxy: Lookup,
    vix: Lookup,
    kr_base_rate: AsOf,
    us_fed_rate: AsOf,
    kr_cpi: AsOf,
    us_cpi: AsOf,
    kr_gdp_growth: AsOf,
    us_gdp_growth: AsOf,
    current_account: AsOf,
    trade_balance: AsOf,
}

impl ExtendedLookups {
    fn new(raw: &RawSeries) -> Self {
        let exact = |kind| raw.optional(kind).map(series_lookup).unwrap_or_default();
        Self {
            dxy: exact(SeriesKind::Dxy),
            vix: exact(SeriesKind::Vix),
            kr_base_rate: AsOf::new(raw.optional(SeriesKind::KrBaseRate)),
            us_fed_rate: AsOf::new(raw.optional(SeriesKind::UsFedRate)),
            kr_cpi: AsOf::new(raw.optional(SeriesKind::KrCpi)),
            us_cpi: AsOf::new(raw.optional(SeriesKind::UsCpi)),
            kr_gdp_growth: AsOf::new(raw.optional(SeriesKind::KrGdp)),
            us_gdp_growth: AsOf::new(raw.optional(SeriesKind::UsGdp)),
            current_account: AsOf::new(raw.optional(SeriesKind::CurrentAccount)),
            trade_balance: AsOf::new(raw.optional(SeriesKind::TradeBalance)),
        }
    }

    fn enrich(&self, record: &mut DailyRecord, base: &BaseLevels, kr_daily: &Lookup, us_daily: &Lookup) {
        let date = record.date;

        record.dxy = self.dxy.get(&date).copied();
        record.vix = self.vix.get(&date).copied();
        record.kr_base_rate = self.kr_base_rate.as_of(date);
        record.us_fed_rate = self.us_fed_rate.as_of(date);
        record.kr_cpi = self.kr_cpi.as_of(date);
        record.us_cpi = self.us_cpi.as_of(date);
        record.kr_gdp_growth = self.kr_gdp_growth.as_of(date);
        record.us_gdp_growth = self.us_gdp_growth.as_of(date);
        record.current_account = self.current_account.as_of(date);
        record.trade_balance = self.trade_balance.as_of(date);

        if let (Some(kr), Some(us)) = (record.kr_base_rate, record.us_fed_rate) {
            record.rate_diff = Some(interest_rate_diff(kr, us));
        }
        if let (Some(kr), Some(us)) = (record.kr_gdp_growth, record.us_gdp_growth) {
            record.gdp_growth_diff = Some(gdp_growth_diff(kr, us));
        }
        if let (Some(base_kr), Some(base_us), Some(kr), Some(us)) =
            (base.kr_cpi, base.us_cpi, record.kr_cpi, record.us_cpi)
        {
            record.ppp_rate = ppp_rate(base.rate, base_kr, base_us, kr, us).ok();
        }

        let year_ago = date.checked_sub_months(Months::new(12));
        let prev = year_ago.and_then(|d| Some((*kr_daily.get(&d)?, *us_daily.get(&d)?)));
        if let Some((prev_kr, prev_us)) = prev {
            record.m2_growth_ratio = m2_growth_ratio(record.kr_m2, prev_kr, record.us_m2, prev_us).ok();
        }
    }
}

fn is_present(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

fn sources_for(raw: &RawSeries) -> Sources {
    let label = |kind: SeriesKind| match raw.origin {
        SeriesOrigin::Live => kind.source_label(),
        SeriesOrigin::Synthetic { seed } => format!("Synthetic sample (seed {seed})"),
    };

    let mut sources = Sources {
        kr_m2: label(SeriesKind::KrM2),
        us_m2: label(SeriesKind::UsM2),
        exchange_rate: label(SeriesKind::MarketRate),
        ..Default::default()
    };
    for kind in SeriesKind::OPTIONAL {
        let included = raw.optional(kind).is_some_and(|points| !points.is_empty());
        if let (true, Some(slot)) = (included, sources.optional_label_mut(kind)) {
            *slot = Some(label(kind));
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tp(date: NaiveDate, value: f64) -> TimePoint {
        TimePoint::new(date, value)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn config() -> AssembleConfig {
        AssembleConfig {
            base_date: d(2024, 1, 1),
            base_rate: 1300.0,
            base_kr_m2: None,
            base_us_m2: None,
        }
    }

    fn raw() -> RawSeries {
        RawSeries::core(
            vec![tp(d(2024, 1, 1), 3000.0), tp(d(2024, 2, 1), 3100.0), tp(d(2024, 3, 1), 3200.0)],
            vec![tp(d(2024, 1, 1), 20000.0), tp(d(2024, 2, 1), 20100.0), tp(d(2024, 3, 1), 20200.0)],
            vec![
                tp(d(2024, 1, 2), 1310.0),
                tp(d(2024, 1, 1), 1300.0),
                tp(d(2024, 2, 15), 1350.0),
                tp(d(2024, 3, 5), 1400.0),
                tp(d(2024, 3, 20), 1420.0),
            ],
        )
    }

    #[test]
    fn keeps_only_dates_with_all_required_series_in_ascending_order() {
        let dataset = assemble_at(&raw(), &config(), now()).unwrap();
        let dates: Vec<NaiveDate> = dataset.data.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 2, 15), d(2024, 3, 5)]);
        assert!(dataset.data.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn derives_fair_rate_and_gap_from_base_levels() {
        let dataset = assemble_at(&raw(), &config(), now()).unwrap();
        assert_eq!(dataset.metadata.base_kr_m2, 3000.0);
        assert_eq!(dataset.metadata.base_us_m2, 20000.0);

        let first = &dataset.data[0];
        assert_eq!(first.calculated_rate, 1300.0);
        assert_eq!(first.gap, 0.0);

        let last = dataset.record_on(d(2024, 3, 5)).unwrap();
        assert_eq!(last.kr_m2, 3200.0);
        assert_eq!(last.us_m2, 20200.0);
        assert_eq!(last.calculated_rate, 1373.0);
        assert_eq!(last.gap, 2.0);
        assert!(last.composite_score.is_some());
    }

    #[test]
    fn fractional_base_rate_survives_on_the_base_date() {
        let config = AssembleConfig { base_rate: 1156.26, ..config() };
        let dataset = assemble_at(&raw(), &config, now()).unwrap();
        let base = dataset.record_on(d(2024, 1, 1)).unwrap();
        assert_eq!(base.calculated_rate, dataset.metadata.base_rate);
        assert_eq!(base.calculated_rate, 1156.26);
    }

    #[test]
    fn assembly_is_idempotent_for_the_same_clock() {
        let a = assemble_at(&raw(), &config(), now()).unwrap();
        let b = assemble_at(&raw(), &config(), now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn empty_m2_series_gives_zero_records() {
        let mut raw = raw();
        raw.kr_m2.clear();
        let dataset = assemble_at(&raw, &config(), now()).unwrap();
        assert!(dataset.data.is_empty());
    }

    #[test]
    fn unresolvable_base_level_is_rejected() {
        let config = AssembleConfig {
            base_date: d(2023, 12, 1),
            ..config()
        };
        assert_eq!(
            assemble_at(&raw(), &config, now()),
            Err(ValuationError::MissingBase("KR M2"))
        );
    }

    #[test]
    fn explicit_base_levels_override_interpolated_ones() {
        let config = AssembleConfig {
            base_date: d(2023, 12, 1),
            base_kr_m2: Some(3000.0),
            base_us_m2: Some(20000.0),
            ..config()
        };
        let dataset = assemble_at(&raw(), &config, now()).unwrap();
        assert_eq!(dataset.data.len(), 4);
        assert_eq!(dataset.data[0].calculated_rate, 1300.0);
    }

    #[test]
    fn zero_market_rate_is_treated_as_missing() {
        let mut raw = raw();
        raw.market_rate.push(tp(d(2024, 1, 3), 0.0));
        let dataset = assemble_at(&raw, &config(), now()).unwrap();
        assert!(dataset.record_on(d(2024, 1, 3)).is_none());
    }

    #[test]
    fn attaches_extended_fields_only_where_covered() {
        let mut raw = raw();
        raw.dxy = Some(vec![tp(d(2024, 1, 2), 103.5)]);
        raw.kr_base_rate = Some(vec![tp(d(2024, 1, 1), 3.5)]);
        raw.us_fed_rate = Some(vec![tp(d(2024, 1, 1), 5.33), tp(d(2024, 3, 1), 5.0)]);
        raw.kr_cpi = Some(vec![tp(d(2024, 1, 1), 100.0), tp(d(2024, 2, 1), 102.0)]);
        raw.us_cpi = Some(vec![tp(d(2024, 1, 1), 100.0), tp(d(2024, 2, 1), 101.0)]);
        raw.vix = Some(vec![]);

        let dataset = assemble_at(&raw, &config(), now()).unwrap();

        let jan2 = dataset.record_on(d(2024, 1, 2)).unwrap();
        assert_eq!(jan2.dxy, Some(103.5));
        assert_eq!(jan2.rate_diff, Some(-1.83));
        assert_eq!(jan2.ppp_rate, Some(1300.0));
        assert_eq!(jan2.vix, None);

        let mar5 = dataset.record_on(d(2024, 3, 5)).unwrap();
        assert_eq!(mar5.dxy, None);
        assert_eq!(mar5.rate_diff, Some(-1.5));
        // 1300 × 1.02 / 1.01 = 1312.87…
        assert_eq!(mar5.ppp_rate, Some(1313.0));
        assert_eq!(mar5.m2_growth_ratio, None);
        assert_eq!(mar5.current_account, None);

        let sources = &dataset.metadata.sources;
        assert!(sources.dxy.is_some());
        assert!(sources.kr_cpi.is_some());
        assert!(sources.vix.is_none());
        assert!(sources.current_account.is_none());
    }

    #[test]
    fn synthetic_origin_is_reflected_in_source_labels() {
        let mut raw = raw();
        raw.origin = SeriesOrigin::Synthetic { seed: 7 };
        let dataset = assemble_at(&raw, &config(), now()).unwrap();
        assert_eq!(dataset.metadata.sources.kr_m2, "Synthetic sample (seed 7)");
    }
}
