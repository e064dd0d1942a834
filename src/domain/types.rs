//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the data clients / sample generator
//! - merged by the assembler into one dataset snapshot
//! - written to JSON and reloaded later by the signal/summary commands

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One observation of an upstream series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Every upstream series the assembler knows about.
///
/// The set is closed: `KrM2`, `UsM2` and `MarketRate` are required for a record
/// to exist, everything else only enriches a record when it is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesKind {
    KrM2,
    UsM2,
    MarketRate,
    Dxy,
    KrBaseRate,
    UsFedRate,
    Vix,
    KrCpi,
    UsCpi,
    KrGdp,
    UsGdp,
    CurrentAccount,
    TradeBalance,
}

impl SeriesKind {
    pub const REQUIRED: [SeriesKind; 3] = [SeriesKind::KrM2, SeriesKind::UsM2, SeriesKind::MarketRate];

    pub const OPTIONAL: [SeriesKind; 10] = [
        SeriesKind::Dxy,
        SeriesKind::KrBaseRate,
        SeriesKind::UsFedRate,
        SeriesKind::Vix,
        SeriesKind::KrCpi,
        SeriesKind::UsCpi,
        SeriesKind::KrGdp,
        SeriesKind::UsGdp,
        SeriesKind::CurrentAccount,
        SeriesKind::TradeBalance,
    ];

    /// Human-readable label for logs and reports.
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::KrM2 => "Korea M2",
            SeriesKind::UsM2 => "US M2",
            SeriesKind::MarketRate => "USD/KRW",
            SeriesKind::Dxy => "Dollar index",
            SeriesKind::KrBaseRate => "Korea base rate",
            SeriesKind::UsFedRate => "US fed funds rate",
            SeriesKind::Vix => "VIX",
            SeriesKind::KrCpi => "Korea CPI",
            SeriesKind::UsCpi => "US CPI",
            SeriesKind::KrGdp => "Korea real GDP",
            SeriesKind::UsGdp => "US real GDP",
            SeriesKind::CurrentAccount => "Current account",
            SeriesKind::TradeBalance => "Trade balance",
        }
    }

    /// FRED series id, for kinds sourced from FRED.
    pub fn fred_series_id(self) -> Option<&'static str> {
        match self {
            SeriesKind::KrM2 => None,
            SeriesKind::UsM2 => Some("M2SL"),
            SeriesKind::MarketRate => Some("DEXKOUS"),
            SeriesKind::Dxy => Some("DTWEXBGS"),
            SeriesKind::KrBaseRate => Some("INTDSRKRM193N"),
            SeriesKind::UsFedRate => Some("FEDFUNDS"),
            SeriesKind::Vix => Some("VIXCLS"),
            SeriesKind::KrCpi => Some("KORCPIALLMINMEI"),
            SeriesKind::UsCpi => Some("CPIAUCSL"),
            SeriesKind::KrGdp => Some("NGDPRSAXDCKRQ"),
            SeriesKind::UsGdp => Some("GDPC1"),
            SeriesKind::CurrentAccount => Some("KORBCABP6USD"),
            SeriesKind::TradeBalance => Some("XTNTVA01KRQ667S"),
        }
    }

    /// Fixed provenance label written into `metadata.sources`.
    pub fn source_label(self) -> String {
        match self {
            SeriesKind::KrM2 => "ECOS (Bank of Korea)".to_string(),
            SeriesKind::UsM2 => "FRED (St. Louis Fed)".to_string(),
            SeriesKind::MarketRate => "FRED (DEXKOUS) + ExchangeRate-API".to_string(),
            other => match other.fred_series_id() {
                Some(id) => format!("FRED ({id})"),
                None => "FRED (St. Louis Fed)".to_string(),
            },
        }
    }
}

/// Where a `RawSeries` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    Live,
    Synthetic { seed: u64 },
}

/// Raw, unaligned upstream series as delivered by the data layer.
///
/// GDP series hold *growth rates* (percent, year over year) by the time they
/// reach the assembler; the pipeline converts levels before assembly.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub origin: SeriesOrigin,
    pub kr_m2: Vec<TimePoint>,
    pub us_m2: Vec<TimePoint>,
    pub market_rate: Vec<TimePoint>,
    pub dxy: Option<Vec<TimePoint>>,
    pub kr_base_rate: Option<Vec<TimePoint>>,
    pub us_fed_rate: Option<Vec<TimePoint>>,
    pub vix: Option<Vec<TimePoint>>,
    pub kr_cpi: Option<Vec<TimePoint>>,
    pub us_cpi: Option<Vec<TimePoint>>,
    pub kr_gdp_growth: Option<Vec<TimePoint>>,
    pub us_gdp_growth: Option<Vec<TimePoint>>,
    pub current_account: Option<Vec<TimePoint>>,
    pub trade_balance: Option<Vec<TimePoint>>,
}

impl RawSeries {
    /// Only the three required series; every optional series absent.
    pub fn core(kr_m2: Vec<TimePoint>, us_m2: Vec<TimePoint>, market_rate: Vec<TimePoint>) -> Self {
        Self {
            origin: SeriesOrigin::Live,
            kr_m2,
            us_m2,
            market_rate,
            dxy: None,
            kr_base_rate: None,
            us_fed_rate: None,
            vix: None,
            kr_cpi: None,
            us_cpi: None,
            kr_gdp_growth: None,
            us_gdp_growth: None,
            current_account: None,
            trade_balance: None,
        }
    }

    /// The optional series for `kind` (GDP kinds map to their growth series).
    pub fn optional(&self, kind: SeriesKind) -> Option<&[TimePoint]> {
        let series = match kind {
            SeriesKind::KrM2 | SeriesKind::UsM2 | SeriesKind::MarketRate => return None,
            SeriesKind::Dxy => &self.dxy,
            SeriesKind::KrBaseRate => &self.kr_base_rate,
            SeriesKind::UsFedRate => &self.us_fed_rate,
            SeriesKind::Vix => &self.vix,
            SeriesKind::KrCpi => &self.kr_cpi,
            SeriesKind::UsCpi => &self.us_cpi,
            SeriesKind::KrGdp => &self.kr_gdp_growth,
            SeriesKind::UsGdp => &self.us_gdp_growth,
            SeriesKind::CurrentAccount => &self.current_account,
            SeriesKind::TradeBalance => &self.trade_balance,
        };
        series.as_deref()
    }

    /// Mutable slot for an optional series.
    pub fn optional_slot(&mut self, kind: SeriesKind) -> Option<&mut Option<Vec<TimePoint>>> {
        match kind {
            SeriesKind::KrM2 | SeriesKind::UsM2 | SeriesKind::MarketRate => None,
            SeriesKind::Dxy => Some(&mut self.dxy),
            SeriesKind::KrBaseRate => Some(&mut self.kr_base_rate),
            SeriesKind::UsFedRate => Some(&mut self.us_fed_rate),
            SeriesKind::Vix => Some(&mut self.vix),
            SeriesKind::KrCpi => Some(&mut self.kr_cpi),
            SeriesKind::UsCpi => Some(&mut self.us_cpi),
            SeriesKind::KrGdp => Some(&mut self.kr_gdp_growth),
            SeriesKind::UsGdp => Some(&mut self.us_gdp_growth),
            SeriesKind::CurrentAccount => Some(&mut self.current_account),
            SeriesKind::TradeBalance => Some(&mut self.trade_balance),
        }
    }
}

/// Base-period settings for an assembly run.
///
/// Derived from CLI flags / environment (plus defaults).
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    pub base_date: NaiveDate,
    /// KRW per USD at `base_date`.
    pub base_rate: f64,
    /// Explicit base KR M2 (trillion KRW). Falls back to the interpolated value at `base_date`.
    pub base_kr_m2: Option<f64>,
    /// Explicit base US M2 (billion USD). Falls back to the interpolated value at `base_date`.
    pub base_us_m2: Option<f64>,
}

/// One row of the dataset.
///
/// `calculated_rate` and `gap` are always derived from `market_rate`, `kr_m2`,
/// `us_m2` and the dataset's base values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub market_rate: f64,
    pub kr_m2: f64,
    pub us_m2: f64,
    pub calculated_rate: f64,
    pub gap: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dxy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kr_base_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_fed_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_diff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_account: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kr_gdp_growth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_gdp_growth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdp_growth_diff: Option<f64>,
    #[serde(rename = "krCPI", default, skip_serializing_if = "Option::is_none")]
    pub kr_cpi: Option<f64>,
    #[serde(rename = "usCPI", default, skip_serializing_if = "Option::is_none")]
    pub us_cpi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vix: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppp_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m2_growth_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
}

/// Provenance labels per included series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sources {
    pub kr_m2: String,
    pub us_m2: String,
    pub exchange_rate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kr_base_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_fed_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vix: Option<String>,
    #[serde(rename = "krCPI", default, skip_serializing_if = "Option::is_none")]
    pub kr_cpi: Option<String>,
    #[serde(rename = "usCPI", default, skip_serializing_if = "Option::is_none")]
    pub us_cpi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kr_gdp_growth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_gdp_growth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_balance: Option<String>,
}

impl Sources {
    /// Label slot for an optional kind (`None` for the required kinds).
    pub fn optional_label_mut(&mut self, kind: SeriesKind) -> Option<&mut Option<String>> {
        match kind {
            SeriesKind::KrM2 | SeriesKind::UsM2 | SeriesKind::MarketRate => None,
            SeriesKind::Dxy => Some(&mut self.dxy),
            SeriesKind::KrBaseRate => Some(&mut self.kr_base_rate),
            SeriesKind::UsFedRate => Some(&mut self.us_fed_rate),
            SeriesKind::Vix => Some(&mut self.vix),
            SeriesKind::KrCpi => Some(&mut self.kr_cpi),
            SeriesKind::UsCpi => Some(&mut self.us_cpi),
            SeriesKind::KrGdp => Some(&mut self.kr_gdp_growth),
            SeriesKind::UsGdp => Some(&mut self.us_gdp_growth),
            SeriesKind::CurrentAccount => Some(&mut self.current_account),
            SeriesKind::TradeBalance => Some(&mut self.trade_balance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub last_updated: DateTime<Utc>,
    pub base_date: NaiveDate,
    pub base_rate: f64,
    pub base_kr_m2: f64,
    pub base_us_m2: f64,
    pub sources: Sources,
}

/// The persisted snapshot: metadata plus records in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub data: Vec<DailyRecord>,
}

impl Dataset {
    pub fn latest(&self) -> Option<&DailyRecord> {
        self.data.last()
    }

    /// Record for `date` (records are sorted, so binary search works).
    pub fn record_on(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.data
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.data[i])
    }
}
