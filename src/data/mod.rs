//! Upstream data sources.
//!
//! `SeriesSource` is the seam between the refresh pipeline and the providers:
//! `LiveSource` routes each `SeriesKind` to FRED, ECOS or ExchangeRate-API,
//! tests substitute an in-memory source.

pub mod ecos;
pub mod exchange_rate;
pub mod fred;
pub mod sample;

use chrono::NaiveDate;

use crate::domain::{SeriesKind, TimePoint};
use crate::error::AppError;

pub use ecos::EcosClient;
pub use exchange_rate::ExchangeRateClient;
pub use fred::FredClient;

pub trait SeriesSource: Sync {
    /// Observations of `kind` within `[start, end]`, ascending by date.
    fn fetch(&self, kind: SeriesKind, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError>;
}

pub struct LiveSource {
    fred: FredClient,
    ecos: EcosClient,
    spot: Option<ExchangeRateClient>,
}

impl LiveSource {
    pub fn from_env() -> Result<Self, AppError> {
        let spot = ExchangeRateClient::from_env()?;
        if spot.is_none() {
            log::info!("EXCHANGE_RATE_API_KEY not set; using FRED DEXKOUS only for USD/KRW");
        }
        Ok(Self {
            fred: FredClient::from_env()?,
            ecos: EcosClient::from_env()?,
            spot,
        })
    }

    fn fetch_market_rate(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        let history = self.fred.fetch_kind(SeriesKind::MarketRate, start, end)?;
        let Some(spot) = &self.spot else {
            return Ok(history);
        };
        match spot.fetch_current_rate() {
            Ok(point) if point.date >= start && point.date <= end => Ok(exchange_rate::merge_spot(history, point)),
            Ok(point) => {
                log::debug!("Spot rate dated {} is outside {start}..{end}; ignored", point.date);
                Ok(history)
            }
            Err(err) => {
                log::warn!("Spot USD/KRW unavailable, continuing with FRED history: {err}");
                Ok(history)
            }
        }
    }
}

impl SeriesSource for LiveSource {
    fn fetch(&self, kind: SeriesKind, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        match kind {
            SeriesKind::KrM2 => self.ecos.fetch_korea_m2(start, end),
            SeriesKind::MarketRate => self.fetch_market_rate(start, end),
            other => self.fred.fetch_kind(other, start, end),
        }
    }
}
