//! FRED API integration (US M2, USD/KRW history and the macro indicators).

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{SeriesKind, TimePoint};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }

    /// Fetch the FRED series backing `kind`.
    pub fn fetch_kind(&self, kind: SeriesKind, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        let series_id = kind
            .fred_series_id()
            .ok_or_else(|| AppError::new(2, format!("{} is not served by FRED.", kind.display_name())))?;
        self.fetch_series(series_id, start, end, 1.0)
    }

    /// Observations in `[start, end]`, ascending, each value multiplied by `scale`.
    pub fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        scale: f64,
    ) -> Result<Vec<TimePoint>, AppError> {
        log::debug!("FRED {series_id}: requesting {start}..{end}");

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
                ("limit", &OBS_LIMIT.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request for {series_id} failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response for {series_id}: {e}")))?;

        let out = parse_observations(body, scale)?;
        log::debug!("FRED {series_id}: {} observations", out.len());
        Ok(out)
    }
}

pub(crate) fn http_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(body: ObservationsResponse, scale: f64) -> Result<Vec<TimePoint>, AppError> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let value = match parse_value(&obs.value) {
            Some(v) => v,
            None => continue,
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
        out.push(TimePoint::new(date, value * scale));
    }
    out.sort_by_key(|p| p.date);
    Ok(out)
}

/// FRED encodes missing observations as ".".
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
