//! ExchangeRate-API integration (today's USD/KRW spot rate).
//!
//! The free plan has no history; the daily history comes from FRED (DEXKOUS)
//! and this client only supplies the latest point.

use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::TimePoint;
use crate::error::AppError;

const BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

pub struct ExchangeRateClient {
    client: Client,
    api_key: String,
}

impl ExchangeRateClient {
    /// `Ok(None)` when `EXCHANGE_RATE_API_KEY` is not configured.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        dotenvy::dotenv().ok();
        let Ok(api_key) = std::env::var("EXCHANGE_RATE_API_KEY") else {
            return Ok(None);
        };
        Ok(Some(Self {
            client: super::fred::http_client()?,
            api_key,
        }))
    }

    pub fn fetch_current_rate(&self) -> Result<TimePoint, AppError> {
        let url = format!("{BASE_URL}/{}/pair/USD/KRW", self.api_key);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(4, format!("ExchangeRate-API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("ExchangeRate-API request failed with status {}.", resp.status()),
            ));
        }

        let body: PairResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse ExchangeRate-API response: {e}")))?;
        parse_pair(body)
    }
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    #[serde(default)]
    time_last_update_unix: i64,
    #[serde(default)]
    conversion_rate: f64,
}

fn parse_pair(body: PairResponse) -> Result<TimePoint, AppError> {
    if body.result != "success" {
        return Err(AppError::new(4, format!("ExchangeRate-API returned '{}'.", body.result)));
    }
    if !(body.conversion_rate.is_finite() && body.conversion_rate > 0.0) {
        return Err(AppError::new(4, "ExchangeRate-API returned an invalid USD/KRW rate."));
    }
    let updated = DateTime::from_timestamp(body.time_last_update_unix, 0)
        .ok_or_else(|| AppError::new(4, "ExchangeRate-API returned an invalid update time."))?;
    Ok(TimePoint::new(updated.date_naive(), body.conversion_rate))
}

/// Insert `spot` into a daily history, replacing any observation on the same date.
pub fn merge_spot(mut history: Vec<TimePoint>, spot: TimePoint) -> Vec<TimePoint> {
    history.retain(|p| p.date != spot.date);
    history.push(spot);
    history.sort_by_key(|p| p.date);
    history
}
