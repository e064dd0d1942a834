//! Bank of Korea ECOS API integration (Korean broad money, M2).

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::TimePoint;
use crate::error::AppError;
use crate::math::round_to;

const BASE_URL: &str = "https://ecos.bok.or.kr/api";
/// Broad money M2, period average.
const STAT_CODE: &str = "101Y004";
/// M2 total; the table also carries component breakdowns.
const ITEM_CODE_TOTAL: &str = "BBHA00";
const CYCLE: &str = "M";
const ROW_LIMIT: usize = 10000;

pub struct EcosClient {
    client: Client,
    api_key: String,
}

impl EcosClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("ECOS_API_KEY")
            .map_err(|_| AppError::new(2, "Missing ECOS_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: super::fred::http_client()?,
            api_key,
        })
    }

    /// Monthly KR M2 in trillion KRW (1 decimal), dated the first of each month.
    pub fn fetch_korea_m2(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        let url = format!(
            "{BASE_URL}/StatisticSearch/{}/json/kr/1/{ROW_LIMIT}/{STAT_CODE}/{CYCLE}/{}/{}/",
            self.api_key,
            start.format("%Y%m"),
            end.format("%Y%m"),
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(4, format!("ECOS request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("ECOS request failed with status {}.", resp.status()),
            ));
        }

        let body: EcosResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse ECOS response: {e}")))?;

        let out = parse_response(body)?;
        log::debug!("ECOS {STAT_CODE}: {} monthly observations", out.len());
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct EcosResponse {
    #[serde(rename = "RESULT")]
    result: Option<EcosResult>,
    #[serde(rename = "StatisticSearch")]
    statistic_search: Option<StatisticSearch>,
}

#[derive(Debug, Deserialize)]
struct EcosResult {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "MESSAGE")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatisticSearch {
    row: Vec<EcosRow>,
}

#[derive(Debug, Deserialize)]
struct EcosRow {
    #[serde(rename = "ITEM_CODE1")]
    item_code: String,
    #[serde(rename = "TIME")]
    time: String,
    #[serde(rename = "DATA_VALUE")]
    data_value: String,
}

fn parse_response(body: EcosResponse) -> Result<Vec<TimePoint>, AppError> {
    if let Some(result) = body.result {
        return Err(AppError::new(
            4,
            format!("ECOS API error [{}]: {}", result.code, result.message),
        ));
    }

    let rows = body
        .statistic_search
        .ok_or_else(|| AppError::new(4, "Invalid ECOS response: StatisticSearch.row not found."))?
        .row;

    let mut out = Vec::new();
    for row in rows.into_iter().filter(|r| r.item_code == ITEM_CODE_TOTAL) {
        let date = parse_month(&row.time)?;
        let billions: f64 = row
            .data_value
            .trim()
            .parse()
            .map_err(|e| AppError::new(4, format!("Invalid ECOS value '{}': {e}", row.data_value)))?;
        out.push(TimePoint::new(date, round_to(billions / 1000.0, 1)));
    }
    out.sort_by_key(|p| p.date);
    Ok(out)
}

/// `YYYYMM` → first day of that month.
fn parse_month(raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::new(4, format!("Invalid ECOS period '{raw}'."));
    if raw.len() != 6 {
        return Err(invalid());
    }
    let year: i32 = raw[..4].parse().map_err(|_| invalid())?;
    let month: u32 = raw[4..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_total_rows_and_converts_to_trillions() {
        let body: EcosResponse = serde_json::from_str(
            r#"{"StatisticSearch":{"list_total_count":3,"row":[
                {"ITEM_CODE1":"BBHA00","TIME":"202402","DATA_VALUE":"3912345.6"},
                {"ITEM_CODE1":"BBHA01","TIME":"202402","DATA_VALUE":"1000.0"},
                {"ITEM_CODE1":"BBHA00","TIME":"202401","DATA_VALUE":"3900049.9"}
            ]}}"#,
        )
        .unwrap();
        let points = parse_response(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(points[0].value, 3900.0);
        assert_eq!(points[1].value, 3912.3);
    }

    #[test]
    fn result_payload_is_an_error() {
        let body: EcosResponse =
            serde_json::from_str(r#"{"RESULT":{"CODE":"INFO-200","MESSAGE":"No data"}}"#).unwrap();
        let err = parse_response(body).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.message(), "ECOS API error [INFO-200]: No data");
    }

    #[test]
    fn parse_month_rejects_bad_periods() {
        assert!(parse_month("2024").is_err());
        assert!(parse_month("202413").is_err());
        assert_eq!(parse_month("201012").unwrap(), NaiveDate::from_ymd_opt(2010, 12, 1).unwrap());
    }
}
