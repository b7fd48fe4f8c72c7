use crate::config::Config;
use crate::utils::truncate_body;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("No daily aggregates could be computed")]
    Empty,
}

impl From<reqwest::Error> for HistoryError {
    fn from(err: reqwest::Error) -> Self {
        HistoryError::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyHistoryResponse {
    pub hourly: HourlySeries,
}

/// Index-aligned hourly series. Every series must be present; individual
/// readings may be null.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub rain: Vec<Option<f64>>,
}

pub struct OpenMeteoClient {
    client: Client,
    config: Config,
}

impl OpenMeteoClient {
    pub fn new(config: Config) -> Result<Self, HistoryError> {
        let client = Client::builder()
            .user_agent("WeatherDashboard/1.0")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_hourly(
        &self,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlySeries, HistoryError> {
        let url = format!(
            "{}{}",
            self.config.openmeteo_base_url, self.config.openmeteo_history_path
        );
        let start_date = start.format("%Y-%m-%d").to_string();
        let end_date = end.format("%Y-%m-%d").to_string();

        tracing::debug!("GET {} ({} .. {})", url, start_date, end_date);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string().as_str()),
                ("longitude", lon.to_string().as_str()),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("hourly", "temperature_2m,relative_humidity_2m,rain"),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HistoryError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                truncate_body(&error_text)
            )));
        }

        let body = response.text().await?;
        let parsed: HourlyHistoryResponse = serde_json::from_str(&body)
            .map_err(|e| HistoryError::MalformedResponse(e.to_string()))?;

        Ok(parsed.hourly)
    }
}
