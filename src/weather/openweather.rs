use super::reshape::{daily_from_3h, FORECAST_DAYS};
use super::types::*;
use super::{forecast_outcome, FetchOutcome};
use crate::config::Config;
use crate::utils::{truncate_body, validate_coordinates};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("Location not found")]
    NotFound,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for OpenWeatherError {
    fn from(err: reqwest::Error) -> Self {
        OpenWeatherError::RequestFailed(err.to_string())
    }
}

/// What to look up current conditions for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("WeatherDashboard/1.0")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn current_conditions(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentConditions, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        let response: OwCurrentResponse = match query {
            LocationQuery::City(city) => {
                let city = city.trim();
                if city.is_empty() {
                    return Err(OpenWeatherError::InvalidInput(
                        "city name must not be empty".to_string(),
                    ));
                }

                self.get_json(&url, &[
                    ("q", city),
                    ("units", "metric"),
                    ("appid", &self.config.openweather_api_key),
                ])
                .await?
            }
            LocationQuery::Coordinates(coord) => {
                validate_coordinates(coord.lat, coord.lon)
                    .map_err(OpenWeatherError::InvalidInput)?;

                self.get_json(&url, &[
                    ("lat", &coord.lat.to_string()),
                    ("lon", &coord.lon.to_string()),
                    ("units", "metric"),
                    ("appid", &self.config.openweather_api_key),
                ])
                .await?
            }
        };

        Ok(CurrentConditions::from(response))
    }

    pub async fn daily_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<ForecastDay>, OpenWeatherError> {
        validate_coordinates(lat, lon).map_err(OpenWeatherError::InvalidInput)?;

        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_daily_path
        );

        let response: DailyForecastResponse = self
            .get_json(&url, &[
                ("lat", &lat.to_string()),
                ("lon", &lon.to_string()),
                ("cnt", &FORECAST_DAYS.to_string()),
                ("units", "metric"),
                ("appid", &self.config.openweather_api_key),
            ])
            .await?;

        Ok(response.list.iter().take(FORECAST_DAYS).map(ForecastDay::from).collect())
    }

    pub async fn get_forecast3h(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Forecast3hResponse, OpenWeatherError> {
        validate_coordinates(lat, lon).map_err(OpenWeatherError::InvalidInput)?;

        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_forecast3h_path
        );

        self.get_json(&url, &[
            ("lat", &lat.to_string()),
            ("lon", &lon.to_string()),
            ("units", "metric"),
            ("appid", &self.config.openweather_api_key),
        ])
        .await
    }

    /// Seven-day forecast. When the daily endpoint refuses the key (free
    /// tier), the 3-hour forecast is fetched instead and reduced to one point
    /// per day. Both paths return the same shape.
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastDay>, OpenWeatherError> {
        match forecast_outcome(self.daily_forecast(lat, lon).await) {
            FetchOutcome::Primary(days) => Ok(days),
            FetchOutcome::Recoverable(err) => {
                tracing::warn!(
                    "Daily forecast unavailable ({}), deriving days from 3-hour forecast",
                    err
                );
                let forecast = self
                    .get_forecast3h(lat, lon)
                    .await
                    .map_err(as_request_failed)?;
                Ok(daily_from_3h(&forecast.list))
            }
            FetchOutcome::Fatal(err) => Err(as_request_failed(err)),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, OpenWeatherError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        match status {
            s if s.is_success() => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| OpenWeatherError::MalformedResponse(e.to_string()))
            }
            reqwest::StatusCode::NOT_FOUND => Err(OpenWeatherError::NotFound),
            reqwest::StatusCode::UNAUTHORIZED => {
                let error_text = response.text().await.unwrap_or_default();
                Err(OpenWeatherError::Unauthorized(truncate_body(&error_text)))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(OpenWeatherError::RequestFailed(format!(
                    "HTTP {}: {}",
                    status,
                    truncate_body(&error_text)
                )))
            }
        }
    }
}

/// A forecast is looked up by coordinates, so a 404 or a bad payload from
/// either forecast endpoint is an upstream failure, not an unknown location.
fn as_request_failed(err: OpenWeatherError) -> OpenWeatherError {
    match err {
        OpenWeatherError::InvalidInput(_) | OpenWeatherError::RequestFailed(_) => err,
        other => OpenWeatherError::RequestFailed(other.to_string()),
    }
}
