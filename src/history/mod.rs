pub mod aggregate;
pub mod mock;
pub mod openmeteo;

use crate::config::Config;
use crate::utils::{local_date, weather_cache_key};
use aggregate::{aggregate_daily, history_window, HistoricalDayPoint};
use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use openmeteo::{HistoryError, OpenMeteoClient};
use serde::Serialize;
use std::time::Duration;

pub type HistoryCache = Cache<String, Vec<HistoricalDayPoint>>;

pub fn init_cache(ttl: Duration) -> HistoryCache {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(ttl)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    Live,
    Synthetic,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSeries {
    pub source: HistorySource,
    pub days: Vec<HistoricalDayPoint>,
}

impl HistoricalSeries {
    pub fn synthetic(start: NaiveDate) -> Self {
        Self {
            source: HistorySource::Synthetic,
            days: mock::synthetic_week(start),
        }
    }
}

pub struct HistoryService {
    client: OpenMeteoClient,
    cache: HistoryCache,
    timezone: String,
}

impl HistoryService {
    pub fn new(config: Config) -> Result<Self, HistoryError> {
        let cache = init_cache(Duration::from_secs(config.history_cache_ttl_secs));
        let timezone = config.app_timezone.clone();
        let client = OpenMeteoClient::new(config)?;

        Ok(Self {
            client,
            cache,
            timezone,
        })
    }

    pub fn today(&self) -> NaiveDate {
        local_date(Utc::now(), &self.timezone)
    }

    /// Last week of daily aggregates for a location. Never fails: any
    /// provider problem yields a synthetic week instead.
    pub async fn history(&self, lat: f64, lon: f64) -> HistoricalSeries {
        self.history_as_of(lat, lon, self.today()).await
    }

    pub async fn history_as_of(&self, lat: f64, lon: f64, today: NaiveDate) -> HistoricalSeries {
        let (start, end) = history_window(today);

        match self.live_history(lat, lon, start, end).await {
            Ok(days) => HistoricalSeries {
                source: HistorySource::Live,
                days,
            },
            Err(err) => {
                tracing::warn!(
                    "Historical data unavailable for ({:.4}, {:.4}): {}; using synthetic data",
                    lat,
                    lon,
                    err
                );
                HistoricalSeries::synthetic(start)
            }
        }
    }

    /// Synthetic week for the current window, for callers that couldn't
    /// resolve a location at all.
    pub fn synthetic_now(&self) -> HistoricalSeries {
        let (start, _) = history_window(self.today());
        HistoricalSeries::synthetic(start)
    }

    async fn live_history(
        &self,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricalDayPoint>, HistoryError> {
        let key = format!("{}_{}", weather_cache_key(lat, lon, "history"), end);
        if let Some(days) = self.cache.get(&key).await {
            tracing::debug!("History cache hit for {}", key);
            return Ok(days);
        }

        let series = self.client.get_hourly(lat, lon, start, end).await?;
        let days = aggregate_daily(&series)?;
        if days.is_empty() {
            return Err(HistoryError::Empty);
        }

        self.cache.insert(key, days.clone()).await;
        Ok(days)
    }
}
