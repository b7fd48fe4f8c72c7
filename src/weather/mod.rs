pub mod openweather;
pub mod reshape;
pub mod types;

use openweather::OpenWeatherError;
use types::ForecastDay;

/// Result of a primary provider call, classified by whether a fallback path
/// may take over.
#[derive(Debug)]
pub enum FetchOutcome<T, E> {
    Primary(T),
    Recoverable(E),
    Fatal(E),
}

/// Only an authorization refusal of the daily forecast is recoverable; it
/// means the key's tier lacks that endpoint, not that the location is bad.
pub fn forecast_outcome(
    result: Result<Vec<ForecastDay>, OpenWeatherError>,
) -> FetchOutcome<Vec<ForecastDay>, OpenWeatherError> {
    match result {
        Ok(days) => FetchOutcome::Primary(days),
        Err(err @ OpenWeatherError::Unauthorized(_)) => FetchOutcome::Recoverable(err),
        Err(err) => FetchOutcome::Fatal(err),
    }
}
