use super::openmeteo::{HistoryError, HourlySeries};
use crate::utils::round_to_decimals;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HISTORY_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalDayPoint {
    pub date: String,
    pub avg_temp: f64,
    pub humidity: u8,
    pub rainfall: f64,
}

#[derive(Debug, Default)]
struct DayAccumulator {
    temp_sum: f64,
    humidity_sum: f64,
    rain_sum: f64,
    samples: u32,
}

/// The seven days ending yesterday, as inclusive `(start, end)` dates.
pub fn history_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(HISTORY_DAYS), today - Duration::days(1))
}

/// Short chart label, e.g. "Mon, Jan 5".
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Reduce an hourly series to one point per calendar date, oldest first.
///
/// Hours without a temperature or humidity reading are skipped; a missing
/// rain reading counts as no rain. Dates left without any usable hour are
/// not reported.
pub fn aggregate_daily(series: &HourlySeries) -> Result<Vec<HistoricalDayPoint>, HistoryError> {
    let len = series.time.len();
    if series.temperature_2m.len() != len
        || series.relative_humidity_2m.len() != len
        || series.rain.len() != len
    {
        return Err(HistoryError::MalformedResponse(format!(
            "series lengths differ: time={}, temperature_2m={}, relative_humidity_2m={}, rain={}",
            len,
            series.temperature_2m.len(),
            series.relative_humidity_2m.len(),
            series.rain.len()
        )));
    }

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for (i, timestamp) in series.time.iter().enumerate() {
        let date = parse_date_part(timestamp)?;

        let (Some(temp), Some(humidity)) = (series.temperature_2m[i], series.relative_humidity_2m[i]) else {
            continue;
        };
        let rain = series.rain[i].unwrap_or(0.0).max(0.0);

        let day = days.entry(date).or_default();
        day.temp_sum += temp;
        day.humidity_sum += humidity;
        day.rain_sum += rain;
        day.samples += 1;
    }

    Ok(days
        .into_iter()
        .map(|(date, day)| {
            let count = day.samples as f64;
            HistoricalDayPoint {
                date: format_day_label(date),
                avg_temp: round_to_decimals(day.temp_sum / count, 1),
                humidity: (day.humidity_sum / count).round().clamp(0.0, 100.0) as u8,
                rainfall: round_to_decimals(day.rain_sum, 1),
            }
        })
        .collect())
}

fn parse_date_part(timestamp: &str) -> Result<NaiveDate, HistoryError> {
    timestamp
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| HistoryError::MalformedResponse(format!("bad timestamp '{}'", timestamp)))
}
