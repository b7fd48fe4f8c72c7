use super::types::{Forecast3hItem, ForecastDay};
use chrono::NaiveDate;
use std::collections::HashSet;

pub const FORECAST_DAYS: usize = 7;

/// Collapse a 3-hour forecast into one point per calendar date.
///
/// The first sample seen for a date represents that date (no averaging).
/// Dates keep their order of first appearance and collection stops once
/// `FORECAST_DAYS` distinct dates are found. Samples with an out-of-range
/// timestamp are skipped.
pub fn daily_from_3h(items: &[Forecast3hItem]) -> Vec<ForecastDay> {
    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut days = Vec::with_capacity(FORECAST_DAYS);

    for item in items {
        if days.len() >= FORECAST_DAYS {
            break;
        }

        let Some(date) = chrono::DateTime::from_timestamp(item.dt, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        if seen.insert(date) {
            days.push(ForecastDay::from(item));
        }
    }

    days
}
