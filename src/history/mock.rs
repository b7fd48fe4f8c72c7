use super::aggregate::{format_day_label, HistoricalDayPoint, HISTORY_DAYS};
use crate::utils::round_to_decimals;
use chrono::{Duration, NaiveDate};

/// Stand-in week of history used when the provider can't be used. Values are
/// random within plausible bounds: temperature 25 ± 5 °C, humidity 40-80 %,
/// rainfall 0-5 mm.
pub fn synthetic_week(start: NaiveDate) -> Vec<HistoricalDayPoint> {
    (0..HISTORY_DAYS)
        .map(|day| {
            let date = start + Duration::days(day);
            let avg_temp = 25.0 + 10.0 * (fastrand::f64() - 0.5);
            let humidity = fastrand::u8(40..=80);
            let rainfall = 5.0 * fastrand::f64();

            HistoricalDayPoint {
                date: format_day_label(date),
                avg_temp: round_to_decimals(avg_temp, 1),
                humidity,
                rainfall: round_to_decimals(rainfall, 1),
            }
        })
        .collect()
}
