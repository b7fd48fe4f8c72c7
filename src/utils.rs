use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}

/// Round to specified decimal places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let multiplier = 10_f64.powi(decimals as i32);
    (value * multiplier).round() / multiplier
}

/// Parse timezone string and validate
pub fn parse_timezone(tz_str: &str) -> Result<chrono_tz::Tz, String> {
    tz_str.parse::<chrono_tz::Tz>()
        .map_err(|_| format!("Invalid timezone: {}", tz_str))
}

/// Calendar date of `now` in the given timezone, falling back to UTC when the
/// name doesn't parse.
pub fn local_date(now: DateTime<Utc>, timezone: &str) -> NaiveDate {
    match parse_timezone(timezone) {
        Ok(tz) => now.with_timezone(&tz).date_naive(),
        Err(_) => now.date_naive(),
    }
}

/// Generate a cache key for weather data
pub fn weather_cache_key(lat: f64, lon: f64, endpoint: &str) -> String {
    format!("weather_{}_{:.4}_{:.4}", endpoint, lat, lon)
}

/// Cap an upstream error body before it goes into an error message.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(12.345, 1), 12.3);
        assert_eq!(round_to_decimals(12.35, 0), 12.0);
        assert_eq!(round_to_decimals(-0.04, 1), -0.0);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 23, 30, 0).unwrap();
        assert_eq!(local_date(now, "UTC"), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(local_date(now, "Asia/Tokyo"), NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        assert_eq!(local_date(now, "not-a-zone"), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }

    #[test]
    fn test_weather_cache_key() {
        assert_eq!(weather_cache_key(51.5, -0.12, "history"), "weather_history_51.5000_-0.1200");
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
