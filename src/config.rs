use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub openweather_current_path: String,
    pub openweather_daily_path: String,
    pub openweather_forecast3h_path: String,
    pub openmeteo_base_url: String,
    pub openmeteo_history_path: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub app_timezone: String,
    pub http_timeout_secs: u64,
    pub recent_searches_limit: usize,
    pub history_cache_ttl_secs: u64,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let parse_or = |key: &str, default: u64| -> anyhow::Result<u64> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a positive integer, got '{}'", key, raw)),
                None => Ok(default),
            }
        };

        let config = Config {
            openweather_api_key: lookup("OPENWEATHER_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("OPENWEATHER_API_KEY not set"))?,
            openweather_base_url: or_default("OPENWEATHER_BASE_URL", "https://api.openweathermap.org"),
            openweather_current_path: or_default("OPENWEATHER_CURRENT_PATH", "/data/2.5/weather"),
            openweather_daily_path: or_default("OPENWEATHER_DAILY_PATH", "/data/2.5/forecast/daily"),
            openweather_forecast3h_path: or_default("OPENWEATHER_FORECAST3H_PATH", "/data/2.5/forecast"),
            openmeteo_base_url: or_default(
                "OPENMETEO_BASE_URL",
                "https://historical-forecast-api.open-meteo.com",
            ),
            openmeteo_history_path: or_default("OPENMETEO_HISTORY_PATH", "/v1/forecast"),
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()),
            gemini_base_url: or_default(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            gemini_model: or_default("GEMINI_MODEL", "gemini-2.5-flash"),
            app_timezone: or_default("APP_TIMEZONE", "UTC"),
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 30)?,
            recent_searches_limit: parse_or("RECENT_SEARCHES_LIMIT", 20)? as usize,
            history_cache_ttl_secs: parse_or("HISTORY_CACHE_TTL_SECS", 3600)?,
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:8080"),
        };

        crate::utils::parse_timezone(&config.app_timezone).map_err(|e| anyhow::anyhow!(e))?;

        Ok(config)
    }

    /// Config pointing every provider at one base URL, used by the
    /// mock-server tests.
    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        Config {
            openweather_api_key: "test-key".to_string(),
            openweather_base_url: base_url.to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_daily_path: "/data/2.5/forecast/daily".to_string(),
            openweather_forecast3h_path: "/data/2.5/forecast".to_string(),
            openmeteo_base_url: base_url.to_string(),
            openmeteo_history_path: "/v1/forecast".to_string(),
            gemini_api_key: Some("gemini-test-key".to_string()),
            gemini_base_url: base_url.to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            app_timezone: "UTC".to_string(),
            http_timeout_secs: 5,
            recent_searches_limit: 3,
            history_cache_ttl_secs: 60,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_openweather_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup_from(&[("OPENWEATHER_API_KEY", "abc")])).unwrap();

        assert_eq!(config.openweather_api_key, "abc");
        assert_eq!(config.openweather_base_url, "https://api.openweathermap.org");
        assert_eq!(config.openweather_daily_path, "/data/2.5/forecast/daily");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.app_timezone, "UTC");
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.recent_searches_limit, 20);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn overrides_and_blank_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENWEATHER_API_KEY", "abc"),
            ("GEMINI_API_KEY", "  "),
            ("APP_TIMEZONE", "Europe/London"),
            ("RECENT_SEARCHES_LIMIT", "5"),
        ]))
        .unwrap();

        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.app_timezone, "Europe/London");
        assert_eq!(config.recent_searches_limit, 5);
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENWEATHER_API_KEY", "abc"),
            ("APP_TIMEZONE", "Mars/Olympus"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("Invalid timezone"));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENWEATHER_API_KEY", "abc"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("HTTP_TIMEOUT_SECS"));
    }
}
