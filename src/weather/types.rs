use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions for one location, as served to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub coord: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastDay>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Unix timestamp (seconds) of the day or of its representative sample.
    pub date: i64,
    pub temp: DayTemperature,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTemperature {
    pub min: f64,
    pub max: f64,
    pub day: f64,
}

// OpenWeather wire formats. Only the fields the dashboard reads are declared;
// anything else in the payload is ignored.

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    pub name: String,
    pub coord: OwCoord,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    pub wind: OwWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecastResponse {
    pub list: Vec<DailyForecastItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecastItem {
    pub dt: i64,
    pub temp: DailyForecastTemp,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecastTemp {
    pub day: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast3hResponse {
    pub list: Vec<Forecast3hItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast3hItem {
    pub dt: i64,
    pub main: Forecast3hMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast3hMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

/// First weather entry's description and icon, or "Unknown" with no icon.
fn describe(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(current: OwCurrentResponse) -> Self {
        let (description, icon) = describe(&current.weather);

        Self {
            name: current.name,
            coord: Coordinates {
                lat: current.coord.lat,
                lon: current.coord.lon,
            },
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            humidity: current.main.humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed: current.wind.speed,
            description,
            icon,
            forecast: None,
        }
    }
}

impl From<&DailyForecastItem> for ForecastDay {
    fn from(item: &DailyForecastItem) -> Self {
        let (description, icon) = describe(&item.weather);

        Self {
            date: item.dt,
            temp: DayTemperature {
                min: item.temp.min,
                max: item.temp.max,
                day: item.temp.day,
            },
            description,
            icon,
        }
    }
}

impl From<&Forecast3hItem> for ForecastDay {
    fn from(item: &Forecast3hItem) -> Self {
        let (description, icon) = describe(&item.weather);

        Self {
            date: item.dt,
            temp: DayTemperature {
                min: item.main.temp_min,
                max: item.main.temp_max,
                day: item.main.temp,
            },
            description,
            icon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_response_maps_to_conditions() {
        let raw: OwCurrentResponse = serde_json::from_value(json!({
            "name": "London",
            "coord": { "lat": 51.5, "lon": -0.12 },
            "main": { "temp": 14.2, "feels_like": 13.1, "humidity": 81, "pressure": 1012 },
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
            "wind": { "speed": 4.6, "deg": 230 }
        }))
        .unwrap();

        let conditions = CurrentConditions::from(raw);

        assert_eq!(conditions.name, "London");
        assert_eq!(conditions.coord, Coordinates { lat: 51.5, lon: -0.12 });
        assert_eq!(conditions.humidity, 81);
        assert_eq!(conditions.description, "light rain");
        assert_eq!(conditions.icon, "10d");
        assert!(conditions.forecast.is_none());
    }

    #[test]
    fn missing_weather_entry_is_unknown() {
        let raw: OwCurrentResponse = serde_json::from_value(json!({
            "name": "Nowhere",
            "coord": { "lat": 0.0, "lon": 0.0 },
            "main": { "temp": 1.0, "feels_like": 1.0, "humidity": 50 },
            "wind": { "speed": 0.0 }
        }))
        .unwrap();

        let conditions = CurrentConditions::from(raw);
        assert_eq!(conditions.description, "Unknown");
        assert_eq!(conditions.icon, "");
    }

    #[test]
    fn missing_main_block_is_rejected() {
        let parsed = serde_json::from_value::<OwCurrentResponse>(json!({
            "name": "London",
            "coord": { "lat": 51.5, "lon": -0.12 },
            "wind": { "speed": 4.6 }
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn forecast_serializes_without_empty_forecast_field() {
        let conditions = CurrentConditions {
            name: "Oslo".to_string(),
            coord: Coordinates { lat: 59.9, lon: 10.7 },
            temperature: 3.0,
            feels_like: 1.0,
            humidity: 70,
            wind_speed: 2.0,
            description: "mist".to_string(),
            icon: "50d".to_string(),
            forecast: None,
        };

        let value = serde_json::to_value(&conditions).unwrap();
        assert!(value.get("forecast").is_none());
        assert_eq!(value["coord"]["lat"], 59.9);
    }
}
