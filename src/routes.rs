use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    ai::{AssistantClient, WeatherContext},
    history::{aggregate::HistoricalDayPoint, HistoricalSeries, HistoryService, HistorySource},
    searches::RecentSearches,
    utils::{validate_coordinates, ErrorResponse},
    weather::{
        openweather::{LocationQuery, OpenWeatherClient, OpenWeatherError},
        types::{Coordinates, CurrentConditions, ForecastDay},
    },
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub weather_client: Arc<OpenWeatherClient>,
    pub history: Arc<HistoryService>,
    pub assistant: Arc<AssistantClient>,
    pub searches: Arc<RecentSearches>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, "upstream_failed", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m),
        };

        (status, Json(ErrorResponse::new(&message, code))).into_response()
    }
}

impl From<OpenWeatherError> for ApiError {
    fn from(err: OpenWeatherError) -> Self {
        match err {
            OpenWeatherError::NotFound => ApiError::NotFound("City not found".to_string()),
            OpenWeatherError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!("Weather provider request failed: {}", other);
                ApiError::BadGateway("Failed to fetch weather data".to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub forecast: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl CoordinatesQuery {
    fn required(&self) -> Result<(f64, f64), ApiError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(ApiError::BadRequest("Both lat and lon are required".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(
        default,
        rename = "weatherData",
        deserialize_with = "WeatherContext::deserialize_lenient"
    )]
    pub weather_data: Option<WeatherContext>,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub city: String,
    pub source: HistorySource,
    pub days: Vec<HistoricalDayPoint>,
    pub insights: String,
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<CurrentConditions>, ApiError> {
    let Query(params) = params?;
    let query = match (params.city, params.lat, params.lon) {
        (Some(city), _, _) if !city.trim().is_empty() => LocationQuery::City(city),
        (_, Some(lat), Some(lon)) => LocationQuery::Coordinates(Coordinates { lat, lon }),
        _ => {
            return Err(ApiError::BadRequest(
                "Provide a city name or both lat and lon".to_string(),
            ))
        }
    };

    let mut conditions = state.weather_client.current_conditions(&query).await?;

    if params.forecast.unwrap_or(true) {
        match state
            .weather_client
            .forecast(conditions.coord.lat, conditions.coord.lon)
            .await
        {
            Ok(days) => conditions.forecast = Some(days),
            Err(e) => tracing::warn!("Forecast unavailable for {}: {}", conditions.name, e),
        }
    }

    state.searches.record(conditions.clone()).await;

    Ok(Json(conditions))
}

pub async fn get_forecast(
    State(state): State<AppState>,
    params: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<Vec<ForecastDay>>, ApiError> {
    let (lat, lon) = params?.0.required()?;
    let days = state.weather_client.forecast(lat, lon).await?;
    Ok(Json(days))
}

pub async fn get_history(
    State(state): State<AppState>,
    params: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<HistoricalSeries>, ApiError> {
    let (lat, lon) = params?.0.required()?;
    validate_coordinates(lat, lon).map_err(ApiError::BadRequest)?;
    Ok(Json(state.history.history(lat, lon).await))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    params: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let Query(params) = params?;
    let city = params.city.unwrap_or_default().trim().to_string();
    if city.is_empty() {
        return Err(ApiError::BadRequest("city is required".to_string()));
    }

    let series = match state
        .weather_client
        .current_conditions(&LocationQuery::City(city.clone()))
        .await
    {
        Ok(current) => state.history.history(current.coord.lat, current.coord.lon).await,
        Err(e) => {
            tracing::warn!("Could not resolve {} for analytics ({}); using synthetic data", city, e);
            state.history.synthetic_now()
        }
    };

    let data = serde_json::to_string(&series.days)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let query = format!(
        "Analyze this historical weather data for {} and provide 3 key insights or trends: {}. Format as a concise list.",
        city, data
    );
    let context = WeatherContext::Location { name: city.clone() };
    let insights = state.assistant.ask(&query, Some(&context)).await;

    Ok(Json(AnalyticsResponse {
        city,
        source: series.source,
        days: series.days,
        insights,
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = request?;
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }

    match state
        .assistant
        .generate(&request.query, request.weather_data.as_ref())
        .await
    {
        Ok(text) => Ok(Json(ChatResponse { text })),
        Err(e) => {
            tracing::error!("Assistant request failed: {}", e);
            Err(ApiError::Internal("Failed to generate AI response".to_string()))
        }
    }
}

pub async fn list_searches(State(state): State<AppState>) -> Json<Vec<CurrentConditions>> {
    Json(state.searches.list().await)
}

pub async fn clear_searches(State(state): State<AppState>) -> StatusCode {
    state.searches.clear().await;
    StatusCode::NO_CONTENT
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/weather", get(get_weather))
        .route("/api/forecast", get(get_forecast))
        .route("/api/history", get(get_history))
        .route("/api/analytics", get(get_analytics))
        .route("/api/chat", post(chat))
        .route("/api/searches", get(list_searches).delete(clear_searches))
        .with_state(state)
}
