use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod ai;
mod config;
mod history;
mod routes;
mod searches;
mod utils;
mod weather;

use ai::AssistantClient;
use config::Config;
use history::HistoryService;
use routes::{create_router, AppState};
use searches::RecentSearches;
use weather::openweather::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_dashboard_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; assistant replies will use fallback text");
    }

    let weather_client = Arc::new(OpenWeatherClient::new(config.clone())?);
    let history = Arc::new(HistoryService::new(config.clone())?);
    let assistant = Arc::new(AssistantClient::new(config.clone())?);
    let searches = Arc::new(RecentSearches::new(config.recent_searches_limit));

    let state = AppState {
        weather_client,
        history,
        assistant,
        searches,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
