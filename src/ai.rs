use crate::config::Config;
use crate::weather::types::CurrentConditions;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Reply used whenever the assistant can't answer.
pub const ASSISTANT_FALLBACK: &str = "Unable to generate analysis at this time.";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Empty response from model")]
    EmptyResponse,
    #[error("Assistant is not configured")]
    NotConfigured,
}

/// Weather context attached to an assistant question.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeatherContext {
    Full(CurrentConditions),
    Location { name: String },
}

impl WeatherContext {
    /// Accepts whatever the client sent as context and keeps it only when it
    /// matches one of the known shapes.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<WeatherContext>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
    }

    fn clause(&self) -> String {
        match self {
            WeatherContext::Full(current) => format!(
                "Context: The current weather in {} is {}°C, with {} and {}% humidity.",
                current.name, current.temperature, current.description, current.humidity
            ),
            WeatherContext::Location { name } => {
                format!("Context: Analyzing weather data for {}.", name)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct AssistantClient {
    client: Client,
    config: Config,
}

impl AssistantClient {
    pub fn new(config: Config) -> Result<Self, AiError> {
        let client = Client::builder()
            .user_agent("WeatherDashboard/1.0")
            .timeout(Duration::from_secs(config.http_timeout_secs.max(60)))
            .build()?;

        Ok(Self { client, config })
    }

    /// Answer a question, reporting backend failures to the caller.
    pub async fn generate(
        &self,
        query: &str,
        context: Option<&WeatherContext>,
    ) -> Result<String, AiError> {
        let prompt = build_prompt(query, context);
        self.generate_content(&prompt).await
    }

    /// Answer a question; any failure becomes [`ASSISTANT_FALLBACK`].
    pub async fn ask(&self, query: &str, context: Option<&WeatherContext>) -> String {
        match self.generate(query, context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Assistant request failed: {}", e);
                ASSISTANT_FALLBACK.to_string()
            }
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self
            .config
            .gemini_api_key
            .as_deref()
            .ok_or(AiError::NotConfigured)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.gemini_base_url, self.config.gemini_model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 800,
                temperature: 0.7,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let body: GenerateResponse = response.json().await?;
                let text = body
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.content)
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .map(|p| p.text)
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();

                if text.trim().is_empty() {
                    Err(AiError::EmptyResponse)
                } else {
                    Ok(text)
                }
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(AiError::RateLimited),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(AiError::ApiError(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }
}

pub fn build_prompt(query: &str, context: Option<&WeatherContext>) -> String {
    let mut prompt = String::from("You are a helpful and witty weather assistant.\n");

    if let Some(context) = context {
        prompt.push_str(&context.clause());
        prompt.push('\n');
    }

    prompt.push_str(&format!("\nUser Request: {}\n\n", query));
    prompt.push_str("Provide a concise, helpful response based on the context and request.");

    prompt
}
