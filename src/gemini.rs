//! Gemini API client
//!
//! Implements [`TextGenerator`] over the `generateContent` REST endpoint.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::CoachConfig;
use crate::error::CoachError;
use crate::llm::TextGenerator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str, model: &str) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        })
    }

    /// Build a client when the configuration carries an API key
    pub fn from_config(config: &CoachConfig) -> crate::Result<Option<Self>> {
        match &config.api_key {
            Some(key) => Self::new(key.clone(), &config.base_url, &config.model).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(CoachError::Config(
                "GOOGLE_API_KEY not configured".to_string(),
            ));
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 1024,
            },
        };

        debug!(endpoint = %self.endpoint, prompt_chars = prompt.chars().count(), "Calling Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                CoachError::Llm(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(CoachError::Llm(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            CoachError::Llm(format!("Gemini parse error: {}", e))
        })?;

        let answer = first_candidate_text(&gemini_response)?;

        info!(
            finish_reason = gemini_response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("unknown"),
            "Gemini response received"
        );

        Ok(answer.trim().to_string())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn first_candidate_text(response: &GeminiResponse) -> crate::Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| CoachError::Llm("No response from Gemini API".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(CoachError::Llm("Empty response from Gemini".to_string()));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
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
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}
