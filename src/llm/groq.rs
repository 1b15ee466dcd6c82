use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::http::build_http_client;
use crate::utils::timing::log_llm_timing;

const ERROR_BODY_LOG_LIMIT: usize = 2000;

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum UpstreamCallError {
    #[error("LLM API key is not configured")]
    MissingApiKey,
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("LLM request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("LLM response contained no message content")]
    EmptyResponse,
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), ERROR_BODY_LOG_LIMIT));
    }

    (None, truncate_for_log(trimmed, ERROR_BODY_LOG_LIMIT))
}

fn extract_message_content(response: &Value) -> Option<String> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())?
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Chat-completions client for Groq's OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct GroqClient {
    settings: Arc<LlmSettings>,
    http: Client,
}

impl GroqClient {
    pub fn new(settings: LlmSettings) -> Result<Self, UpstreamCallError> {
        let http = build_http_client(settings.timeout)?;
        Ok(Self {
            settings: Arc::new(settings),
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn call_api(&self, payload: &Value) -> Result<Value, UpstreamCallError> {
        debug!(
            "Groq request: model={}, max_tokens={}",
            self.settings.model, self.settings.max_tokens
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!("Failed to read Groq error body (status={}): {}", status, err);
                    String::new()
                }
            };
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Groq API error: status={}, body={}", status, body_summary);
            return Err(UpstreamCallError::Status {
                status,
                message: message.unwrap_or(body_summary),
            });
        }

        let value = response.json::<Value>().await?;
        debug!("Groq response received for model={}", self.settings.model);
        Ok(value)
    }

    /// Sends one system + user exchange and returns the raw reply text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<String, UpstreamCallError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(UpstreamCallError::MissingApiKey);
        }

        let payload = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        let payload = &payload;
        log_llm_timing("groq", &self.settings.model, "styling", None, || async move {
            let response = self.call_api(payload).await?;
            extract_message_content(&response).ok_or_else(|| {
                warn!(
                    "Groq response had no message content: {}",
                    truncate_for_log(&response.to_string(), ERROR_BODY_LOG_LIMIT)
                );
                UpstreamCallError::EmptyResponse
            })
        })
        .await
    }
}
