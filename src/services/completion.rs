use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::config::Settings;
use crate::core::metrics;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompletionRequest {
    pub(crate) flow: &'static str,
    pub(crate) model: String,
    pub(crate) prompt: String,
    pub(crate) temperature: f64,
}

#[derive(Debug, Error)]
pub(crate) enum AiError {
    #[error("completion API is not configured")]
    NotConfigured,
    #[error("completion API returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("failed to reach completion API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned an empty response")]
    EmptyResponse,
    #[error("completion output does not match the expected shape: {0}")]
    MalformedOutput(String),
}

/// Single-shot chat completion returning the raw message text.
#[async_trait]
pub(crate) trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError>;

    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone)]
pub(crate) struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(settings.ai().request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.ai().max_tokens,
        })
    }

    fn payload(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [
                {"role": "user", "content": request.prompt}
            ],
            "max_tokens": self.max_tokens,
            "temperature": request.temperature,
            "response_format": {"type": "json_object"}
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::NotConfigured);
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Upstream { status, body });
        }

        let body: Value = response.json().await?;
        let tokens_used = body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(|value| value.as_u64());
        tracing::debug!(flow = request.flow, tokens_used = tokens_used, "Completion received");

        extract_content(&body)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        let timer = Instant::now();
        tracing::info!(flow = request.flow, model = %request.model, "Sending completion request");

        let result = self.send(&request).await;
        let elapsed = timer.elapsed();

        match &result {
            Ok(_) => {
                metrics::record_completion(request.flow, "success", elapsed);
                tracing::info!(
                    flow = request.flow,
                    duration_seconds = elapsed.as_secs_f64(),
                    "Completion request succeeded"
                );
            }
            Err(err) => {
                metrics::record_completion(request.flow, "failed", elapsed);
                tracing::error!(flow = request.flow, error = %err, "Completion request failed");
            }
        }

        result
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn extract_content(body: &Value) -> Result<String, AiError> {
    let content = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|value| value.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    Ok(content.to_string())
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
