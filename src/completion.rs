//! Text-completion service abstraction.
//!
//! Defines the [`CompletionClient`] trait used by the analytics bridge and
//! [`OpenAiClient`], which calls an OpenAI-compatible
//! `POST {base_url}/chat/completions` endpoint.
//!
//! There is no retry: a failed call surfaces as
//! [`StartupError::Upstream`] and the caller decides what to do. The only
//! timeout is the HTTP client's own (`analytics.timeout_secs`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AnalyticsConfig;
use crate::error::{Result, StartupError};

/// One system + user exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the completion text for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Chat-completions client for OpenAI and compatible servers.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// Builds the client. A missing API key is not an error here so the
    /// rest of the service stays usable; calls fail until it is set.
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StartupError::Upstream(format!("failed to build HTTP client: {}", e)))?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StartupError::Upstream(format!("{} environment variable not set", self.api_key_env))
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::info!("requesting completion from {} ({})", self.base_url, self.model);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StartupError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("completion service returned {}: {}", status, detail);
            return Err(StartupError::Upstream(format!(
                "completion service returned {}",
                status
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StartupError::Upstream(format!("unreadable response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| StartupError::Upstream("response contained no choices".to_string()))
    }
}
