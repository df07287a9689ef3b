//! OpenRouter Integration
//!
//! OpenAI-compatible chat completions behind a bearer API key.

use super::{send_json, LlmBackend};
use crate::config::Settings;
use crate::error::RelayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Clone)]
pub struct OpenRouterBackend {
    url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenRouterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterBackend")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .finish()
    }
}

impl OpenRouterBackend {
    pub fn new(settings: &Settings) -> Self {
        Self::with_url(
            &settings.openrouter_endpoint,
            &settings.openrouter_model,
            &settings.openrouter_api_key,
        )
    }

    pub fn with_url(url: &str, model: &str, api_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, RelayError> {
        if self.api_key.is_empty() {
            return Err(RelayError::MissingApiKey);
        }
        Ok(&self.api_key)
    }
}

#[async_trait]
impl LlmBackend for OpenRouterBackend {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let api_key = self.api_key()?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let request = self
            .client
            .post(format!("{}/api/v1/chat/completions", self.url))
            .bearer_auth(api_key)
            .json(&body);

        let response = send_json(self.name(), request).await?;
        let text = response
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Ok(text.to_string())
    }

    async fn list_models(&self) -> Result<Vec<String>, RelayError> {
        let request = self.client.get(format!("{}/api/v1/models", self.url));
        let body = send_json(self.name(), request).await?;

        let list: ModelList = serde_json::from_value(body)
            .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
