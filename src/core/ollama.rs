//! Ollama Integration
//!
//! Talks to a local Ollama server: `/api/generate` for explanations and
//! `/api/tags` for the installed models.

use super::{send_json, LlmBackend};
use crate::config::Settings;
use crate::error::RelayError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Model entry from `/api/tags`
#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// Create new Ollama backend from settings
    pub fn new(settings: &Settings) -> Self {
        Self::with_url(&settings.ollama_endpoint, &settings.ollama_model)
    }

    pub fn with_url(url: &str, model: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let request = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false
            }));

        let body = send_json(self.name(), request).await?;

        let text = body
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if text.is_empty() {
            debug!("Ollama response carried no text");
        }
        Ok(text.to_string())
    }

    async fn list_models(&self) -> Result<Vec<String>, RelayError> {
        let request = self.client.get(format!("{}/api/tags", self.url));
        let body = send_json(self.name(), request).await?;

        let tags: OllamaTags = serde_json::from_value(body)
            .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
