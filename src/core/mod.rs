//! LLM backends
//!
//! Each backend turns a prompt into text with a single non-streamed HTTP
//! call and can list the models the upstream offers.

use crate::config::{LlmProvider, Settings};
use crate::error::RelayError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod ollama;
pub mod openrouter;
pub mod prompt;

/// Trait for LLM backends
#[async_trait]
pub trait LlmBackend: Send + Sync + std::fmt::Debug {
    /// Generate a completion for `prompt`. A missing text field yields `""`.
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;

    /// Model identifiers offered by the upstream
    async fn list_models(&self) -> Result<Vec<String>, RelayError>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Factory for the configured backend
pub fn create_backend(settings: &Settings) -> Arc<dyn LlmBackend> {
    match settings.llm_provider {
        LlmProvider::Ollama => {
            info!(
                "  - Using Ollama at {} (model: {})",
                settings.ollama_endpoint, settings.ollama_model
            );
            Arc::new(ollama::OllamaBackend::new(settings))
        }
        LlmProvider::OpenRouter => {
            info!("  - Using OpenRouter (model: {})", settings.openrouter_model);
            Arc::new(openrouter::OpenRouterBackend::new(settings))
        }
    }
}

/// Send a request and read its JSON body.
///
/// Transport failures become `UpstreamUnreachable`, non-success statuses
/// `UpstreamHttpError`, bodies that are not JSON `MalformedResponse`.
pub(crate) async fn send_json(
    backend: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, RelayError> {
    let response = request.send().await.map_err(|e| {
        warn!("❌ {} unreachable: {}", backend, e);
        RelayError::UpstreamUnreachable(e.to_string())
    })?;

    let status = response.status();
    let body_text = response.text().await?;

    if !status.is_success() {
        warn!("❌ {} API Error ({}): {}", backend, status, body_text);
        return Err(RelayError::UpstreamHttpError(status.as_u16()));
    }

    debug!("🧠 {} raw body: {}", backend, body_text);

    serde_json::from_str(&body_text).map_err(|e| {
        warn!(
            "❌ Failed to deserialize {} response: {} - Body: {}",
            backend, e, body_text
        );
        RelayError::MalformedResponse(e.to_string())
    })
}
