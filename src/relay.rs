//! Request Relay
//!
//! The only component that talks to the network. Turns an
//! [`ExplanationRequest`] into a prompt, hands it to the configured backend
//! and returns the text or the failure. No retries, no timeout.

use crate::capture::ExplanationRequest;
use crate::config::Settings;
use crate::core::{self, prompt::build_prompt, LlmBackend};
use crate::error::RelayError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Text of the explanation, or why there is none
pub type ExplanationResult = Result<String, RelayError>;

#[derive(Debug, Clone)]
pub struct Relay {
    backend: Arc<dyn LlmBackend>,
}

impl Relay {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Relay for the provider named in `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(core::create_backend(settings))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Ask the upstream what `request.word()` means in `request.context()`
    pub async fn explain(&self, request: &ExplanationRequest) -> ExplanationResult {
        let prompt = build_prompt(request);
        debug!("Prompt for '{}': {}", request.word(), prompt);

        match self.backend.generate(&prompt).await {
            Ok(text) => {
                info!(
                    "✅ Explanation for '{}' from {} ({} chars)",
                    request.word(),
                    self.backend.name(),
                    text.chars().count()
                );
                Ok(text)
            }
            Err(e) => {
                warn!("❌ Error getting explanation for '{}': {}", request.word(), e);
                Err(e)
            }
        }
    }

    /// Model identifiers offered by the upstream (may be empty)
    pub async fn list_available_models(&self) -> Result<Vec<String>, RelayError> {
        let models = self.backend.list_models().await?;
        debug!("{} lists {} models", self.backend.name(), models.len());
        Ok(models)
    }
}
