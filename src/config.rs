use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the result popup opens relative to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupPosition {
    Above,
    Below,
}

/// Which LLM backend the relay talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    OpenRouter,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Persisted settings. Keys are camelCase on disk; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // Behaviour
    pub enabled: bool,
    pub popup_delay: u64,
    pub popup_position: PopupPosition,
    pub sidebar_transparency: u32,

    // AI
    pub llm_provider: LlmProvider,
    pub ollama_model: String,
    pub ollama_endpoint: String,
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    pub openrouter_endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            popup_delay: 300,
            popup_position: PopupPosition::Below,
            sidebar_transparency: 0,
            llm_provider: LlmProvider::Ollama,
            ollama_model: "llama2".to_string(),
            ollama_endpoint: "http://localhost:11434".to_string(),
            openrouter_api_key: "".to_string(),
            openrouter_model: "openrouter/auto".to_string(),
            openrouter_endpoint: "https://openrouter.ai".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load settings from `path`. A corrupt file is moved aside.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(settings) => Ok(settings.normalized()),
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Settings file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Write the defaults on first start, then load
    pub fn load_or_init() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("🆕 Writing default settings to {:?}", path);
            Self::default().save_to(&path)?;
        }
        Self::load_from(&path)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.clone().normalized())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp values into their documented ranges
    pub fn normalized(mut self) -> Self {
        self.sidebar_transparency = self.sidebar_transparency.min(100);
        self.ollama_endpoint = self.ollama_endpoint.trim_end_matches('/').to_string();
        self.openrouter_endpoint = self.openrouter_endpoint.trim_end_matches('/').to_string();
        self
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("context-explainer")
        .join("config.json")
}
