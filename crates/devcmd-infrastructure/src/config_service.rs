//! Application configuration.
//!
//! Loaded from `config.toml` in the devcmd config directory. Every field has
//! a default, so a partial file is fine and a missing or broken one yields
//! the defaults.

use std::path::Path;
use std::time::Duration;

use devcmd_core::selection::{ModelOption, OPENROUTER_MODEL_ID};
use devcmd_core::session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::storage::AtomicTomlFile;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_MODEL_ID: &str = "gemma";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    /// Initially selected model; responses from it are not announced.
    pub default_model: String,
    pub openrouter_filter: Option<String>,
    pub technologies: Vec<String>,
    #[serde(rename = "model")]
    pub models: Vec<ModelOption>,
    #[serde(rename = "openrouter_model")]
    pub openrouter_models: Vec<ModelOption>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_model: DEFAULT_MODEL_ID.to_string(),
            openrouter_filter: None,
            technologies: [
                "flutter",
                "python",
                "github",
                "docker",
                "node",
                "javascript",
                "java",
                "rust",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            models: vec![
                ModelOption::new("gemma", "Gemma 2 (7B)"),
                ModelOption::new("codellama", "Code Llama (7B)"),
                ModelOption::new("llama3", "Llama 3 (8B)"),
                ModelOption::new("openai", "OpenAI"),
                ModelOption::new("gemini", "Google Gemini"),
                ModelOption::new(OPENROUTER_MODEL_ID, "OpenRouter"),
                ModelOption::new("deepseek", "DeepSeek"),
                ModelOption::new("grok", "Grok"),
            ],
            openrouter_models: vec![
                ModelOption::new("openai/gpt-4o", "GPT-4o"),
                ModelOption::new("openai/gpt-4o-mini", "GPT-4o Mini"),
                ModelOption::new("anthropic/claude-3.5-sonnet", "Claude 3.5 Sonnet"),
                ModelOption::new("google/gemini-pro-1.5", "Gemini Pro 1.5"),
                ModelOption::new("meta-llama/llama-3.1-70b-instruct", "Llama 3.1 70B Instruct"),
                ModelOption::new("mistralai/mistral-large", "Mistral Large"),
                ModelOption::new("deepseek/deepseek-chat", "DeepSeek Chat"),
            ],
        }
    }
}

impl AppConfig {
    /// Per-request timeout. Zero would fail every request, so it means the
    /// default.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => {
                tracing::warn!(
                    "[Config] request_timeout_secs = 0, using {}s",
                    DEFAULT_REQUEST_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
            }
            secs => Duration::from_secs(secs),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            default_model: self.default_model.clone(),
            models: self.models.clone(),
            openrouter_models: self.openrouter_models.clone(),
            technologies: self.technologies.clone(),
            openrouter_filter: self.openrouter_filter.clone(),
        }
    }
}

/// Loads the application configuration.
pub struct ConfigService;

impl ConfigService {
    /// Reads `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> AppConfig {
        match AtomicTomlFile::<AppConfig>::new(path.to_path_buf()).load() {
            Ok(Some(config)) => {
                tracing::info!("[Config] Loaded configuration from {}", path.display());
                config
            }
            Ok(None) => {
                tracing::info!(
                    "[Config] No configuration at {}, using defaults",
                    path.display()
                );
                AppConfig::default()
            }
            Err(e) => {
                tracing::warn!(
                    "[Config] Failed to load {}: {}. Using defaults",
                    path.display(),
                    e
                );
                AppConfig::default()
            }
        }
    }
}
