use crate::llm::gemini::DEFAULT_GEMINI_MODEL;
use crate::llm::ollama::{DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:8000/redirect";
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to config.toml, computed at load time.
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Root of `~/.meal-agent`, computed at load time.
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// LLM backend: `ollama` (alias `deepseek`) or `gemini`.
    pub provider: String,
    /// Model override applied to whichever provider is selected.
    pub model: Option<String>,
    pub system_prompt_file: Option<PathBuf>,

    pub ollama: OllamaConfig,
    pub gemini: GeminiConfig,
    pub fitbit: FitbitConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitbitConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_url: String,
    /// Base URL of the Fitbit Web API.
    pub api_base: String,
    /// Base URL of the browser-facing authorization pages.
    pub auth_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Consecutive tool rounds allowed before control returns to the user.
    pub max_tool_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            data_dir: PathBuf::new(),
            provider: "ollama".to_string(),
            model: None,
            system_prompt_file: None,
            ollama: OllamaConfig::default(),
            gemini: GeminiConfig::default(),
            fitbit: FitbitConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

impl Default for FitbitConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            api_base: "https://api.fitbit.com".to_string(),
            auth_base: "https://www.fitbit.com".to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl Config {
    /// Directory holding `meals_YYYY-MM-DD.json` files.
    pub fn meals_dir(&self) -> PathBuf {
        self.data_dir.join("meals")
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("fitbit_credentials.json")
    }

    /// Model for the selected provider, honouring the global override.
    pub fn resolved_model(&self) -> String {
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            return model.to_string();
        }
        match self.provider.as_str() {
            "gemini" => self
                .gemini
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            _ => self.ollama.model.clone(),
        }
    }
}
