use crate::error::ConfigError;
use color_eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

/// Gemini API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Model variants per task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_fast_model")]
    pub fast: String,
    #[serde(default = "default_reasoning_model")]
    pub reasoning: String,
    #[serde(default = "default_transcription_model")]
    pub transcription: String,
    /// Deliberation budget requested from the reasoning model
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
}

/// Voice capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_fast_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_reasoning_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_transcription_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_thinking_budget() -> u32 {
    32768
}

fn default_max_seconds() -> u32 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            reasoning: default_reasoning_model(),
            transcription: default_transcription_model(),
            thinking_budget: default_thinking_budget(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_seconds: default_max_seconds(),
        }
    }
}

impl Config {
    /// Loads configuration from disk or creates default if not found
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Create default config file
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Returns the path of the log file written while the terminal UI runs
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("caselens.log"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "caselens")
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))
    }

    /// Resolves the API credential from the environment, then the file
    pub fn api_key(&self) -> Result<String, ConfigError> {
        let from_env = |name: &str| std::env::var(name).ok();
        let config_path = Self::config_path().unwrap_or_else(|_| PathBuf::from("config.toml"));
        resolve_api_key(
            from_env("GEMINI_API_KEY"),
            from_env("API_KEY"),
            &self.gemini.api_key,
        )
        .ok_or(ConfigError::MissingCredential(config_path))
    }
}

fn resolve_api_key(
    gemini_env: Option<String>,
    generic_env: Option<String>,
    file_value: &str,
) -> Option<String> {
    [gemini_env, generic_env, Some(file_value.to_string())]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
