//! Configuration loading and management for gist.
//!
//! Loads settings from `gist.toml` with environment variable overrides for sensitive data.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
    #[error("unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("failed to initialise LLM client: {0}")]
    ClientInit(String),
}

/// Reasoning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider: "openai" or "gemini"
    pub provider: String,
    /// Model used for every writing stage (e.g., "gpt-4o")
    pub model: String,
    /// Model used for framework classification
    pub classifier_model: String,
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
    #[serde(default)]
    pub openai_key: Option<String>,
}

/// Content extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// User-Agent sent when fetching pages, videos and PDFs
    pub user_agent: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

/// HTTP boundary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:3000"
    pub addr: String,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the default location (gist.toml in cwd or home).
    ///
    /// Falls back to built-in defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::parse_file(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.api.openai_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from("gist.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("gist")
            .join("gist.toml");
        home_config.exists().then_some(home_config)
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        let key = match self.agent.provider.as_str() {
            "gemini" => self.api.gemini_key.as_deref(),
            "openai" => self.api.openai_key.as_deref(),
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };
        key.filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.agent.provider.clone()))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            classifier_model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(
                "Mozilla/5.0 (compatible; gist/",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nprovider = \"gemini\"\nmodel = \"gemini-2.5-pro\"\n\n[server]\naddr = \"0.0.0.0:8080\""
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.agent.provider, "gemini");
        assert_eq!(config.agent.model, "gemini-2.5-pro");
        assert_eq!(config.agent.classifier_model, "gpt-4o-mini");
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.extractor.timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nprovider = ").unwrap();

        let err = Config::parse_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn api_key_follows_provider() {
        let mut config = Config::default();
        config.api.openai_key = Some("sk-test".to_string());
        assert_eq!(config.api_key().unwrap(), "sk-test");

        config.agent.provider = "gemini".to_string();
        assert!(matches!(
            config.api_key(),
            Err(ConfigError::MissingApiKey(p)) if p == "gemini"
        ));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut config = Config::default();
        config.api.openai_key = Some("  ".to_string());
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.agent.provider = "anthropic".to_string();
        assert!(matches!(
            config.api_key(),
            Err(ConfigError::UnknownProvider(p)) if p == "anthropic"
        ));
    }
}
