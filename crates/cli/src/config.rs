//! Configuration loading from tiller.toml.

use orchestrator::McpServerConfig;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// The MCP server to spawn and bind to.
    pub server: McpServerConfig,

    /// Optional system prompt for the session.
    pub system: Option<String>,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,

    /// Anthropic API key. Falls back to the ANTHROPIC_API_KEY environment
    /// variable when unset.
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The API key to use, from config or environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.backend.api_key {
            return Ok(key.clone());
        }
        std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingApiKey)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,
}
