use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript retrieval settings
    pub retrieval: RetrievalConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Languages asked of the primary source, in order
    pub preferred_languages: Vec<String>,

    /// Languages preferred when picking a fallback caption track, in order
    pub fallback_languages: Vec<String>,

    /// Pause before every primary lookup, in milliseconds
    pub throttle_ms: u64,

    /// Try the caption-track fallback when the primary source fails
    pub enable_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for exported documents (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Default output format
    pub default_output_format: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            preferred_languages: vec!["en".to_string(), "tr".to_string()],
            fallback_languages: vec!["tr".to_string(), "en".to_string()],
            throttle_ms: 1000,
            enable_fallback: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept_language: "en-US".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            default_output_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults when there is none
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate YAML configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tubescript").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.retrieval.preferred_languages.is_empty() {
            anyhow::bail!("retrieval.preferred_languages must list at least one language");
        }

        if self.retrieval.fallback_languages.is_empty() {
            anyhow::bail!("retrieval.fallback_languages must list at least one language");
        }

        self.default_format()?;

        Ok(())
    }

    /// Default output format as a CLI value
    pub fn default_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.app.default_output_format, true)
            .map_err(|e| anyhow::anyhow!("Invalid default output format: {}", e))
    }

    /// Pause before each primary lookup
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.retrieval.throttle_ms)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Preferred Languages: {}", self.retrieval.preferred_languages.join(", "));
        println!("  Fallback Languages: {}", self.retrieval.fallback_languages.join(", "));
        println!("  Throttle: {} ms", self.retrieval.throttle_ms);
        println!("  Fallback Enabled: {}", self.retrieval.enable_fallback);
        println!("  Accept-Language: {}", self.http.accept_language);
        if let Some(dir) = &self.app.output_dir {
            println!("  Output Directory: {}", dir.display());
        }
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
