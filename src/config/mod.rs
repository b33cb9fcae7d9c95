use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::language::LanguageSelection;
use crate::SummarizeError;

/// Environment variable that points at an explicit config file
pub const CONFIG_PATH_ENV: &str = "SUMMARIZE_AI_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative-text service settings
    pub summarizer: SummarizerSettings,

    /// Transcript provider settings
    pub transcript: TranscriptSettings,

    /// Output settings
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Base URL of the Gemini REST API
    pub endpoint: String,

    /// Model used for summaries
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Upper bound for a single summarization call
    pub timeout_secs: u64,

    /// Replaces the built-in summary instruction when set
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Language used when none is given on the command line
    pub default_language: LanguageSelection,

    /// Upper bound for acquiring a transcript
    pub timeout_secs: u64,

    /// Accept-Language header sent to YouTube
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub default_format: OutputFormat,

    /// Print the thumbnail link next to the summary
    pub show_thumbnail: bool,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: 120,
            prompt: None,
        }
    }
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            default_language: LanguageSelection::English,
            timeout_secs: 30,
            accept_language: "en-US".to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            show_thumbnail: true,
        }
    }
}

/// API credential for the summarization service
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = Self::config_path(explicit)?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

            config.validate()?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path).await?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        // Current directory first for easy testing
        let local_config = PathBuf::from("summarize-ai.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("summarize-ai").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.summarizer.endpoint.trim().is_empty() {
            anyhow::bail!("summarizer.endpoint must be configured");
        }
        url::Url::parse(&self.summarizer.endpoint)
            .with_context(|| format!("summarizer.endpoint is not a URL: {}", self.summarizer.endpoint))?;

        if self.summarizer.model.trim().is_empty() {
            anyhow::bail!("summarizer.model must be configured");
        }
        if self.summarizer.api_key_env.trim().is_empty() {
            anyhow::bail!("summarizer.api_key_env must name an environment variable");
        }
        if self.summarizer.timeout_secs == 0 {
            anyhow::bail!("summarizer.timeout_secs must be greater than zero");
        }
        if self.transcript.timeout_secs == 0 {
            anyhow::bail!("transcript.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Read the API credential once from the configured environment variable
    pub fn api_key(&self) -> std::result::Result<ApiKey, SummarizeError> {
        let var = &self.summarizer.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(ApiKey::new(key.trim())),
            Ok(_) => Err(SummarizeError::Config(format!(
                "environment variable {} is empty",
                var
            ))),
            Err(_) => Err(SummarizeError::Config(format!(
                "environment variable {} is not set",
                var
            ))),
        }
    }

    /// Instruction placed in front of every transcript
    pub fn prompt(&self) -> &str {
        self.summarizer
            .prompt
            .as_deref()
            .unwrap_or(crate::summarize::SUMMARY_PROMPT)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Summarizer Endpoint: {}", self.summarizer.endpoint);
        println!("  Model: {}", self.summarizer.model);
        let key_state = if self.api_key().is_ok() { "set" } else { "missing" };
        println!("  API Key: ${} ({})", self.summarizer.api_key_env, key_state);
        println!("  Summarizer Timeout: {}s", self.summarizer.timeout_secs);
        println!(
            "  Prompt: {}",
            if self.summarizer.prompt.is_some() { "custom" } else { "built-in" }
        );
        println!(
            "  Default Language: {} ({})",
            self.transcript.default_language,
            self.transcript.default_language.code()
        );
        println!("  Transcript Timeout: {}s", self.transcript.timeout_secs);
        println!("  Default Format: {}", self.output.default_format);
        println!("  Show Thumbnail: {}", self.output.show_thumbnail);
    }
}
