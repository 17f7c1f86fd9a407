//! Configuration for the shell assistant daemon.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (host/port, applied by the CLI)
//! 2. Environment variables (SHELLAGENT_PROVIDER, OPENROUTER_API_KEY,
//!    SHELLAGENT_API_KEY, SHELLAGENT_MODEL, SHELLAGENT_API_BASE)
//! 3. Config file (~/.config/shell-assistant/config.yaml)
//! 4. Defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{redact, ProviderConfig, ProviderKind, DEFAULT_MAX_TOKENS};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5738;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, alias = "openrouter")]
    pub llm: LlmSection,
    #[serde(default)]
    pub daemon: DaemonSection,
    #[serde(default)]
    pub preferences: PreferencesSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSection {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesSection {
    pub auto_execute: Option<bool>,
    pub context_aware: Option<bool>,
    pub explain_commands: Option<bool>,
    pub max_tokens: Option<u32>,
}

/// Behavior switches exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// Client hint only; the daemon never executes commands
    pub auto_execute: bool,
    /// Forward cwd/shell/os context to the backend
    pub context_aware: bool,
    /// Include explanations in responses
    pub explain_commands: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_execute: false,
            context_aware: true,
            explain_commands: true,
        }
    }
}

/// Resolved configuration with every default applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub host: String,
    pub port: u16,
    pub preferences: Preferences,
    /// Path to config file (if one was loaded)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Merge a config file with environment lookups and defaults
    pub fn resolve<F>(file: ConfigFile, config_file: Option<PathBuf>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let provider_id = env("SHELLAGENT_PROVIDER")
            .or(file.llm.provider)
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let provider: ProviderKind = provider_id
            .parse()
            .with_context(|| format!("Invalid provider in configuration: {}", provider_id))?;

        let api_key = env("OPENROUTER_API_KEY")
            .or_else(|| env("SHELLAGENT_API_KEY"))
            .or(file.llm.api_key)
            .unwrap_or_default();

        let model = env("SHELLAGENT_MODEL")
            .or(file.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = env("SHELLAGENT_API_BASE").or(file.llm.base_url);

        let timeout = Duration::from_secs(
            file.llm
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        );

        let defaults = Preferences::default();
        let preferences = Preferences {
            auto_execute: file.preferences.auto_execute.unwrap_or(defaults.auto_execute),
            context_aware: file.preferences.context_aware.unwrap_or(defaults.context_aware),
            explain_commands: file
                .preferences
                .explain_commands
                .unwrap_or(defaults.explain_commands),
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            max_tokens: file.preferences.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout,
            host: file.daemon.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: file.daemon.port.unwrap_or(DEFAULT_PORT),
            preferences,
            config_file,
        })
    }

    /// The immutable adapter settings for this configuration
    pub fn provider_config(&self) -> ProviderConfig {
        let config = ProviderConfig::new(self.provider, self.api_key.clone(), self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_timeout(self.timeout);

        match &self.base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }

    /// Human-readable summary with the API key masked
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Config file: {}",
                self.config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none, using defaults)".to_string())
            ),
            format!("Provider:    {}", self.provider),
            format!("Model:       {}", self.model),
            format!("Base URL:    {}", self.provider_config().resolved_base_url()),
            format!("API key:     {}", redact(&self.api_key)),
            format!("Max tokens:  {}", self.max_tokens),
            format!("Timeout:     {}s", self.timeout.as_secs()),
            format!("Daemon:      {}:{}", self.host, self.port),
        ];
        lines.push(format!(
            "Preferences: auto_execute={} context_aware={} explain_commands={}",
            self.preferences.auto_execute,
            self.preferences.context_aware,
            self.preferences.explain_commands
        ));
        lines.join("\n")
    }
}

/// Default config file location (~/.config/shell-assistant/config.yaml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("shell-assistant")
            .join("config.yaml")
    })
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file is a valid, empty config
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources.
///
/// An explicit `path` must exist; the default path is optional.
pub fn load_config(path: Option<&Path>) -> Result<ResolvedConfig> {
    let (file, config_file) = match path {
        Some(path) => (load_config_file(path)?, Some(path.to_path_buf())),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => (load_config_file(&path)?, Some(path)),
            None => {
                tracing::debug!("No config file found, using defaults");
                (ConfigFile::default(), None)
            }
        },
    };

    ResolvedConfig::resolve(file, config_file, |key| std::env::var(key).ok())
}
