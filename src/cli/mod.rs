//! Command-line interface for the shell assistant.
//!
//! Provides commands for running the daemon, probing a running daemon,
//! classifying commands locally, and installing the daemon as a service.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{load_config, ResolvedConfig};
use crate::core::{Orchestrator, SafetyClassifier};
use crate::domain::{GenerationResult, Severity};
use crate::server::{self, AppState, HealthResponse};

pub mod service;

/// Default daemon URL probed by `status` and `test`
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:5738";

/// shell-assistant - LLM-powered shell command generation daemon
#[derive(Parser, Debug)]
#[command(name = "shell-assistant")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon
    #[command(alias = "serve")]
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to config file
        #[arg(short, long, env = "SHELLAGENT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Check whether a daemon is running
    Status {
        /// Daemon base URL
        #[arg(long, default_value = DEFAULT_DAEMON_URL)]
        url: String,
    },

    /// Send a prompt to a running daemon
    Test {
        /// Natural-language request
        prompt: String,

        /// Daemon base URL
        #[arg(long, default_value = DEFAULT_DAEMON_URL)]
        url: String,
    },

    /// Classify a shell command locally without calling any backend
    Classify {
        /// The command to check (quote it)
        command: String,
    },

    /// Show resolved configuration (API key masked)
    Config {
        /// Path to config file
        #[arg(short, long, env = "SHELLAGENT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Install the daemon as a system service
    InstallService,

    /// Uninstall the daemon system service
    UninstallService,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Start { host, port, config } => start(host, port, config).await,
            Commands::Status { url } => status(&url).await,
            Commands::Test { prompt, url } => test_prompt(&url, &prompt).await,
            Commands::Classify { command } => {
                classify(&command);
                Ok(())
            }
            Commands::Config { config } => show_config(config),
            Commands::InstallService => service::install(),
            Commands::UninstallService => service::uninstall(),
        }
    }
}

/// Load config, build the orchestrator, and run the daemon
async fn start(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let orchestrator = build_orchestrator(&config)?;

    println!("🚀 Starting Shell Assistant Daemon...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Provider: {}", config.provider);
    println!("   Model: {}", config.model);
    println!("\n✨ Daemon is ready! Press Ctrl+C to stop.\n");

    let state = AppState::new(orchestrator, config.preferences);
    server::run(&config.host, config.port, state).await
}

fn build_orchestrator(config: &ResolvedConfig) -> Result<Orchestrator> {
    Orchestrator::new(config.provider_config()).with_context(|| {
        format!(
            "Failed to configure provider '{}'. Set SHELLAGENT_API_KEY or OPENROUTER_API_KEY, \
             or create a config file at ~/.config/shell-assistant/config.yaml",
            config.provider
        )
    })
}

/// Probe `GET /health` on a running daemon
async fn status(url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .context("Failed to build HTTP client")?;

    let response = match client.get(format!("{}/health", url.trim_end_matches('/'))).send().await {
        Ok(response) => response,
        Err(e) if e.is_connect() || e.is_timeout() => {
            println!("❌ Daemon is not running");
            println!("   Start with: shell-assistant start");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to check daemon status"),
    };

    let health: HealthResponse = response
        .error_for_status()
        .context("Daemon returned an error")?
        .json()
        .await
        .context("Failed to parse health response")?;

    println!("✅ Daemon is running");
    println!("   Status: {}", health.status);
    println!("   Provider: {}", health.provider);
    println!("   Model: {}", health.model);
    Ok(())
}

/// Send one prompt to `POST /complete` and print the result
async fn test_prompt(url: &str, prompt: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let response = match client
        .post(format!("{}/complete", url.trim_end_matches('/')))
        .json(&serde_json::json!({ "prompt": prompt }))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) if e.is_connect() => {
            println!("❌ Daemon is not running");
            println!("   Start with: shell-assistant start");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to reach daemon"),
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Daemon returned {}: {}", status, body.trim());
    }

    let result: GenerationResult = response
        .json()
        .await
        .context("Failed to parse daemon response")?;
    print_result(&result);
    Ok(())
}

fn print_result(result: &GenerationResult) {
    println!("\n📝 Generated Command:");
    println!("   {}", result.command());
    if let Some(explanation) = result.explanation() {
        println!("\n💡 Explanation:");
        println!("   {}", explanation);
    }
    if let Some(warning) = result.warning_message() {
        println!("\n⚠️  Warning:");
        println!("   {}", warning);
    }
    println!();
}

/// Classify a command with the built-in rules
fn classify(command: &str) {
    let verdict = SafetyClassifier::new().classify(command);

    let marker = match verdict.severity {
        Severity::Safe => "✅",
        Severity::Warning => "⚠️ ",
        Severity::Dangerous => "🛑",
    };
    println!("{} {}", marker, verdict.severity);
    if verdict.severity != Severity::Safe {
        println!("   {}", verdict.message());
    }
}

/// Print the resolved configuration
fn show_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    println!("{}", config.summary());

    if let Err(e) = config.provider_config().validate() {
        println!("\n⚠️  {}", e);
    }
    Ok(())
}
