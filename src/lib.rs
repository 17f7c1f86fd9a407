//! shell-assistant - LLM-powered shell command generation
//!
//! Turns a natural-language request into a shell command using one of
//! several interchangeable LLM backends, then classifies the command's risk
//! before handing it back.
//!
//! # Architecture
//!
//! The pipeline has two stages:
//! - A provider adapter normalizes each backend's request/response shape
//! - A safety classifier scores the command against a static two-tier rule table
//!
//! # Modules
//!
//! - `adapters`: Backend integrations (OpenAI/OpenRouter, Anthropic, Ollama)
//! - `core`: Orchestration logic (Orchestrator, Safety, Rules)
//! - `domain`: Data structures (GenerationRequest, GenerationResult, Severity)
//! - `server`: HTTP daemon
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Start the daemon
//! OPENROUTER_API_KEY=... shell-assistant start
//!
//! # Ask it for a command
//! shell-assistant test "list files in the current directory"
//!
//! # Check a command locally
//! shell-assistant classify "rm -rf /tmp/*"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod server;

// Re-export main types at crate root for convenience
pub use adapters::{Provider, ProviderConfig, ProviderKind, Transport};
pub use crate::core::{Orchestrator, SafetyClassifier};
pub use domain::{CommandContext, GenerationRequest, GenerationResult, Severity};
pub use error::GenerationError;
