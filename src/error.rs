//! Error taxonomy for command generation.

use thiserror::Error;

/// Errors surfaced by adapters and the orchestrator.
///
/// A malformed structured answer from the model is not an error: it is
/// absorbed by the plain-text fallback. The safety classifier never errors.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Missing credential or model when building an adapter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Empty or missing prompt
    #[error("Invalid input: {0}")]
    Input(String),

    /// Network failure, timeout, or non-2xx backend response
    #[error(
        "API request failed{}: {message}",
        .status.map(|s| format!(" with status {}", s)).unwrap_or_default()
    )]
    Transport { status: Option<u16>, message: String },

    /// Backend payload missing required envelope fields
    #[error("Unexpected backend response: {0}")]
    Parse(String),
}

impl GenerationError {
    /// True when the caller must fix its input
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::Input(_))
    }

    /// True for failures of the backend call itself (transport or payload)
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport { .. } | GenerationError::Parse(_)
        )
    }
}
