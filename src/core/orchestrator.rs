//! Generation orchestrator.
//!
//! Drives one adapter's build / call / parse sequence and annotates the
//! resulting command with its safety verdict.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::adapters::{self, HttpTransport, Provider, ProviderConfig, Transport};
use crate::domain::{CommandContext, GenerationRequest, GenerationResult, Severity};
use crate::error::GenerationError;

use super::safety::SafetyClassifier;

/// Stateless front door for command generation.
///
/// Built once from a [`ProviderConfig`]; the adapter is selected at
/// construction and never changes. Share it behind an `Arc`.
pub struct Orchestrator {
    provider: Box<dyn Provider>,
    transport: Arc<dyn Transport>,
    classifier: SafetyClassifier,
}

impl Orchestrator {
    /// Create an orchestrator with an HTTP transport honoring the config timeout
    pub fn new(config: ProviderConfig) -> Result<Self, GenerationError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create an orchestrator over a caller-supplied transport
    pub fn with_transport(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GenerationError> {
        let provider = adapters::build_provider(config)?;
        Ok(Self {
            provider,
            transport,
            classifier: SafetyClassifier::new(),
        })
    }

    /// Provider id of the selected adapter
    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// Model identifier of the selected adapter
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Generate and classify a command for a natural-language prompt
    #[instrument(skip(self, prompt, context), fields(provider = %self.provider.id()))]
    pub async fn generate(
        &self,
        prompt: &str,
        context: Option<CommandContext>,
    ) -> Result<GenerationResult, GenerationError> {
        let request = GenerationRequest::new(prompt, context)?;
        self.generate_request(&request).await
    }

    /// Generate and classify a command for an already-validated request
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let output =
            adapters::invoke(self.provider.as_ref(), self.transport.as_ref(), request).await?;

        let verdict = self.classifier.classify(&output.command);
        match verdict.severity {
            Severity::Safe => info!("Generated safe command"),
            Severity::Warning => info!(matches = ?verdict.descriptions, "Generated command needs review"),
            Severity::Dangerous => warn!(matches = ?verdict.descriptions, "Generated dangerous command"),
        }

        let result = match verdict.severity {
            Severity::Safe => GenerationResult::safe(output),
            severity => GenerationResult::flagged(output, severity, verdict.message()),
        };
        Ok(result)
    }
}
