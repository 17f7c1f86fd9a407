//! Core generation pipeline.
//!
//! This module contains:
//! - Rules: The static two-tier rule table
//! - Safety: Command classification and warning rendering
//! - Orchestrator: Adapter invocation plus classification

pub mod orchestrator;
pub mod rules;
pub mod safety;

// Re-export commonly used types
pub use orchestrator::Orchestrator;
pub use rules::{Rule, RuleTable, Tier, RULES};
pub use safety::{Classification, SafetyClassifier};
