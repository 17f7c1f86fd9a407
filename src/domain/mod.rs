//! Domain types for the shell assistant.
//!
//! This module contains the core data structures:
//! - Request: A natural-language prompt plus optional shell context
//! - Result: The generated command annotated with its safety verdict

pub mod request;
pub mod result;

// Re-export commonly used types
pub use request::{CommandContext, GenerationRequest};
pub use result::{CommandOutput, GenerationResult, Severity};
