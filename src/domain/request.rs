//! Generation requests.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Situational metadata used to bias command generation.
///
/// Every field is optional; only the ones that are present are rendered into
/// the backend prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Current working directory of the caller's shell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Shell name (zsh, bash, fish, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Operating system name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Local user name (accepted, never sent to the backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CommandContext {
    /// True when no context key is present
    pub fn is_empty(&self) -> bool {
        self.cwd.is_none() && self.shell.is_none() && self.os.is_none() && self.user.is_none()
    }

    /// Prompt lines for the present keys, in the fixed order cwd, shell, os
    pub fn prompt_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(cwd) = &self.cwd {
            lines.push(format!("Current directory: {}", cwd));
        }
        if let Some(shell) = &self.shell {
            lines.push(format!("Shell: {}", shell));
        }
        if let Some(os) = &self.os {
            lines.push(format!("OS: {}", os));
        }
        lines
    }
}

/// A validated request to generate one shell command.
///
/// Immutable once constructed: the prompt is guaranteed non-blank.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    context: Option<CommandContext>,
}

impl GenerationRequest {
    /// Build a request, rejecting an empty or whitespace-only prompt
    pub fn new(
        prompt: impl Into<String>,
        context: Option<CommandContext>,
    ) -> Result<Self, GenerationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(GenerationError::Input("Prompt cannot be empty".to_string()));
        }

        // An all-empty context carries nothing; normalize it away
        let context = context.filter(|c| !c.is_empty());

        Ok(Self { prompt, context })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn context(&self) -> Option<&CommandContext> {
        self.context.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(matches!(
            GenerationRequest::new("", None),
            Err(GenerationError::Input(_))
        ));
        assert!(matches!(
            GenerationRequest::new("  \n\t", None),
            Err(GenerationError::Input(_))
        ));
    }

    #[test]
    fn test_context_lines_fixed_order() {
        let context = CommandContext {
            os: Some("Linux".to_string()),
            cwd: Some("/home/dev".to_string()),
            shell: Some("zsh".to_string()),
            user: Some("dev".to_string()),
        };

        assert_eq!(
            context.prompt_lines(),
            vec!["Current directory: /home/dev", "Shell: zsh", "OS: Linux"]
        );
    }

    #[test]
    fn test_empty_context_dropped() {
        let request = GenerationRequest::new("list files", Some(CommandContext::default())).unwrap();
        assert!(request.context().is_none());
    }
}
