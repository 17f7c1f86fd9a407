//! Generation results and severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-level risk classification of a generated command
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No rule matched
    Safe,

    /// Matched a warning-tier rule only
    Warning,

    /// Matched at least one dangerous-tier rule
    Dangerous,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Warning => "warning",
            Severity::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an adapter extracts from a backend response, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: String,
    pub explanation: Option<String>,
}

/// The final, classified result returned to the caller.
///
/// Fields are private so the invariant holds: `warning` is present if and
/// only if `severity` is not [`Severity::Safe`]. Deserialization enforces it
/// too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireResult")]
pub struct GenerationResult {
    command: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,

    severity: Severity,

    #[serde(rename = "warning", skip_serializing_if = "Option::is_none")]
    warning_message: Option<String>,
}

/// Unchecked wire shape of [`GenerationResult`]
#[derive(Debug, Deserialize)]
struct WireResult {
    command: String,
    #[serde(default)]
    explanation: Option<String>,
    severity: Severity,
    #[serde(default)]
    warning: Option<String>,
}

impl TryFrom<WireResult> for GenerationResult {
    type Error = String;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        let output = CommandOutput {
            command: wire.command,
            explanation: wire.explanation,
        };
        match (wire.severity, wire.warning) {
            (Severity::Safe, None) => Ok(Self::safe(output)),
            (Severity::Safe, Some(_)) => Err("safe result must not carry a warning".to_string()),
            (severity, Some(warning)) => Ok(Self::flagged(output, severity, warning)),
            (severity, None) => Err(format!("{} result is missing its warning", severity)),
        }
    }
}

impl GenerationResult {
    /// A result with no warning attached
    pub fn safe(output: CommandOutput) -> Self {
        Self {
            command: output.command,
            explanation: output.explanation,
            severity: Severity::Safe,
            warning_message: None,
        }
    }

    /// A result carrying a non-safe verdict and its rendered warning
    ///
    /// Passing [`Severity::Safe`] here yields a safe result and discards the
    /// message.
    pub fn flagged(output: CommandOutput, severity: Severity, warning: String) -> Self {
        if severity == Severity::Safe {
            return Self::safe(output);
        }
        Self {
            command: output.command,
            explanation: output.explanation,
            severity,
            warning_message: Some(warning),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn warning_message(&self) -> Option<&str> {
        self.warning_message.as_deref()
    }

    /// Drop the explanation (used when the caller opted out of explanations)
    pub fn without_explanation(mut self) -> Self {
        self.explanation = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_with(command: &str, explanation: &str) -> CommandOutput {
        CommandOutput {
            command: command.to_string(),
            explanation: Some(explanation.to_string()),
        }
    }

    fn output(command: &str) -> CommandOutput {
        CommandOutput {
            command: command.to_string(),
            explanation: Some("Generated command".to_string()),
        }
    }

    #[test]
    fn test_safe_result_serializes_without_warning() {
        let result = GenerationResult::safe(output("ls -la"));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "command": "ls -la",
                "explanation": "Generated command",
                "severity": "safe",
            })
        );
    }

    #[test]
    fn test_flagged_result_serializes_warning_field() {
        let result = GenerationResult::flagged(
            output("sudo ls"),
            Severity::Warning,
            "Warning: Executes with elevated privileges".to_string(),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["severity"], "warning");
        assert_eq!(json["warning"], "Warning: Executes with elevated privileges");
    }

    #[test]
    fn test_flagged_with_safe_severity_has_no_warning() {
        let result = GenerationResult::flagged(output("ls"), Severity::Safe, "ignored".to_string());
        assert_eq!(result.severity(), Severity::Safe);
        assert!(result.warning_message().is_none());
    }

    #[test]
    fn test_deserialize_round_trips_valid_results() {
        let json = r#"{"command":"sudo ls","severity":"warning","warning":"review"}"#;
        let result: GenerationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.severity(), Severity::Warning);
        assert_eq!(result.warning_message(), Some("review"));
        assert!(result.explanation().is_none());

        let json = r#"{"command":"ls","explanation":"lists","severity":"safe"}"#;
        let result: GenerationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result, GenerationResult::safe(output_with("ls", "lists")));
    }

    #[test]
    fn test_deserialize_rejects_safe_with_warning() {
        let json = r#"{"command":"ls","severity":"safe","warning":"boo"}"#;
        assert!(serde_json::from_str::<GenerationResult>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_flagged_without_warning() {
        let json = r#"{"command":"rm -rf /","severity":"dangerous"}"#;
        assert!(serde_json::from_str::<GenerationResult>(json).is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Dangerous > Severity::Warning);
        assert!(Severity::Warning > Severity::Safe);
    }
}
