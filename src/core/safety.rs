//! Safety classification for generated shell commands.
//!
//! A command is scored against the two-tier rule table:
//! - Any dangerous-tier match yields `Dangerous` with every dangerous match
//! - Otherwise any warning-tier match yields `Warning` with every warning match
//! - Otherwise `Safe`
//!
//! Warning-tier rules are never evaluated once a dangerous rule matched, so a
//! mixed command reports dangerous descriptions only.

use crate::domain::Severity;

use super::rules::{Rule, RuleTable, RULES};

/// Verdict for a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub descriptions: Vec<&'static str>,
}

impl Classification {
    fn safe() -> Self {
        Self {
            severity: Severity::Safe,
            descriptions: Vec::new(),
        }
    }

    /// Human-readable warning for this verdict (empty when safe)
    pub fn message(&self) -> String {
        SafetyClassifier::render(self.severity, &self.descriptions)
    }
}

/// Pattern-based command classifier.
///
/// Holds only a shared reference to an immutable rule table, so it is `Copy`
/// and safe to use from any number of tasks.
#[derive(Debug, Clone, Copy)]
pub struct SafetyClassifier {
    rules: &'static RuleTable,
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyClassifier {
    /// Classifier over the built-in rule table
    pub fn new() -> Self {
        Self { rules: &RULES }
    }

    /// Score a command. Never fails; blank input is safe.
    pub fn classify(&self, command: &str) -> Classification {
        if command.trim().is_empty() {
            return Classification::safe();
        }

        let dangerous = matching(self.rules.dangerous(), command);
        if !dangerous.is_empty() {
            return Classification {
                severity: Severity::Dangerous,
                descriptions: dangerous,
            };
        }

        let warning = matching(self.rules.warning(), command);
        if !warning.is_empty() {
            return Classification {
                severity: Severity::Warning,
                descriptions: warning,
            };
        }

        Classification::safe()
    }

    /// Render the warning sentence for a verdict
    pub fn render<S: AsRef<str>>(severity: Severity, descriptions: &[S]) -> String {
        let joined = descriptions
            .iter()
            .map(|d| d.as_ref())
            .collect::<Vec<&str>>()
            .join(", ");

        match severity {
            Severity::Dangerous => format!(
                "⚠️  DANGEROUS: This command is potentially destructive! {}. Review carefully before executing.",
                joined
            ),
            Severity::Warning => format!("⚠️  Warning: {}. Please review before executing.", joined),
            Severity::Safe => String::new(),
        }
    }
}

fn matching(rules: &[Rule], command: &str) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| rule.matches(command))
        .map(|rule| rule.description)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_commands_are_safe() {
        let classifier = SafetyClassifier::new();
        assert_eq!(classifier.classify(""), Classification::safe());
        assert_eq!(classifier.classify("   "), Classification::safe());
    }

    #[test]
    fn test_dangerous_dominates_warning() {
        let classifier = SafetyClassifier::new();
        let verdict = classifier.classify("sudo chmod 777 /etc/passwd");

        assert_eq!(verdict.severity, Severity::Dangerous);
        assert_eq!(verdict.descriptions, vec!["Makes files world-writable"]);
    }

    #[test]
    fn test_render_safe_is_empty() {
        assert_eq!(SafetyClassifier::render::<&str>(Severity::Safe, &[]), "");
    }

    #[test]
    fn test_render_joins_descriptions() {
        let message = SafetyClassifier::render(Severity::Warning, &["Deletes files", "Moves files"]);
        assert!(message.contains("Deletes files, Moves files"));
        assert!(message.starts_with("⚠️  Warning:"));
    }
}
