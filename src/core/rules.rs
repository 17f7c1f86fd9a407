//! Built-in rule table for command risk classification.
//!
//! Two tiers of `(pattern, description)` pairs. Patterns are matched
//! case-insensitively anywhere in the command. Order within a tier only
//! affects the order of reported descriptions.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Rule tier; dangerous always dominates warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Dangerous,
    Warning,
}

/// A compiled classification rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Regex,
    pub description: &'static str,
    pub tier: Tier,
}

impl Rule {
    pub fn matches(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }
}

/// Patterns for destructive commands
const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    // Destructive file operations
    (r"\brm\s+(-[rf]+\s+)?/", "Removes files/directories"),
    (r"\brm\s+-rf", "Recursively removes files without confirmation"),
    (r"\bdd\b", "Direct disk access - can destroy data"),
    (r"\bmkfs\b", "Formats filesystem - destroys all data"),
    (r">\s*/dev/sd[a-z]", "Writes directly to disk - can destroy data"),
    (r"\bshred\b", "Securely deletes files"),
    (r"\bwipe\b", "Securely deletes files"),
    // System modifications
    (r"\bchmod\s+777", "Makes files world-writable"),
    (r"\bchown\s+.*root", "Changes ownership to root"),
    (r"\bsudo\s+rm", "Removes files with elevated privileges"),
    (r"\bsudo\s+dd", "Direct disk access with elevated privileges"),
    // Remote scripts piped into a shell
    (r"\bcurl\s+.*\|\s*bash", "Executes remote script without review"),
    (r"\bwget\s+.*\|\s*bash", "Executes remote script without review"),
    (r"\bcurl\s+.*\|\s*sh\b", "Executes remote script without review"),
    (r"\bwget\s+.*\|\s*sh\b", "Executes remote script without review"),
    // Fork bombs and process killing
    (r":\(\)\s*\{.*:\|:", "Fork bomb - crashes system"),
    (r"\bkill\s+-9\s+1\b", "Kills init process - crashes system"),
    (r"\bkillall\b", "Kills all processes of a type"),
    // Root switching
    (r"\bsu\s+-", "Switches to root user"),
    (r"\bsudo\s+su\b", "Switches to root user with sudo"),
    // Database operations
    (r"\bDROP\s+DATABASE\b", "Deletes entire database"),
    (r"\bDROP\s+TABLE\b", "Deletes database table"),
    (r"\bTRUNCATE\b", "Deletes all data from table"),
    (r"\bDELETE\s+FROM.*WHERE\s+1\s*=\s*1", "Deletes all rows from table"),
];

/// Patterns for moderately risky commands
const WARNING_PATTERNS: &[(&str, &str)] = &[
    (r"\brm\s+", "Deletes files"),
    (r"\bmv\s+.*\s+/", "Moves files"),
    (r"\bchmod\b", "Changes file permissions"),
    (r"\bchown\b", "Changes file ownership"),
    (r"\bsudo\b", "Executes with elevated privileges"),
    (r"\bapt-get\s+remove", "Removes packages"),
    (r"\byum\s+remove", "Removes packages"),
    (r"\bpip\s+uninstall", "Uninstalls Python packages"),
    (r"\bnpm\s+uninstall", "Uninstalls Node packages"),
    (r"\bgit\s+push\s+.*--force", "Force pushes to git repository"),
    (r"\bgit\s+reset\s+--hard", "Discards all uncommitted changes"),
    (r"\bdocker\s+rm\b", "Removes Docker containers"),
    (r"\bdocker\s+rmi\b", "Removes Docker images"),
];

/// The process-wide rule table, compiled once on first use
pub static RULES: LazyLock<RuleTable> = LazyLock::new(RuleTable::builtin);

/// Ordered rules, split by tier. Read-only after construction.
#[derive(Debug, Clone)]
pub struct RuleTable {
    dangerous: Vec<Rule>,
    warning: Vec<Rule>,
}

impl RuleTable {
    /// Compile the built-in catalog
    fn builtin() -> Self {
        Self {
            dangerous: compile_tier(DANGEROUS_PATTERNS, Tier::Dangerous),
            warning: compile_tier(WARNING_PATTERNS, Tier::Warning),
        }
    }

    pub fn dangerous(&self) -> &[Rule] {
        &self.dangerous
    }

    pub fn warning(&self) -> &[Rule] {
        &self.warning
    }

    /// All rules, dangerous tier first
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.dangerous.iter().chain(self.warning.iter())
    }
}

fn compile_tier(patterns: &[(&str, &'static str)], tier: Tier) -> Vec<Rule> {
    patterns
        .iter()
        .map(|&(pattern, description)| Rule {
            pattern: compile(pattern),
            description,
            tier,
        })
        .collect()
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Catalog patterns are constants; a failure here is a programming error
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in rule pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_patterns_compile() {
        for (pattern, _) in DANGEROUS_PATTERNS.iter().chain(WARNING_PATTERNS) {
            assert!(
                RegexBuilder::new(pattern).case_insensitive(true).build().is_ok(),
                "pattern failed to compile: {}",
                pattern
            );
        }
    }

    #[test]
    fn test_table_tiers() {
        assert_eq!(RULES.dangerous().len(), DANGEROUS_PATTERNS.len());
        assert_eq!(RULES.warning().len(), WARNING_PATTERNS.len());
        assert!(RULES.dangerous().iter().all(|r| r.tier == Tier::Dangerous));
        assert!(RULES.warning().iter().all(|r| r.tier == Tier::Warning));
        assert_eq!(RULES.iter().count(), DANGEROUS_PATTERNS.len() + WARNING_PATTERNS.len());
    }

    #[test]
    fn test_word_boundaries() {
        let rm = &RULES.warning()[0];
        assert!(rm.matches("rm notes.txt"));
        assert!(!rm.matches("format notes.txt"));
        assert!(!rm.matches("perform cleanup"));

        let dd = &RULES.dangerous()[2];
        assert!(dd.matches("dd if=/dev/zero of=disk.img"));
        assert!(!dd.matches("git add file"));
    }

    #[test]
    fn test_case_insensitive() {
        let drop_table = RULES
            .dangerous()
            .iter()
            .find(|r| r.description == "Deletes database table")
            .unwrap();
        assert!(drop_table.matches("psql -c 'drop table users'"));
        assert!(drop_table.matches("DROP TABLE users;"));
    }
}
