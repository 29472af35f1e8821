//! Severity-routed rule logger

use std::fmt::Display;

use crate::severity::Severity;

/// Logger handed to a rule before its parameters are bound
///
/// Carries the rule name and configured level so that a rule can report
/// diagnostics at "its" severity through [`RuleLog::at_level`] without
/// knowing how it was configured.
#[derive(Debug, Clone)]
pub struct RuleLog {
    rule: String,
    level: Severity,
}

impl RuleLog {
    pub fn new(rule: impl Into<String>, level: Severity) -> Self {
        Self {
            rule: rule.into(),
            level,
        }
    }

    /// Name of the rule this logger belongs to
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Configured level of the rule
    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(target: "enforcer::rule", rule = %self.rule, "{message}");
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(target: "enforcer::rule", rule = %self.rule, "{message}");
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(target: "enforcer::rule", rule = %self.rule, "{message}");
    }

    /// Log at warn for WARN rules and at error for ERROR rules
    pub fn at_level(&self, message: impl Display) {
        match self.level {
            Severity::Warn => self.warn(message),
            Severity::Error => self.error(message),
        }
    }
}
