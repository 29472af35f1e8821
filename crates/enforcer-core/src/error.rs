//! Error handling types

use thiserror::Error;

use crate::enforcer::EnforcementReport;

/// Result type alias for enforcement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal errors of an enforcement run
///
/// Every failing invocation ends with exactly one of these. Only
/// [`Error::RuleFailure`] and [`Error::Aggregate`] are produced by the
/// fail-fast / aggregate policy; all other variants abort unconditionally.
#[derive(Error, Debug)]
pub enum Error {
    /// A declared rule could not be resolved to an implementation
    #[error("Failed to create enforcer rules with name: {name} or for class: {implementation}")]
    RuleCreation {
        /// Canonical (lower-camel) rule name that was looked up
        name: String,
        /// Type reference that was tried after the component lookup missed
        implementation: String,
    },

    /// Rule parameters could not be bound
    #[error("Failed to configure rule {rule}: {message}")]
    RuleConfiguration {
        /// Canonical rule name
        rule: String,
        /// Description of the binding failure
        message: String,
    },

    /// A rule signalled that the build must break regardless of policy
    #[error("Rule {index}: {rule} failed with fatal error:\n{message}")]
    RuleFatal {
        /// Position of the rule in the declared order
        index: usize,
        /// Implementation name of the rule
        rule: String,
        /// Message reported by the rule
        message: String,
        /// Results up to and including the fatal rule
        report: Box<EnforcementReport>,
    },

    /// First ERROR-level failure under fail-fast
    #[error("{message}")]
    RuleFailure {
        /// Formatted failure message
        message: String,
    },

    /// All ERROR-level failures collected in one pass, in declaration order
    #[error("{}", .messages.join("\n"))]
    Aggregate {
        /// Formatted failure messages
        messages: Vec<String>,
    },

    /// The rule list was empty and empty lists are not allowed
    #[error("No rules are configured. Use the skip flag if you want to disable execution.")]
    NoRules,

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error without a source
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures produced by the fail-fast / aggregate policy
    ///
    /// Everything else means the build could not be evaluated at all.
    pub fn is_policy_failure(&self) -> bool {
        matches!(self, Self::RuleFailure { .. } | Self::Aggregate { .. })
    }

    /// Human-readable messages carried by this error, one entry per rule
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Aggregate { messages } => messages.clone(),
            Self::RuleFailure { message } => vec![message.clone()],
            other => vec![other.to_string()],
        }
    }
}

/// Failure signalled by a rule's `execute`
///
/// The orchestrator branches on the kind: a `Violation` goes through
/// severity and fail-fast policy, a `Fatal` error always aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Ordinary, expected check failure
    #[error("{0}")]
    Violation(String),

    /// The build must break regardless of configured policy
    #[error("{0}")]
    Fatal(String),
}

impl RuleError {
    /// Create an ordinary validation failure
    pub fn violation(message: impl Into<String>) -> Self {
        Self::Violation(message.into())
    }

    /// Create a failure that aborts the run unconditionally
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Message carried by the error
    pub fn message(&self) -> &str {
        match self {
            Self::Violation(message) | Self::Fatal(message) => message,
        }
    }
}

/// Failure while binding configuration onto a rule
#[derive(Error, Debug)]
pub enum BindError {
    /// A value could not be coerced into the target parameter type
    #[error("invalid parameter value: {0}")]
    Decode(#[from] serde_json::Error),

    /// The tree contains parameters the rule does not accept
    #[error("unknown parameter(s): {}", .0.join(", "))]
    UnknownParameters(Vec<String>),

    /// A `${...}` placeholder could not be resolved
    #[error("cannot resolve placeholder '${{{expression}}}': {reason}")]
    Unresolved {
        /// Placeholder content without the `${` `}` delimiters
        expression: String,
        /// Why evaluation failed
        reason: String,
    },

    /// The `level` child is not a known severity
    #[error("invalid level '{0}', expected ERROR or WARN")]
    InvalidLevel(String),
}
