//! Configuration types
//!
//! Describes an enforcement run: global toggles, build properties, the
//! ordered rule declarations and logging settings. Loaded through
//! [`ConfigLoader`] from defaults, a TOML file and `ENFORCER_*` variables.
//!
//! ```toml
//! fail_fast = false
//!
//! [properties]
//! "project.version" = "1.2.0"
//!
//! [[rules]]
//! name = "requireFilesExist"
//! level = "WARN"
//! files = ["Cargo.toml", "LICENSE"]
//! ```

mod loader;

pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::rule::ConfigTree;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "enforcer.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = ".enforcer";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "ENFORCER";

/// Complete configuration of an enforcement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Do nothing and report success
    pub skip: bool,
    /// ERROR-level failures fail the build
    pub fail_build: bool,
    /// Stop at the first ERROR-level failure
    pub fail_fast: bool,
    /// Execute every rule even if an equivalent one already ran this session
    pub ignore_cache: bool,
    /// Treat an empty rule list as an error
    pub fail_if_no_rules: bool,
    /// Rule names to leave out of the run
    pub skip_rules: Vec<String>,
    /// Build properties visible to rules and placeholders
    pub properties: BTreeMap<String, String>,
    /// Ordered rule declarations
    pub rules: Vec<RuleDeclaration>,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            skip: false,
            fail_build: true,
            fail_fast: false,
            ignore_cache: false,
            fail_if_no_rules: true,
            skip_rules: Vec::new(),
            properties: BTreeMap::new(),
            rules: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One `[[rules]]` entry
///
/// Everything except `name` and `implementation`, including `level`, is
/// kept as the rule's parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDeclaration {
    /// Rule name, resolved by the registry
    pub name: String,
    /// Explicit implementation type reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    /// Rule parameters
    #[serde(flatten)]
    pub config: ConfigTree,
}

impl RuleDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation: None,
            config: ConfigTree::new(),
        }
    }

    /// Set the explicit implementation
    pub fn with_implementation(mut self, implementation: impl Into<String>) -> Self {
        self.implementation = Some(implementation.into());
        self
    }

    /// Set a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Set the `level` child
    pub fn with_level(self, level: crate::severity::Severity) -> Self {
        self.with_param(crate::binder::LEVEL_KEY, level.to_string())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of text
    pub json_format: bool,
    /// Also write to a daily-rolling file at this path
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
