//! Rule contract
//!
//! Every check the enforcer can run implements [`Rule`]. Only
//! [`Rule::execute`] is mandatory; configuration, logging and caching hooks
//! have defaults so simple rules stay small.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{BindError, RuleError};
use crate::log::RuleLog;

/// Declarative parameter tree handed to the binder (field name → value)
pub type ConfigTree = serde_json::Map<String, serde_json::Value>;

/// Session-scoped build state visible to rules
///
/// Holds the directory of the module being checked and the build's
/// key/value properties.
#[derive(Debug, Clone)]
pub struct RuleContext {
    base_dir: PathBuf,
    properties: BTreeMap<String, String>,
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new(".")
    }
}

impl RuleContext {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a single property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add every property from an iterator, overriding existing keys
    pub fn with_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Directory of the module under enforcement
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Resolve a path relative to the module directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Identity of an earlier execution found in the result cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRun<'a> {
    /// Registry type reference of the rule that ran
    pub implementation: &'a str,
    /// Cache id it reported
    pub cache_id: &'a str,
}

/// A pluggable build check
pub trait Rule: Send {
    /// Run the check against the current build state
    fn execute(&mut self, ctx: &RuleContext) -> Result<(), RuleError>;

    /// Apply bound parameters
    ///
    /// The default accepts only an empty tree. Rules with parameters
    /// usually decode them with [`crate::binder::decode_params`].
    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        if params.is_empty() {
            Ok(())
        } else {
            Err(BindError::UnknownParameters(params.keys().cloned().collect()))
        }
    }

    /// Receive the severity-routed logger; called before `configure`
    fn attach_log(&mut self, _log: RuleLog) {}

    /// Deduplication key for this session; `None` means always execute
    fn cache_id(&self) -> Option<String> {
        None
    }

    /// Whether results of this rule may be reused at all
    fn is_cacheable(&self) -> bool {
        self.cache_id().is_some()
    }

    /// Decide whether an earlier equivalent run still counts for this one
    fn is_result_valid(&self, _previous: &CachedRun<'_>) -> bool {
        true
    }

    /// Short description for debug output
    fn describe(&self) -> Option<String> {
        None
    }
}
