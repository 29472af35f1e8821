//! Configuration loader
//!
//! Uses Figment to merge, later sources overriding earlier ones:
//! 1. `EnforcerConfig::default()`
//! 2. TOML configuration file (explicit path or first default location found)
//! 3. Environment variables with prefix (e.g., `ENFORCER_FAIL_FAST=true`)

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};

use super::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME, EnforcerConfig};
use crate::error::{Error, Result};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Directory searched for default configuration files
    search_dir: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            search_dir: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path; a missing file is an error
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Look for default configuration files here instead of the working directory
    pub fn with_search_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.search_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<EnforcerConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(EnforcerConfig::default()));

        if let Some(config_path) = &self.config_path {
            if !config_path.exists() {
                log_config_loaded(config_path, false);
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            figment = figment.merge(Toml::file(config_path));
            log_config_loaded(config_path, true);
        } else if let Some(default_path) = self.find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Top-level keys only: ENFORCER_FAIL_FAST → fail_fast
        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).only(&[
                "skip",
                "fail_build",
                "fail_fast",
                "ignore_cache",
                "fail_if_no_rules",
            ]),
        );

        let config: EnforcerConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get the explicit configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path(&self) -> Option<PathBuf> {
        let base = match &self.search_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir().ok()?,
        };

        let candidates = [
            base.join(DEFAULT_CONFIG_FILENAME),
            base.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME),
        ];

        candidates.into_iter().find(|path| path.exists())
    }
}

/// Validate configuration values
fn validate_config(config: &EnforcerConfig) -> Result<()> {
    for (index, rule) in config.rules.iter().enumerate() {
        if rule.name.trim().is_empty() {
            return Err(Error::config(format!("Rule {index} has an empty name")));
        }
    }
    parse_log_level(&config.logging.level)?;
    Ok(())
}
