//! Build Rule Enforcement Core
//!
//! Runs a configured sequence of independent rules against the current
//! build state and reduces their outcomes to one verdict.
//!
//! - [`registry`]: rule name → unconfigured instance (linkme-registered)
//! - [`binder`]: parameter tree (with `${...}` placeholders) → rule fields
//! - [`cache`]: session-wide at-most-once execution per `(implementation, cache id)`
//! - [`enforcer`]: execution order, severity and fail-fast / aggregate policy
//!
//! ```ignore
//! use std::sync::Arc;
//! use enforcer_core::{ConfigLoader, Enforcer, EnforcerOptions, ResultCache, RuleContext, RuleRegistry};
//!
//! let config = ConfigLoader::new().load()?;
//! let enforcer = Enforcer::new(Arc::new(RuleRegistry::discover()), Arc::new(ResultCache::new()))
//!     .with_options(EnforcerOptions::from(&config));
//!
//! let ctx = RuleContext::new(".").with_properties(config.properties.clone());
//! let report = enforcer.run(&config.rules, &ctx)?;
//! ```

pub mod binder;
pub mod cache;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod error_ext;
pub mod expression;
pub mod log;
pub mod logging;
pub mod registry;
pub mod rule;
pub mod severity;

pub use binder::{ParameterBinder, decode_params};
pub use cache::{CacheLookup, ResultCache};
pub use config::{ConfigLoader, EnforcerConfig, LoggingConfig, RuleDeclaration};
pub use enforcer::{
    EnforcementReport, Enforcer, EnforcerOptions, ExecutionOutcome, RuleDescriptor, RuleResult,
};
pub use error::{BindError, Error, Result, RuleError};
pub use expression::{ExpressionEvaluator, PropertyEvaluator};
pub use log::RuleLog;
pub use registry::{RULES, RuleEntry, RuleRegistry};
pub use rule::{CachedRun, ConfigTree, Rule, RuleContext};
pub use severity::Severity;
