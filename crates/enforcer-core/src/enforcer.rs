//! Enforcement orchestrator
//!
//! Turns rule declarations into descriptors (registry + binder), then runs
//! them in declared order:
//!
//! ```text
//! Pending ─┬─ cached ──────────────► SkippedCached
//!          └─ execute ─┬─ Ok ──────► Passed
//!                      ├─ Violation ► Failed   (severity / fail-fast policy)
//!                      └─ Fatal ───► FatallyErrored (abort)
//! ```

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::binder::ParameterBinder;
use crate::cache::{CacheLookup, ResultCache};
use crate::config::{EnforcerConfig, RuleDeclaration};
use crate::error::{Error, Result, RuleError};
use crate::expression::ExpressionEvaluator;
use crate::log::RuleLog;
use crate::registry::{RuleRegistry, canonical_name};
use crate::rule::{Rule, RuleContext};
use crate::severity::Severity;

/// Global toggles consumed from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcerOptions {
    /// Do nothing and report success
    pub skip: bool,
    /// ERROR-level failures fail the build
    pub fail_build: bool,
    /// Stop at the first ERROR-level failure instead of aggregating
    pub fail_fast: bool,
    /// Execute every rule even when an equivalent one already ran
    pub ignore_cache: bool,
    /// An empty rule list is an error instead of a warning
    pub fail_if_no_rules: bool,
    /// Canonical names of declared rules to leave out of the pass
    pub skip_rules: Vec<String>,
}

impl Default for EnforcerOptions {
    fn default() -> Self {
        Self {
            skip: false,
            fail_build: true,
            fail_fast: false,
            ignore_cache: false,
            fail_if_no_rules: true,
            skip_rules: Vec::new(),
        }
    }
}

impl From<&EnforcerConfig> for EnforcerOptions {
    fn from(config: &EnforcerConfig) -> Self {
        Self {
            skip: config.skip,
            fail_build: config.fail_build,
            fail_fast: config.fail_fast,
            ignore_cache: config.ignore_cache,
            fail_if_no_rules: config.fail_if_no_rules,
            skip_rules: config.skip_rules.clone(),
        }
    }
}

/// One configured rule, ready to run
pub struct RuleDescriptor {
    /// Canonical name the rule was declared under
    pub name: String,
    /// Type reference of the implementation
    pub implementation: String,
    /// The configured instance
    pub instance: Box<dyn Rule>,
    /// Configured severity
    pub level: Severity,
}

impl RuleDescriptor {
    pub fn new(
        name: impl Into<String>,
        implementation: impl Into<String>,
        instance: Box<dyn Rule>,
        level: Severity,
    ) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            instance,
            level,
        }
    }
}

impl std::fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("name", &self.name)
            .field("implementation", &self.implementation)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// What happened to one descriptor in a pass
///
/// `FatallyErrored` is only found in the report carried by
/// [`Error::RuleFatal`], as the last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Passed,
    Failed(String),
    FatallyErrored(String),
    SkippedCached,
}

/// Per-rule entry of an [`EnforcementReport`]
#[derive(Debug, Clone, Serialize)]
pub struct RuleResult {
    pub index: usize,
    pub name: String,
    pub implementation: String,
    pub level: Severity,
    #[serde(flatten)]
    pub outcome: ExecutionOutcome,
    pub duration_ms: u64,
}

/// Outcome of a pass that did not fail the build
///
/// Contains passed and cached rules, WARN-level failures, and ERROR-level
/// failures that were only logged because `fail_build` was off.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementReport {
    pub timestamp: String,
    pub skipped: bool,
    pub results: Vec<RuleResult>,
}

impl EnforcementReport {
    fn new() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            skipped: false,
            results: Vec::new(),
        }
    }

    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::new()
        }
    }

    pub fn passed_count(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Passed))
    }

    pub fn cached_count(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::SkippedCached))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Failed(_)))
    }

    /// Result for the rule at a declared position
    pub fn result(&self, index: usize) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.index == index)
    }

    fn count(&self, predicate: impl Fn(&ExecutionOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Rule execution and caching orchestrator
#[derive(Debug, Clone)]
pub struct Enforcer {
    registry: Arc<RuleRegistry>,
    binder: ParameterBinder,
    cache: Arc<ResultCache>,
    options: EnforcerOptions,
}

impl Enforcer {
    /// Create an enforcer with default options and a property-less binder
    pub fn new(registry: Arc<RuleRegistry>, cache: Arc<ResultCache>) -> Self {
        Self {
            registry,
            binder: ParameterBinder::default(),
            cache,
            options: EnforcerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EnforcerOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a specific placeholder evaluator for parameter binding
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.binder = ParameterBinder::new(evaluator);
        self
    }

    pub fn options(&self) -> &EnforcerOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Resolve and configure every declared rule
    ///
    /// Fails on the first creation or configuration error. Rules listed in
    /// `skip_rules` are not created at all.
    pub fn prepare(&self, declarations: &[RuleDeclaration]) -> Result<Vec<RuleDescriptor>> {
        let mut descriptors = Vec::with_capacity(declarations.len());

        for declaration in declarations {
            let canonical = canonical_name(&declaration.name);
            if self.options.skip_rules.iter().any(|s| canonical_name(s) == canonical) {
                info!(rule = %canonical, "Skipping rule on request");
                continue;
            }

            let resolved = self
                .registry
                .create(&declaration.name, declaration.implementation.as_deref())?;
            let mut instance = resolved.rule;

            let level = self.binder.level(&resolved.name, &declaration.config)?;
            instance.attach_log(RuleLog::new(resolved.name.clone(), level));
            self.binder
                .bind(&resolved.name, instance.as_mut(), &declaration.config)?;

            descriptors.push(RuleDescriptor {
                name: resolved.name,
                implementation: resolved.implementation,
                instance,
                level,
            });
        }

        Ok(descriptors)
    }

    /// Run prepared descriptors and adjudicate the verdict
    pub fn execute(
        &self,
        descriptors: Vec<RuleDescriptor>,
        ctx: &RuleContext,
    ) -> Result<EnforcementReport> {
        if self.options.skip {
            info!("Skipping Rule Enforcement.");
            return Ok(EnforcementReport::skipped());
        }

        if descriptors.is_empty() {
            if self.options.fail_if_no_rules {
                return Err(Error::NoRules);
            }
            warn!("No rules are configured.");
            return Ok(EnforcementReport::new());
        }

        let mut report = EnforcementReport::new();
        let mut failures = Vec::new();

        for (index, mut descriptor) in descriptors.into_iter().enumerate() {
            let rule = descriptor.instance.as_mut();

            let lookup = if self.options.ignore_cache {
                CacheLookup::Uncached
            } else {
                self.cache.lookup(&descriptor.implementation, rule)
            };

            if lookup == CacheLookup::Hit {
                info!(
                    index,
                    rule = %descriptor.name,
                    "Skipping rule {}: {}, the same rule already ran in this session",
                    index,
                    descriptor.implementation
                );
                report.results.push(result(index, &descriptor, ExecutionOutcome::SkippedCached, 0));
                continue;
            }

            match rule.describe() {
                Some(description) => debug!(index, rule = %descriptor.name, "Executing rule: {description}"),
                None => debug!(index, rule = %descriptor.name, "Executing rule: {}", descriptor.implementation),
            }

            let started = Instant::now();
            let execution = rule.execute(ctx);
            let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let err = match execution {
                Ok(()) => {
                    debug!(index, rule = %descriptor.name, duration_ms = elapsed, "Rule passed");
                    report
                        .results
                        .push(result(index, &descriptor, ExecutionOutcome::Passed, elapsed));
                    continue;
                }
                Err(err) => err,
            };

            if let CacheLookup::Reserved(cache_id) = &lookup {
                self.cache.release(&descriptor.implementation, cache_id);
            }

            match err {
                RuleError::Fatal(message) => {
                    error!(index, rule = %descriptor.name, "Rule failed with a fatal error");
                    report.results.push(result(
                        index,
                        &descriptor,
                        ExecutionOutcome::FatallyErrored(message.clone()),
                        elapsed,
                    ));
                    return Err(Error::RuleFatal {
                        index,
                        rule: descriptor.implementation,
                        message,
                        report: Box::new(report),
                    });
                }
                RuleError::Violation(message) => {
                    self.adjudicate(index, &descriptor, &message, &mut failures)?;
                    report.results.push(result(
                        index,
                        &descriptor,
                        ExecutionOutcome::Failed(message),
                        elapsed,
                    ));
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(Error::Aggregate { messages: failures })
        }
    }

    /// Resolve, configure and execute in one go
    pub fn run(&self, declarations: &[RuleDeclaration], ctx: &RuleContext) -> Result<EnforcementReport> {
        if self.options.skip {
            info!("Skipping Rule Enforcement.");
            return Ok(EnforcementReport::skipped());
        }
        let descriptors = self.prepare(declarations)?;
        self.execute(descriptors, ctx)
    }

    /// Apply severity and fail-fast policy to an ordinary failure
    ///
    /// Returns `Err` when the pass must stop now; otherwise the failure was
    /// either logged or queued for the aggregate failure.
    fn adjudicate(
        &self,
        index: usize,
        descriptor: &RuleDescriptor,
        message: &str,
        failures: &mut Vec<String>,
    ) -> Result<()> {
        match descriptor.level {
            Severity::Warn => {
                warn!("{}", warning_message(index, &descriptor.implementation, message));
                Ok(())
            }
            Severity::Error => {
                let text = failure_message(index, &descriptor.implementation, message);
                if !self.options.fail_build {
                    error!("{text}");
                    Ok(())
                } else if self.options.fail_fast {
                    Err(Error::RuleFailure { message: text })
                } else {
                    debug!(index, rule = %descriptor.name, "Failure deferred to aggregate report");
                    failures.push(text);
                    Ok(())
                }
            }
        }
    }
}

fn result(
    index: usize,
    descriptor: &RuleDescriptor,
    outcome: ExecutionOutcome,
    duration_ms: u64,
) -> RuleResult {
    RuleResult {
        index,
        name: descriptor.name.clone(),
        implementation: descriptor.implementation.clone(),
        level: descriptor.level,
        outcome,
        duration_ms,
    }
}

/// `Rule 0: enforcer_rules::AlwaysFail failed with message:\n...`
pub fn failure_message(index: usize, implementation: &str, message: &str) -> String {
    format!("Rule {index}: {implementation} failed with message:\n{message}")
}

/// `Rule 0: enforcer_rules::AlwaysFail warned with message:\n...`
pub fn warning_message(index: usize, implementation: &str, message: &str) -> String {
    format!("Rule {index}: {implementation} warned with message:\n{message}")
}
