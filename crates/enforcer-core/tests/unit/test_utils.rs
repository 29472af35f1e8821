//! Shared test utilities for enforcer-core tests
//!
//! Provides recording rules whose executions can be observed from the test
//! after the orchestrator has taken ownership of them.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use enforcer_core::{
    BindError, CachedRun, ConfigTree, Enforcer, EnforcerOptions, ResultCache, Rule, RuleContext,
    RuleDescriptor, RuleError, RuleLog, RuleRegistry, Severity, decode_params,
};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// What a [`RecordingRule`] does when executed
#[derive(Debug, Clone)]
pub enum Behaviour {
    Pass,
    Fail(&'static str),
    Fatal(&'static str),
}

/// Rule that records whether it ran
pub struct RecordingRule {
    executed: Arc<AtomicBool>,
    behaviour: Behaviour,
    cache_id: Option<String>,
    accept_cached: bool,
}

impl Rule for RecordingRule {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        self.executed.store(true, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Pass => Ok(()),
            Behaviour::Fail(message) => Err(RuleError::violation(message)),
            Behaviour::Fatal(message) => Err(RuleError::fatal(message)),
        }
    }

    fn cache_id(&self) -> Option<String> {
        self.cache_id.clone()
    }

    fn is_result_valid(&self, _previous: &CachedRun<'_>) -> bool {
        self.accept_cached
    }
}

/// Handle on a recording rule after it was moved into a descriptor
#[derive(Clone)]
pub struct Executed(Arc<AtomicBool>);

impl Executed {
    pub fn executed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Build a recording rule
pub fn recording(behaviour: Behaviour, cache_id: Option<&str>) -> (RecordingRule, Executed) {
    let executed = Arc::new(AtomicBool::new(false));
    let rule = RecordingRule {
        executed: Arc::clone(&executed),
        behaviour,
        cache_id: cache_id.map(String::from),
        accept_cached: true,
    };
    (rule, Executed(executed))
}

/// Recording rule that rejects earlier cached runs
pub fn recording_revalidated(behaviour: Behaviour, cache_id: &str) -> (RecordingRule, Executed) {
    let (mut rule, ran) = recording(behaviour, Some(cache_id));
    rule.accept_cached = false;
    (rule, ran)
}

/// Type reference every [`RecordingRule`] descriptor is registered under
pub const RECORDING_RULE: &str = "tests::RecordingRule";

/// Wrap a rule in a descriptor
pub fn descriptor(name: &str, rule: impl Rule + 'static, level: Severity) -> RuleDescriptor {
    RuleDescriptor::new(name, RECORDING_RULE, Box::new(rule), level)
}

/// Options with explicit fail toggles, everything else default
pub fn options(fail_build: bool, fail_fast: bool) -> EnforcerOptions {
    EnforcerOptions {
        fail_build,
        fail_fast,
        ..EnforcerOptions::default()
    }
}

/// Enforcer over an empty registry and a fresh cache
pub fn enforcer(options: EnforcerOptions) -> Enforcer {
    enforcer_with_cache(options, Arc::new(ResultCache::new()))
}

pub fn enforcer_with_cache(options: EnforcerOptions, cache: Arc<ResultCache>) -> Enforcer {
    Enforcer::new(Arc::new(test_registry()), cache).with_options(options)
}

/// Registry holding the configurable test rules below
pub fn test_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.register_component(
        "sizeLimit",
        "tests::SizeLimitRule",
        "Fails when max_size is below 10",
        || Box::new(SizeLimitRule::default()),
    );
    registry.register_type(
        "enforcer_rules::CountedRule",
        "Counts its executions",
        || Box::new(CountedRule),
    );
    registry
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeLimitParams {
    pub max_size: u64,
    pub label: String,
}

/// Configurable rule exposing its bound state through `describe`
#[derive(Default)]
pub struct SizeLimitRule {
    params: SizeLimitParams,
    log: Option<RuleLog>,
    log_attached_before_bind: bool,
}

impl Rule for SizeLimitRule {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        if self.params.max_size < 10 {
            return Err(RuleError::violation(format!(
                "{} is too small",
                self.params.max_size
            )));
        }
        Ok(())
    }

    fn attach_log(&mut self, log: RuleLog) {
        self.log = Some(log);
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.log_attached_before_bind = self.log.is_some();
        if let Some(log) = &self.log {
            log.debug("binding size limit");
        }
        self.params = decode_params(params)?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        let level = self.log.as_ref().map(RuleLog::level);
        Some(format!(
            "max_size={} label={} level={:?} log_first={}",
            self.params.max_size, self.params.label, level, self.log_attached_before_bind
        ))
    }
}

/// Executions of [`CountedRule`] across the whole test binary
pub static COUNTED_EXECUTIONS: AtomicUsize = AtomicUsize::new(0);

/// Rule reachable only through the conventional type reference
pub struct CountedRule;

impl Rule for CountedRule {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        COUNTED_EXECUTIONS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
