//! Unconditional rules, mostly useful for testing a build setup

use enforcer_core::{
    BindError, ConfigTree, RULES, Rule, RuleContext, RuleEntry, RuleError, decode_params,
};
use serde::Deserialize;

/// Default failure message of [`AlwaysFail`]
pub const DEFAULT_FAIL_MESSAGE: &str = "Always fails!";

/// Always succeeds
#[derive(Debug, Default)]
pub struct AlwaysPass;

impl Rule for AlwaysPass {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AlwaysFailParams {
    message: Option<String>,
}

/// Always fails, with a configurable message
#[derive(Debug, Default)]
pub struct AlwaysFail {
    message: Option<String>,
}

impl AlwaysFail {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

impl Rule for AlwaysFail {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        Err(RuleError::violation(
            self.message.as_deref().unwrap_or(DEFAULT_FAIL_MESSAGE),
        ))
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        let params: AlwaysFailParams = decode_params(params)?;
        self.message = params.message;
        Ok(())
    }
}

#[linkme::distributed_slice(RULES)]
static ALWAYS_PASS: RuleEntry = RuleEntry {
    name: "alwaysPass",
    implementation: "enforcer_rules::AlwaysPass",
    description: "Always succeeds",
    factory: || Box::new(AlwaysPass),
};

#[linkme::distributed_slice(RULES)]
static ALWAYS_FAIL: RuleEntry = RuleEntry {
    name: "alwaysFail",
    implementation: "enforcer_rules::AlwaysFail",
    description: "Always fails with the configured message",
    factory: || Box::new(AlwaysFail::default()),
};
