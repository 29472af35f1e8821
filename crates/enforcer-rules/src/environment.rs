//! Environment variable checks

use enforcer_core::{
    BindError, ConfigTree, RULES, Rule, RuleContext, RuleEntry, RuleError, decode_params,
};
use serde::Deserialize;

use crate::matcher::ValueCheck;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequireEnvironmentVariableParams {
    variable_name: String,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    regex_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Requires an environment variable of the build process
#[derive(Debug, Default)]
pub struct RequireEnvironmentVariable {
    params: RequireEnvironmentVariableParams,
}

impl Rule for RequireEnvironmentVariable {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        let params = &self.params;
        let value = std::env::var(&params.variable_name).ok();
        ValueCheck {
            kind: "Environment variable",
            name: &params.variable_name,
            regex: params.regex.as_deref(),
            message: params.message.as_deref(),
            regex_message: params.regex_message.as_deref(),
        }
        .check(value.as_deref())
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.params = decode_params(params)?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some(format!(
            "requireEnvironmentVariable {}",
            self.params.variable_name
        ))
    }
}

#[linkme::distributed_slice(RULES)]
static REQUIRE_ENVIRONMENT_VARIABLE: RuleEntry = RuleEntry {
    name: "requireEnvironmentVariable",
    implementation: "enforcer_rules::RequireEnvironmentVariable",
    description: "Requires an environment variable, optionally matching a regex",
    factory: || Box::new(RequireEnvironmentVariable::default()),
};
