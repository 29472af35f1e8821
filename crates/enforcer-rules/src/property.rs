//! Build property checks

use enforcer_core::{
    BindError, ConfigTree, RULES, Rule, RuleContext, RuleEntry, RuleError, decode_params,
};
use serde::Deserialize;

use crate::matcher::ValueCheck;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequirePropertyParams {
    property: String,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    regex_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Requires a build property to be set, optionally matching a pattern
///
/// The pattern has to match the whole value.
#[derive(Debug, Default)]
pub struct RequireProperty {
    params: RequirePropertyParams,
}

impl RequireProperty {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            params: RequirePropertyParams {
                property: property.into(),
                ..RequirePropertyParams::default()
            },
        }
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.params.regex = Some(regex.into());
        self
    }
}

impl Rule for RequireProperty {
    fn execute(&mut self, ctx: &RuleContext) -> Result<(), RuleError> {
        let params = &self.params;
        ValueCheck {
            kind: "Property",
            name: &params.property,
            regex: params.regex.as_deref(),
            message: params.message.as_deref(),
            regex_message: params.regex_message.as_deref(),
        }
        .check(ctx.property(&params.property))
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.params = decode_params(params)?;
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some(format!("requireProperty {}", self.params.property))
    }
}

#[linkme::distributed_slice(RULES)]
static REQUIRE_PROPERTY: RuleEntry = RuleEntry {
    name: "requireProperty",
    implementation: "enforcer_rules::RequireProperty",
    description: "Requires a build property, optionally matching a regex",
    factory: || Box::new(RequireProperty::default()),
};
