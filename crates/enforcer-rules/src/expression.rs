//! Boolean expression rule
//!
//! Evaluates `condition` with evalexpr over the build properties, exposed
//! the same way as inside `${...}` placeholders (`project.version` becomes
//! `project_version`). Properties can change between passes, so results
//! are never cached.

use enforcer_core::expression::property_context;
use enforcer_core::{
    BindError, ConfigTree, RULES, Rule, RuleContext, RuleEntry, RuleError, RuleLog, decode_params,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EvaluateExpressionParams {
    condition: String,
    #[serde(default)]
    message: Option<String>,
}

/// Fails when `condition` evaluates to `false`
#[derive(Debug, Default)]
pub struct EvaluateExpression {
    params: EvaluateExpressionParams,
    log: Option<RuleLog>,
}

impl EvaluateExpression {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            params: EvaluateExpressionParams {
                condition: condition.into(),
                message: None,
            },
            log: None,
        }
    }
}

impl Rule for EvaluateExpression {
    fn execute(&mut self, ctx: &RuleContext) -> Result<(), RuleError> {
        let condition = self.params.condition.trim();
        if condition.is_empty() {
            return Err(RuleError::fatal("The condition to evaluate is empty."));
        }

        let context = property_context(ctx.properties());
        let holds = evalexpr::eval_boolean_with_context(condition, &context).map_err(|e| {
            RuleError::fatal(format!("Unable to evaluate condition \"{condition}\": {e}"))
        })?;

        if let Some(log) = &self.log {
            log.debug(format_args!("Condition \"{condition}\" evaluated to {holds}"));
        }

        if holds {
            return Ok(());
        }
        if let Some(log) = &self.log {
            log.at_level(format_args!(
                "Properties seen by \"{condition}\": {:?}",
                ctx.properties()
            ));
        }
        Err(RuleError::violation(self.params.message.clone().unwrap_or_else(
            || format!("Condition \"{condition}\" evaluated to false."),
        )))
    }

    fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
        self.params = decode_params(params)?;
        Ok(())
    }

    fn attach_log(&mut self, log: RuleLog) {
        self.log = Some(log);
    }

    fn is_cacheable(&self) -> bool {
        false
    }

    fn describe(&self) -> Option<String> {
        Some(format!("evaluateExpression {}", self.params.condition))
    }
}

#[linkme::distributed_slice(RULES)]
static EVALUATE_EXPRESSION: RuleEntry = RuleEntry {
    name: "evaluateExpression",
    implementation: "enforcer_rules::EvaluateExpression",
    description: "Evaluates a boolean expression over the build properties",
    factory: || Box::new(EvaluateExpression::default()),
};
