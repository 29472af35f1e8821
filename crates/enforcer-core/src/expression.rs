//! Placeholder expression evaluation
//!
//! Rule parameters may embed `${...}` placeholders. The binder hands their
//! content to an [`ExpressionEvaluator`]; the default [`PropertyEvaluator`]
//! looks up build properties and falls back to evalexpr for arithmetic and
//! boolean expressions such as `${build_number + 1}`.

use evalexpr::{ContextWithMutableVariables, HashMapContext, Value as EvalValue};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolves the content of a `${...}` placeholder
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate an expression to a typed value
    fn evaluate(&self, expression: &str) -> Result<Value, String>;
}

/// Evaluator backed by the build's properties
///
/// Lookup order:
/// 1. a property with exactly this key
/// 2. `env.NAME` → process environment variable `NAME`
/// 3. evalexpr over the properties, keys exposed with `.` replaced by `_`
#[derive(Debug, Clone, Default)]
pub struct PropertyEvaluator {
    properties: BTreeMap<String, String>,
}

impl PropertyEvaluator {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl ExpressionEvaluator for PropertyEvaluator {
    fn evaluate(&self, expression: &str) -> Result<Value, String> {
        let expression = expression.trim();

        if let Some(value) = self.properties.get(expression) {
            return Ok(Value::String(value.clone()));
        }

        if let Some(variable) = expression.strip_prefix("env.") {
            return std::env::var(variable)
                .map(Value::String)
                .map_err(|_| format!("environment variable '{variable}' is not set"));
        }

        let ctx = property_context(&self.properties);
        evalexpr::eval_with_context(expression, &ctx)
            .map(|value| eval_to_json(&value))
            .map_err(|e| e.to_string())
    }
}

/// Build an evalexpr context exposing properties as typed variables
///
/// Property keys have `.` and `-` replaced by `_` so that
/// `project.version` is reachable as `project_version`.
pub fn property_context(properties: &BTreeMap<String, String>) -> HashMapContext {
    let mut ctx: HashMapContext = HashMapContext::new();
    for (key, value) in properties {
        let identifier = key.replace(['.', '-'], "_");
        // Only fails for type changes of an existing variable, which a fresh context never has
        let _ = ctx.set_value(identifier, typed_value(value));
    }
    ctx
}

/// Interpret a property string as int, float or boolean where possible
fn typed_value(raw: &str) -> EvalValue {
    if let Ok(i) = raw.parse::<i64>() {
        EvalValue::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        EvalValue::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        EvalValue::Boolean(b)
    } else {
        EvalValue::String(raw.to_string())
    }
}

/// Convert evalexpr value to JSON value
fn eval_to_json(value: &EvalValue) -> Value {
    match value {
        EvalValue::String(s) => Value::String(s.clone()),
        EvalValue::Int(i) => Value::from(*i),
        EvalValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        EvalValue::Boolean(b) => Value::Bool(*b),
        EvalValue::Tuple(items) => Value::Array(items.iter().map(eval_to_json).collect()),
        EvalValue::Empty => Value::Null,
    }
}
