//! Parameter Binder
//!
//! Applies a rule declaration's parameter tree onto a freshly created rule.
//! The `level` child is read on its own first so the severity-routed logger
//! can be attached before any rule code runs.

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use crate::error::{BindError, Error, Result};
use crate::expression::{ExpressionEvaluator, PropertyEvaluator};
use crate::rule::{ConfigTree, Rule};
use crate::severity::Severity;

/// Key of the severity child inside a rule's parameter tree
pub const LEVEL_KEY: &str = "level";

/// `${expr}` placeholders; `$${expr}` escapes a literal
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\$\{([^}]*)\}").expect("Invalid regex"));

/// Binds parameter trees onto rule instances
#[derive(Clone)]
pub struct ParameterBinder {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl Default for ParameterBinder {
    fn default() -> Self {
        Self::new(Arc::new(PropertyEvaluator::default()))
    }
}

impl std::fmt::Debug for ParameterBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBinder").finish_non_exhaustive()
    }
}

impl ParameterBinder {
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Read the rule's severity without touching the rest of the tree
    ///
    /// A missing `level` means [`Severity::Error`].
    pub fn level(&self, rule: &str, tree: &ConfigTree) -> Result<Severity> {
        let Some(raw) = tree.get(LEVEL_KEY) else {
            return Ok(Severity::default());
        };

        let resolved = self
            .resolve_value(raw)
            .map_err(|e| configuration_error(rule, &e))?;

        match resolved {
            Value::String(level) => level
                .parse::<Severity>()
                .map_err(|e| configuration_error(rule, &e)),
            other => Err(configuration_error(
                rule,
                &BindError::InvalidLevel(other.to_string()),
            )),
        }
    }

    /// Resolve placeholders and hand every parameter except `level` to the rule
    pub fn bind(&self, rule_name: &str, rule: &mut dyn Rule, tree: &ConfigTree) -> Result<()> {
        let mut params = ConfigTree::new();
        for (key, value) in tree {
            if key == LEVEL_KEY {
                continue;
            }
            let resolved = self
                .resolve_value(value)
                .map_err(|e| configuration_error(rule_name, &e))?;
            params.insert(key.clone(), resolved);
        }

        rule.configure(&params)
            .map_err(|e| configuration_error(rule_name, &e))?;

        tracing::trace!(rule = rule_name, parameters = params.len(), "Bound rule parameters");
        Ok(())
    }

    /// Recursively resolve placeholders inside a value
    pub fn resolve_value(&self, value: &Value) -> std::result::Result<Value, BindError> {
        match value {
            Value::String(s) => self.resolve_string(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    resolved.insert(key.clone(), self.resolve_value(item)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    /// A string that is exactly one placeholder becomes the typed result;
    /// otherwise placeholders are interpolated as text.
    fn resolve_string(&self, input: &str) -> std::result::Result<Value, BindError> {
        if let Some(captures) = PLACEHOLDER.captures(input) {
            let whole = captures.get(0).map_or("", |m| m.as_str());
            if whole == input && !whole.starts_with("$$") {
                return self.evaluate(&captures[1]);
            }
        } else {
            return Ok(Value::String(input.to_string()));
        }

        let mut failure = None;
        let text = PLACEHOLDER.replace_all(input, |caps: &Captures<'_>| {
            let whole = &caps[0];
            if let Some(escaped) = whole.strip_prefix('$').filter(|w| w.starts_with('$')) {
                return escaped.to_string();
            }
            match self.evaluate(&caps[1]) {
                Ok(Value::String(s)) => s,
                Ok(other) => other.to_string(),
                Err(e) => {
                    failure.get_or_insert(e);
                    String::new()
                }
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(Value::String(text.into_owned())),
        }
    }

    fn evaluate(&self, expression: &str) -> std::result::Result<Value, BindError> {
        self.evaluator
            .evaluate(expression)
            .map_err(|reason| BindError::Unresolved {
                expression: expression.to_string(),
                reason,
            })
    }
}

/// Decode a bound parameter tree into a typed parameter struct
///
/// ```ignore
/// #[derive(Deserialize, Default)]
/// #[serde(default, deny_unknown_fields)]
/// struct Params { files: Vec<PathBuf> }
///
/// fn configure(&mut self, params: &ConfigTree) -> Result<(), BindError> {
///     self.params = decode_params(params)?;
///     Ok(())
/// }
/// ```
///
/// Values arrive as strings when they come from properties, so a failed
/// strict decode is retried once with numeric and boolean strings coerced.
pub fn decode_params<T: DeserializeOwned>(params: &ConfigTree) -> std::result::Result<T, BindError> {
    let tree = Value::Object(params.clone());
    match serde_json::from_value(tree.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(strict) => serde_json::from_value(coerce_scalars(tree)).map_err(|_| strict.into()),
    }
}

fn coerce_scalars(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if let Ok(i) = s.parse::<i64>() {
                Value::from(i)
            } else if let Ok(b) = s.parse::<bool>() {
                Value::Bool(b)
            } else if let Some(n) = s.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Value::Number(n)
            } else {
                Value::String(s)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_scalars).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_scalars(v)))
                .collect(),
        ),
        other => other,
    }
}

fn configuration_error(rule: &str, err: &BindError) -> Error {
    Error::RuleConfiguration {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}
