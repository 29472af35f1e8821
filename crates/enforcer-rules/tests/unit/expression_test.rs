//! Tests for the boolean expression rule

use enforcer_core::{
    Error, PropertyEvaluator, ResultCache, Rule, RuleContext, RuleDeclaration, RuleError,
};
use enforcer_rules::EvaluateExpression;
use std::sync::Arc;

use crate::test_utils::{enforcer_with_cache, failure, run_one};

fn ctx() -> RuleContext {
    RuleContext::default()
        .with_property("build.number", "41")
        .with_property("release", "false")
}

#[test]
fn test_true_condition_passes() {
    let mut rule = EvaluateExpression::new("build_number > 40 && !release");
    assert!(rule.execute(&ctx()).is_ok());
}

#[test]
fn test_false_condition_fails() {
    let err = EvaluateExpression::new("build_number >= 100")
        .execute(&ctx())
        .unwrap_err();
    assert_eq!(
        err,
        RuleError::violation("Condition \"build_number >= 100\" evaluated to false.")
    );
}

#[test]
fn test_custom_message() {
    let message = failure(
        RuleDeclaration::new("evaluateExpression")
            .with_param("condition", "release")
            .with_param("message", "Only release builds may deploy"),
        &ctx(),
    );
    assert!(message.ends_with("\nOnly release builds may deploy"));
}

#[test]
fn test_non_boolean_condition_is_fatal() {
    let err = run_one(
        RuleDeclaration::new("evaluateExpression").with_param("condition", "build_number + 1"),
        &ctx(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::RuleFatal { .. }));
}

#[test]
fn test_placeholder_inside_condition() {
    let enforcer = enforcer_with_cache(Arc::new(ResultCache::new())).with_evaluator(Arc::new(
        PropertyEvaluator::default().with_property("minimum", "40"),
    ));

    let report = enforcer
        .run(
            &[RuleDeclaration::new("evaluateExpression")
                .with_param("condition", "build_number > ${minimum}")],
            &ctx(),
        )
        .unwrap();
    assert_eq!(report.passed_count(), 1);
}

#[test]
fn test_never_cached() {
    let cache = Arc::new(ResultCache::new());
    let declaration = RuleDeclaration::new("evaluateExpression").with_param("condition", "true");

    for _ in 0..2 {
        let report = enforcer_with_cache(Arc::clone(&cache))
            .run(std::slice::from_ref(&declaration), &ctx())
            .unwrap();
        assert_eq!(report.passed_count(), 1);
    }
    assert!(cache.is_empty());
    assert!(!EvaluateExpression::new("true").is_cacheable());
}
