//! Tests for the property rule

use enforcer_core::{Rule, RuleContext, RuleDeclaration, RuleError};
use enforcer_rules::RequireProperty;

use crate::test_utils::{failure, run_one};

fn ctx() -> RuleContext {
    RuleContext::default().with_property("project.version", "1.4.0-SNAPSHOT")
}

#[test]
fn test_present_property_passes() {
    let report = run_one(
        RuleDeclaration::new("requireProperty").with_param("property", "project.version"),
        &ctx(),
    )
    .unwrap();
    assert_eq!(report.passed_count(), 1);
}

#[test]
fn test_missing_property() {
    let err = RequireProperty::new("release.train")
        .execute(&ctx())
        .unwrap_err();
    assert_eq!(
        err,
        RuleError::violation("Property \"release.train\" is required for this build.")
    );
}

#[test]
fn test_regex_must_match_whole_value() {
    let mut rule = RequireProperty::new("project.version").with_regex(r"\d+\.\d+\.\d+");
    let err = rule.execute(&ctx()).unwrap_err();
    assert_eq!(
        err.message(),
        "Property \"project.version\" evaluates to \"1.4.0-SNAPSHOT\". This does not match the regular expression: \\d+\\.\\d+\\.\\d+"
    );

    let mut snapshot = RequireProperty::new("project.version").with_regex(r".*-SNAPSHOT");
    assert!(snapshot.execute(&ctx()).is_ok());
}

#[test]
fn test_custom_regex_message() {
    let message = failure(
        RuleDeclaration::new("requireProperty")
            .with_param("property", "project.version")
            .with_param("regex", r"\d+\.\d+\.\d+")
            .with_param("regex_message", "Snapshots cannot be released"),
        &ctx(),
    );
    assert!(message.ends_with("\nSnapshots cannot be released"));
}

#[test]
fn test_property_parameter_is_required() {
    let message = failure(RuleDeclaration::new("requireProperty"), &ctx());
    assert!(message.contains("missing field `property`"), "{message}");
}
