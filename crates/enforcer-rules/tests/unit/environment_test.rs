//! Tests for the environment variable rule
//!
//! Only variables that are reliably set (`PATH`) or reliably unset are used,
//! since tests must not mutate the process environment.

use enforcer_core::{RuleContext, RuleDeclaration};

use crate::test_utils::{failure, run_one};

const UNSET: &str = "ENFORCER_RULES_TEST_SURELY_UNSET_VARIABLE";

#[test]
fn test_set_variable_passes() {
    if std::env::var_os("PATH").is_none() {
        return;
    }
    let report = run_one(
        RuleDeclaration::new("requireEnvironmentVariable").with_param("variable_name", "PATH"),
        &RuleContext::default(),
    )
    .unwrap();
    assert_eq!(report.passed_count(), 1);
}

#[test]
fn test_unset_variable_fails() {
    let message = failure(
        RuleDeclaration::new("requireEnvironmentVariable").with_param("variable_name", UNSET),
        &RuleContext::default(),
    );
    assert!(message.ends_with(&format!(
        "\nEnvironment variable \"{UNSET}\" is required for this build."
    )));
}

#[test]
fn test_custom_message() {
    let message = failure(
        RuleDeclaration::new("requireEnvironmentVariable")
            .with_param("variable_name", UNSET)
            .with_param("message", "Export the signing key first"),
        &RuleContext::default(),
    );
    assert!(message.ends_with("\nExport the signing key first"));
}

#[test]
fn test_regex_mismatch() {
    if std::env::var_os("PATH").is_none() {
        return;
    }
    let message = failure(
        RuleDeclaration::new("requireEnvironmentVariable")
            .with_param("variable_name", "PATH")
            .with_param("regex", "^$"),
        &RuleContext::default(),
    );
    assert!(message.contains("This does not match the regular expression: ^$"));
}

#[test]
fn test_invalid_regex_is_fatal() {
    if std::env::var_os("PATH").is_none() {
        return;
    }
    let err = run_one(
        RuleDeclaration::new("requireEnvironmentVariable")
            .with_param("variable_name", "PATH")
            .with_param("regex", "(unclosed"),
        &RuleContext::default(),
    )
    .unwrap_err();
    assert!(matches!(err, enforcer_core::Error::RuleFatal { .. }));
}
