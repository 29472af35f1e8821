//! Tests for rule resolution

use enforcer_core::{
    Enforcer, Error, ResultCache, Rule, RuleContext, RuleDeclaration, RuleEntry, RuleError,
    RuleRegistry, RULES,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::test_utils::{COUNTED_EXECUTIONS, test_registry};

#[derive(Default)]
struct RegisteredInTests;

impl Rule for RegisteredInTests {
    fn execute(&mut self, _ctx: &RuleContext) -> Result<(), RuleError> {
        Ok(())
    }
}

#[linkme::distributed_slice(RULES)]
static REGISTERED_IN_TESTS: RuleEntry = RuleEntry {
    name: "registeredInTests",
    implementation: "tests::RegisteredInTests",
    description: "Entry contributed by the test binary",
    factory: || Box::new(RegisteredInTests),
};

#[test]
fn test_component_lookup_ignores_first_char_case() {
    let registry = test_registry();

    let lower = registry.create("sizeLimit", None).unwrap();
    let upper = registry.create("SizeLimit", None).unwrap();

    assert_eq!(lower.name, "sizeLimit");
    assert_eq!(upper.name, "sizeLimit");
    assert_eq!(upper.implementation, "tests::SizeLimitRule");
}

#[test]
fn test_conventional_type_reference() {
    let registry = test_registry();

    let resolved = registry.create("countedRule", None).unwrap();
    assert_eq!(resolved.name, "countedRule");
    assert_eq!(resolved.implementation, "enforcer_rules::CountedRule");
    assert!(registry.contains("CountedRule"));
}

#[test]
fn test_explicit_implementation() {
    let registry = test_registry();

    let resolved = registry
        .create("myCounter", Some("enforcer_rules::CountedRule"))
        .unwrap();
    assert_eq!(resolved.name, "myCounter");
    assert_eq!(resolved.implementation, "enforcer_rules::CountedRule");
    assert!(!registry.contains("myCounter"));
}

#[test]
fn test_component_wins_over_explicit_implementation() {
    let registry = test_registry();

    let resolved = registry
        .create("sizeLimit", Some("enforcer_rules::CountedRule"))
        .unwrap();
    assert_eq!(resolved.implementation, "tests::SizeLimitRule");
}

#[test]
fn test_unresolvable_rule() {
    let registry = test_registry();

    let err = registry.create("noSuchRule", None).unwrap_err();
    match &err {
        Error::RuleCreation {
            name,
            implementation,
        } => {
            assert_eq!(name, "noSuchRule");
            assert_eq!(implementation, "enforcer_rules::NoSuchRule");
        }
        other => panic!("expected creation error, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Failed to create enforcer rules with name: noSuchRule or for class: enforcer_rules::NoSuchRule"
    );
}

#[test]
fn test_creation_failure_executes_nothing() {
    let enforcer = Enforcer::new(Arc::new(test_registry()), Arc::new(ResultCache::new()));
    let declarations = vec![
        RuleDeclaration::new("countedRule"),
        RuleDeclaration::new("noSuchRule"),
    ];

    let before = COUNTED_EXECUTIONS.load(Ordering::SeqCst);
    let err = enforcer
        .run(&declarations, &RuleContext::default())
        .unwrap_err();

    assert!(matches!(err, Error::RuleCreation { .. }));
    assert_eq!(COUNTED_EXECUTIONS.load(Ordering::SeqCst), before);
}

#[test]
fn test_list_is_sorted_by_name() {
    let mut registry = test_registry();
    registry.register_component("alphaRule", "tests::Alpha", "First", || {
        Box::new(RegisteredInTests)
    });

    let names: Vec<_> = registry.list().into_iter().map(|(name, _, _)| name).collect();
    assert_eq!(names, vec!["alphaRule", "sizeLimit"]);
}

#[test]
fn test_discover_collects_linked_entries() {
    let registry = RuleRegistry::discover();

    let by_name = registry.create("registeredInTests", None).unwrap();
    assert_eq!(by_name.implementation, "tests::RegisteredInTests");

    let by_type = registry
        .create("anything", Some("tests::RegisteredInTests"))
        .unwrap();
    assert_eq!(by_type.name, "anything");
}
