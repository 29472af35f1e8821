//! Rule Registry
//!
//! Resolves a declared rule name to a freshly constructed, unconfigured
//! rule instance. Rule crates register themselves at compile time through
//! the [`RULES`] distributed slice:
//!
//! ```ignore
//! use enforcer_core::registry::{RuleEntry, RULES};
//!
//! #[linkme::distributed_slice(RULES)]
//! static ALWAYS_PASS: RuleEntry = RuleEntry {
//!     name: "alwaysPass",
//!     implementation: "enforcer_rules::AlwaysPass",
//!     description: "Always succeeds",
//!     factory: || Box::new(AlwaysPass::default()),
//! };
//! ```
//!
//! Resolution order for `create(name, implementation)`:
//!
//! 1. component catalog, keyed by the canonical name (first char lower-cased)
//! 2. type catalog, keyed by the explicit `implementation`, or by a name
//!    containing `::` verbatim, or by `enforcer_rules::<Name>`
//!
//! A miss in both is a [`Error::RuleCreation`].

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::rule::Rule;

/// Namespace used to derive type references from bare rule names
pub const RULES_NAMESPACE: &str = "enforcer_rules";

/// Constructor of an unconfigured rule
pub type RuleFactory = fn() -> Box<dyn Rule>;

/// Registry entry for built-in and plugin rules
///
/// Each rule registers itself in both catalogs: under its component name
/// and under its implementation type reference.
pub struct RuleEntry {
    /// Component name (e.g., "requireFilesExist")
    pub name: &'static str,
    /// Fully-qualified type reference (e.g., "enforcer_rules::RequireFilesExist")
    pub implementation: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create an instance
    pub factory: RuleFactory,
}

// Auto-collection via linkme distributed slices - rule crates submit entries at compile time
#[linkme::distributed_slice]
pub static RULES: [RuleEntry] = [..];

/// A rule produced by the registry, not yet configured
pub struct ResolvedRule {
    /// Canonical name the rule was declared under
    pub name: String,
    /// Type reference of the implementation that was constructed
    pub implementation: String,
    /// The unconfigured instance
    pub rule: Box<dyn Rule>,
}

impl std::fmt::Debug for ResolvedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRule")
            .field("name", &self.name)
            .field("implementation", &self.implementation)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Registration {
    implementation: String,
    description: String,
    factory: RuleFactory,
}

/// Closed catalog of rule factories
#[derive(Clone, Default)]
pub struct RuleRegistry {
    components: HashMap<String, Registration>,
    types: HashMap<String, Registration>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every entry linked into [`RULES`]
    pub fn discover() -> Self {
        let mut registry = Self::new();
        for entry in RULES {
            registry.register(entry);
        }
        tracing::debug!(rules = RULES.len(), "Discovered registered rules");
        registry
    }

    /// Register an entry as both a component and a type
    pub fn register(&mut self, entry: &RuleEntry) {
        self.register_component(
            entry.name,
            entry.implementation,
            entry.description,
            entry.factory,
        );
        self.register_type(entry.implementation, entry.description, entry.factory);
    }

    /// Register a named component
    pub fn register_component(
        &mut self,
        name: &str,
        implementation: &str,
        description: &str,
        factory: RuleFactory,
    ) {
        self.components.insert(
            canonical_name(name),
            Registration {
                implementation: implementation.to_string(),
                description: description.to_string(),
                factory,
            },
        );
    }

    /// Register an implementation reachable only through its type reference
    pub fn register_type(&mut self, implementation: &str, description: &str, factory: RuleFactory) {
        self.types.insert(
            implementation.to_string(),
            Registration {
                implementation: implementation.to_string(),
                description: description.to_string(),
                factory,
            },
        );
    }

    /// Resolve a declared rule to a new instance
    pub fn create(&self, name: &str, implementation: Option<&str>) -> Result<ResolvedRule> {
        let canonical = canonical_name(name);

        if let Some(registration) = self.components.get(&canonical) {
            tracing::trace!(rule = %canonical, "Resolved rule from component catalog");
            return Ok(ResolvedRule {
                name: canonical,
                implementation: registration.implementation.clone(),
                rule: (registration.factory)(),
            });
        }

        let type_ref = match implementation {
            Some(implementation) if !implementation.trim().is_empty() => {
                implementation.trim().to_string()
            }
            _ => conventional_implementation(name),
        };

        match self.types.get(&type_ref) {
            Some(registration) => {
                tracing::trace!(rule = %canonical, implementation = %type_ref, "Resolved rule from type catalog");
                Ok(ResolvedRule {
                    name: canonical,
                    implementation: registration.implementation.clone(),
                    rule: (registration.factory)(),
                })
            }
            None => Err(Error::RuleCreation {
                name: canonical,
                implementation: type_ref,
            }),
        }
    }

    /// Whether a rule can be resolved without an explicit implementation
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(&canonical_name(name))
            || self.types.contains_key(&conventional_implementation(name))
    }

    /// List registered components as (name, implementation, description), sorted by name
    pub fn list(&self) -> Vec<(&str, &str, &str)> {
        let mut rules: Vec<_> = self
            .components
            .iter()
            .map(|(name, reg)| {
                (
                    name.as_str(),
                    reg.implementation.as_str(),
                    reg.description.as_str(),
                )
            })
            .collect();
        rules.sort_by(|a, b| a.0.cmp(b.0));
        rules
    }
}

/// Lower-case the first character: `RequireFilesExist` → `requireFilesExist`
pub fn canonical_name(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive the conventional type reference for a rule name
///
/// Names that already contain a path separator are used verbatim.
pub fn conventional_implementation(name: &str) -> String {
    let name = name.trim();
    if name.contains("::") {
        return name.to_string();
    }
    let mut chars = name.chars();
    let type_name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{RULES_NAMESPACE}::{type_name}")
}
