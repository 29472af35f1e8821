//! # Built-in Enforcer Rules
//!
//! Every rule in this crate registers itself into
//! [`enforcer_core::RULES`] at link time, so a binary only has to link the
//! crate for [`enforcer_core::RuleRegistry::discover`] to find them.
//!
//! | Component | Implementation | Cached |
//! |-----------|----------------|--------|
//! | `alwaysPass` | [`AlwaysPass`] | no |
//! | `alwaysFail` | [`AlwaysFail`] | no |
//! | `requireFilesExist` | [`RequireFilesExist`] | when every path is absolute |
//! | `requireFilesDontExist` | [`RequireFilesDontExist`] | when every path is absolute |
//! | `requireEnvironmentVariable` | [`RequireEnvironmentVariable`] | no |
//! | `requireProperty` | [`RequireProperty`] | no |
//! | `evaluateExpression` | [`EvaluateExpression`] | no |
//!
//! ```toml
//! [[rules]]
//! name = "requireFilesExist"
//! files = ["Cargo.toml", "LICENSE"]
//!
//! [[rules]]
//! name = "requireProperty"
//! level = "WARN"
//! property = "project.version"
//! regex = '\d+\.\d+\.\d+'
//! ```

pub mod always;
pub mod environment;
pub mod expression;
pub mod files;
pub mod property;

mod matcher;

pub use always::{AlwaysFail, AlwaysPass};
pub use environment::RequireEnvironmentVariable;
pub use expression::EvaluateExpression;
pub use files::{RequireFilesDontExist, RequireFilesExist};
pub use property::RequireProperty;
