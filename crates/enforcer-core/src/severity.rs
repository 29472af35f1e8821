//! Rule severity levels

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::BindError;

/// Check level attached to every configured rule
///
/// `Error` failures may break the build, `Warn` failures are only logged.
/// Rules without an explicit level default to `Error`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Advisory: logged at warn level, never fails the build
    #[serde(alias = "warn", alias = "WARNING", alias = "warning")]
    Warn,
    /// Build-breaking
    #[default]
    #[serde(alias = "error")]
    Error,
}

impl Severity {
    /// Whether a failure at this level can fail the build
    pub fn is_build_breaking(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warn => write!(f, "WARN"),
        }
    }
}

impl FromStr for Severity {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" | "WARNING" => Ok(Self::Warn),
            _ => Err(BindError::InvalidLevel(s.to_string())),
        }
    }
}
