//! Presence and pattern checks shared by the property-style rules

use enforcer_core::RuleError;
use regex::Regex;

/// A named value that must be present and may have to match a pattern
pub(crate) struct ValueCheck<'a> {
    /// "Property" or "Environment variable"
    pub kind: &'a str,
    pub name: &'a str,
    pub regex: Option<&'a str>,
    /// Replaces the message for a missing value
    pub message: Option<&'a str>,
    /// Replaces the message for a value that does not match
    pub regex_message: Option<&'a str>,
}

impl ValueCheck<'_> {
    /// The whole value has to match the pattern, not just a substring
    pub fn check(&self, value: Option<&str>) -> Result<(), RuleError> {
        let Some(value) = value else {
            return Err(RuleError::violation(self.message.map_or_else(
                || format!("{} \"{}\" is required for this build.", self.kind, self.name),
                str::to_string,
            )));
        };

        let Some(pattern) = self.regex.filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            RuleError::fatal(format!("Invalid regular expression \"{pattern}\": {e}"))
        })?;

        if anchored.is_match(value) {
            Ok(())
        } else {
            Err(RuleError::violation(self.regex_message.map_or_else(
                || {
                    format!(
                        "{} \"{}\" evaluates to \"{value}\". This does not match the regular expression: {pattern}",
                        self.kind, self.name
                    )
                },
                str::to_string,
            )))
        }
    }
}
