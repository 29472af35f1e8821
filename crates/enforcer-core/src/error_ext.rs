//! Error extension utilities
//!
//! Context helpers converting foreign errors into [`Error`].

use std::fmt;

use crate::error::{Error, Result};

/// Extension trait for adding context to errors
///
/// ```ignore
/// use enforcer_core::error_ext::ErrorContext;
///
/// let config: EnforcerConfig = figment
///     .extract()
///     .config_context("Failed to extract configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context, converting the error into a configuration error
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }
}
