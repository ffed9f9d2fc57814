//! Credential resolver: an ordered chain of parameter sources.
//!
//! Every lookup walks the chain from the start; nothing is cached, so a
//! broken binding for one key never affects the lookup of another.

use anyhow::Result;
use tracing::debug;

use crate::application::ports::ParameterSource;
use crate::domain::{SupplyError, is_truthy};

/// Resolves named parameters from the first source that holds them.
pub struct CredentialResolver {
    sources: Vec<Box<dyn ParameterSource>>,
}

impl CredentialResolver {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn ParameterSource>>) -> Self {
        Self { sources }
    }

    /// Look up `key` in each source in order.
    ///
    /// A source reporting `BindingUnavailable` is skipped.
    ///
    /// # Errors
    ///
    /// Propagates any other source error.
    pub fn resolve(&self, key: &str) -> Result<Option<String>> {
        for source in &self.sources {
            match source.try_resolve(key) {
                Ok(Some(value)) => {
                    debug!(key, source = source.name(), "parameter resolved");
                    return Ok(Some(value));
                }
                Ok(None) => {}
                Err(err) => match SupplyError::find(&err) {
                    Some(SupplyError::BindingUnavailable(reason)) => {
                        debug!(
                            key,
                            source = source.name(),
                            %reason,
                            "source unavailable, falling back"
                        );
                    }
                    _ => return Err(err),
                },
            }
        }
        debug!(key, "parameter not found in any source");
        Ok(None)
    }

    /// Resolve `key`, falling back to `default` when absent or unreadable.
    #[must_use]
    pub fn resolve_or_default(&self, key: &str, default: &str) -> String {
        match self.resolve(key) {
            Ok(Some(value)) => value,
            Ok(None) => default.to_string(),
            Err(err) => {
                tracing::warn!(key, error = %err, "lookup failed, using default");
                default.to_string()
            }
        }
    }

    /// Resolve `key` or fail.
    ///
    /// # Errors
    ///
    /// `SupplyError::MissingParameter` when no source holds the key.
    pub fn resolve_required(&self, key: &str) -> Result<String> {
        self.resolve(key)?.ok_or_else(|| {
            SupplyError::MissingParameter {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Whether the feature flag `key` resolves to `true` (any letter case).
    ///
    /// # Errors
    ///
    /// Propagates source errors other than `BindingUnavailable`.
    pub fn is_enabled(&self, key: &str) -> Result<bool> {
        Ok(is_truthy(self.resolve(key)?.as_deref()))
    }
}
