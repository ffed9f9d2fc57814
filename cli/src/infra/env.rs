//! Environment snapshot and the two parameter sources built on it.
//!
//! The process environment is read exactly once, in [`EnvSnapshot::capture`];
//! everything downstream works on the snapshot so tests can inject their own.

use std::collections::BTreeMap;

use anyhow::Result;
use spire_common::{ServiceBinding, VCAP_SERVICES};

use crate::application::ports::ParameterSource;
use crate::application::resolver::CredentialResolver;
use crate::domain::SupplyError;

/// Immutable copy of the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Read the current process environment. Variables that are not valid
    /// UTF-8 are skipped.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ── Service binding source ────────────────────────────────────────────────────

/// Looks keys up in the `VCAP_SERVICES` document.
///
/// Holds the raw document and parses it on every lookup.
#[derive(Debug, Clone)]
pub struct ServiceBindingSource {
    raw: Option<String>,
}

impl ServiceBindingSource {
    #[must_use]
    pub fn new(snapshot: &EnvSnapshot) -> Self {
        Self {
            raw: snapshot.get(VCAP_SERVICES).map(str::to_owned),
        }
    }

    fn binding(&self) -> Result<ServiceBinding, SupplyError> {
        let raw = self
            .raw
            .as_deref()
            .ok_or_else(|| SupplyError::BindingUnavailable(format!("{VCAP_SERVICES} is not set")))?;
        ServiceBinding::parse(raw).map_err(|e| SupplyError::BindingUnavailable(e.to_string()))
    }
}

impl ParameterSource for ServiceBindingSource {
    fn name(&self) -> &'static str {
        "service-binding"
    }

    fn try_resolve(&self, key: &str) -> Result<Option<String>> {
        Ok(self.binding()?.lookup(key))
    }
}

// ── Environment source ────────────────────────────────────────────────────────

/// Looks keys up directly in the environment snapshot.
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    snapshot: EnvSnapshot,
}

impl EnvironmentSource {
    #[must_use]
    pub fn new(snapshot: &EnvSnapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
        }
    }
}

impl ParameterSource for EnvironmentSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn try_resolve(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .snapshot
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned))
    }
}

/// The production chain: service binding first, environment second.
#[must_use]
pub fn default_resolver(snapshot: &EnvSnapshot) -> CredentialResolver {
    CredentialResolver::new(vec![
        Box::new(ServiceBindingSource::new(snapshot)),
        Box::new(EnvironmentSource::new(snapshot)),
    ])
}
