//! Service binding document (`VCAP_SERVICES`) and credential lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Environment variable carrying the service binding document.
pub const VCAP_SERVICES: &str = "VCAP_SERVICES";

/// Reasons a service binding document cannot be used.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("service binding document is empty")]
    Empty,

    #[error("service binding document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parsed service binding document.
///
/// Only the `user_provided` collection is read; every other service label is
/// ignored. The platform historically emitted `user_provided` as a single
/// object, so both a list and a bare object are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceBinding {
    #[serde(default, deserialize_with = "one_or_many")]
    pub user_provided: Vec<UserProvided>,
}

/// One user-provided service instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProvided {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credentials: BTreeMap<String, Value>,
}

impl ServiceBinding {
    /// Parse a raw `VCAP_SERVICES` value.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Empty`] for a blank document and
    /// [`BindingError::Malformed`] when the JSON does not match the schema.
    pub fn parse(raw: &str) -> Result<Self, BindingError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BindingError::Empty);
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Look up a credential across all entries; the first entry holding the
    /// key wins.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.user_provided.iter().find_map(|entry| entry.credential(key))
    }
}

impl UserProvided {
    /// Look up a credential in this entry.
    ///
    /// Tries the exact key, then the lower-cased key, then any key that
    /// matches ignoring ASCII case. Values are trimmed and a blank value
    /// counts as absent.
    #[must_use]
    pub fn credential(&self, key: &str) -> Option<String> {
        let lower = key.to_lowercase();
        let value = self
            .credentials
            .get(key)
            .or_else(|| self.credentials.get(&lower))
            .or_else(|| {
                self.credentials
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
                    .map(|(_, value)| value)
            })?;
        scalar(value)
    }
}

fn scalar(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<UserProvided>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<UserProvided>),
        One(UserProvided),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(entries) => entries,
        OneOrMany::One(entry) => vec![entry],
    })
}
