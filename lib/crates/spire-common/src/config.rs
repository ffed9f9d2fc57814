//! Build-time documents: the user override and the buildpack manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User override document read from `<build>/buildpack.yml`.
///
/// Every field is optional; unknown keys are ignored so application authors
/// can share one file between several buildpacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackConfig {
    /// Pinned SPIRE agent settings.
    #[serde(rename = "spire-agent")]
    pub spire_agent: SpireAgentConfig,
    /// Distribution hint, e.g. `"oss"`.
    pub dist: String,
}

/// The `spire-agent` section of `buildpack.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpireAgentConfig {
    /// Requested agent version (empty means the manifest default).
    pub version: String,
}

impl BuildpackConfig {
    /// Parse `buildpack.yml` content. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error when the document is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// The part of the buildpack `manifest.yml` the supply step reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildpackManifest {
    /// Dependency name to version line, e.g. `spire-agent: 1.9.x`.
    #[serde(default)]
    pub version_lines: BTreeMap<String, String>,
}

impl BuildpackManifest {
    /// Parse `manifest.yml` content.
    ///
    /// # Errors
    ///
    /// Returns the YAML error when the document is malformed or empty.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
