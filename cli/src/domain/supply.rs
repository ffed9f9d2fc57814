//! Pipeline stages and the summary of a supply run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use spire_common::BuildpackConfig;

/// Stages of the supply pipeline in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    InstallTrustMaterial,
    RenderAgentConfig,
    InstallAgentBinary,
    InstallPlugins,
    AssembleLaunchDescriptor,
    Setup,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::InstallTrustMaterial,
        Stage::RenderAgentConfig,
        Stage::InstallAgentBinary,
        Stage::InstallPlugins,
        Stage::AssembleLaunchDescriptor,
        Stage::Setup,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::InstallTrustMaterial => "install trust material",
            Stage::RenderAgentConfig => "render agent configuration",
            Stage::InstallAgentBinary => "install agent binary",
            Stage::InstallPlugins => "install plugins",
            Stage::AssembleLaunchDescriptor => "assemble launch descriptor",
            Stage::Setup => "setup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of installing a single binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Installed,
    AlreadyPresent,
}

/// What the auxiliary setup stage found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetupOutcome {
    /// `None` when the application has no `buildpack.yml`.
    pub user_config: Option<BuildpackConfig>,
    pub version_lines: BTreeMap<String, String>,
    /// `false` when `logs/` already existed.
    pub logs_dir_created: bool,
}

/// Summary of a completed supply run.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyReport {
    pub certificates_installed: usize,
    pub agent_binary: InstallOutcome,
    pub plugins_installed: usize,
    pub proxy_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_base_id: Option<u32>,
    pub setup: SetupOutcome,
}
