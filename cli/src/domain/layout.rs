//! Directory layout of the dependency cache and the build output.
//!
//! Pure path arithmetic: nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::error::ConfigError;

pub const AGENT_BINARY: &str = "spire-agent";
pub const AGENT_CONF: &str = "agent.conf";
pub const PROXY_CONF: &str = "proxy.conf";
pub const LAUNCH_DESCRIPTOR: &str = "launch.yml";

pub const AGENT_CONF_TEMPLATE: &str = "spire-agent-conf.tmpl";
pub const PROXY_CONF_TEMPLATE: &str = "proxy-conf.tmpl";
pub const AGENT_PROCESS_TEMPLATE: &str = "agent-process.tmpl";
pub const PROXY_PROCESS_TEMPLATE: &str = "proxy-process.tmpl";

/// A copy from the read-only dependency cache into the build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Directories handed over by the build tool for one supply run.
#[derive(Debug, Clone)]
pub struct SupplyPaths {
    /// Application sources; receives `logs/` and may hold `buildpack.yml`.
    pub build_dir: PathBuf,
    /// Build cache shared between staging runs.
    pub cache_dir: PathBuf,
    /// Root of all dependency layers.
    pub deps_dir: PathBuf,
    /// This buildpack's layer index under `deps_dir`.
    pub deps_idx: String,
    /// Buildpack root holding `binaries/`, `certificates/`, `templates/`
    /// and `manifest.yml`.
    pub buildpack_dir: PathBuf,
}

impl SupplyPaths {
    /// `<deps_dir>/<deps_idx>`
    #[must_use]
    pub fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx)
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.dep_dir().join("bin")
    }

    #[must_use]
    pub fn agent_binary(&self) -> InstallTarget {
        InstallTarget {
            source: self.buildpack_dir.join("binaries").join(AGENT_BINARY),
            destination: self.bin_dir().join(AGENT_BINARY),
        }
    }

    #[must_use]
    pub fn plugins(&self) -> InstallTarget {
        InstallTarget {
            source: self.buildpack_dir.join("binaries").join("plugins"),
            destination: self.bin_dir().join("plugins"),
        }
    }

    #[must_use]
    pub fn certificates(&self) -> InstallTarget {
        InstallTarget {
            source: self.buildpack_dir.join("certificates"),
            destination: self.dep_dir().join("certificates"),
        }
    }

    #[must_use]
    pub fn template(&self, name: &str) -> PathBuf {
        self.buildpack_dir.join("templates").join(name)
    }

    #[must_use]
    pub fn agent_conf(&self) -> PathBuf {
        self.bin_dir().join(AGENT_CONF)
    }

    #[must_use]
    pub fn proxy_conf(&self) -> PathBuf {
        self.bin_dir().join(PROXY_CONF)
    }

    #[must_use]
    pub fn launch_descriptor(&self) -> PathBuf {
        self.dep_dir().join(LAUNCH_DESCRIPTOR)
    }

    #[must_use]
    pub fn manifest(&self) -> PathBuf {
        self.buildpack_dir.join("manifest.yml")
    }

    #[must_use]
    pub fn user_config(&self) -> PathBuf {
        self.build_dir.join("buildpack.yml")
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.build_dir.join("logs")
    }
}

/// Validates the dependency index passed by the build tool.
///
/// # Errors
///
/// Returns an error unless `idx` is a non-empty run of ASCII digits.
pub fn validate_deps_idx(idx: &str) -> Result<()> {
    if idx.is_empty() || !idx.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidDepsIndex(idx.to_string()).into());
    }
    Ok(())
}

/// The buildpack root for an executable installed as `<root>/bin/<exe>`.
///
/// # Errors
///
/// Returns an error if `exe` has no grandparent directory.
pub fn buildpack_dir_from_exe(exe: &Path) -> Result<PathBuf> {
    exe.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| ConfigError::BuildpackDirUnknown.into())
}
