//! Supply command: the entry point the build tool calls.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::supply::{SupplyPorts, run_supply};
use crate::domain::SupplyPaths;
use crate::domain::layout::{buildpack_dir_from_exe, validate_deps_idx};
use crate::infra::env::default_resolver;
use crate::infra::fs::HostFs;
use crate::infra::random::ThreadRngBaseIds;
use crate::infra::template::HandlebarsRenderer;
use crate::output::TerminalReporter;

/// Arguments for the supply command, in the order the build tool passes them.
#[derive(Args, Debug)]
pub struct SupplyArgs {
    /// Application build directory
    pub build_dir: PathBuf,

    /// Build cache directory
    pub cache_dir: PathBuf,

    /// Root directory of all dependency layers
    pub deps_dir: PathBuf,

    /// Index of this buildpack's layer under DEPS_DIR
    pub deps_idx: String,

    /// Buildpack root holding binaries/, certificates/ and templates/
    /// [default: two levels above this executable]
    #[arg(long, env = "BUILDPACK_DIR")]
    pub buildpack_dir: Option<PathBuf>,
}

impl SupplyArgs {
    /// Validate the arguments and turn them into the run's paths.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed dependency index or when the
    /// buildpack directory cannot be derived.
    pub fn into_paths(self) -> Result<SupplyPaths> {
        validate_deps_idx(&self.deps_idx)?;
        let buildpack_dir = match self.buildpack_dir {
            Some(dir) => dir,
            None => {
                let exe = std::env::current_exe().context("locating the running executable")?;
                buildpack_dir_from_exe(&exe)?
            }
        };
        Ok(SupplyPaths {
            build_dir: self.build_dir,
            cache_dir: self.cache_dir,
            deps_dir: self.deps_dir,
            deps_idx: self.deps_idx,
            buildpack_dir,
        })
    }
}

/// Run the supply pipeline against the host filesystem.
///
/// # Errors
///
/// Returns the failing stage and its cause.
pub fn run(app: &AppContext, args: SupplyArgs) -> Result<()> {
    let paths = args.into_paths()?;
    let resolver = default_resolver(&app.env);
    let renderer = HandlebarsRenderer::new();
    let ports = SupplyPorts {
        installer: &HostFs,
        renderer: &renderer,
        fs: &HostFs,
        base_ids: &ThreadRngBaseIds,
    };
    let reporter = TerminalReporter::new(&app.output);

    app.output.header("-----> Supplying spire");
    let report = run_supply(&resolver, &ports, &paths, &reporter)?;

    if app.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing supply report")?
        );
    }
    Ok(())
}
