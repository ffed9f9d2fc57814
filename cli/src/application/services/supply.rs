//! Application service: the sidecar supply pipeline.
//!
//! Runs the stages in a fixed order and stops at the first failure. Every
//! error leaves this module wrapped with the name of the stage that failed.
//! Nothing is rolled back; re-running the build is the recovery path.

use std::io::ErrorKind;

use anyhow::{Context, Result};
use spire_common::{BuildpackConfig, BuildpackManifest};
use tracing::{error, info};

use crate::application::ports::{
    ArtifactInstaller, BaseIdSource, LocalFs, ProgressReporter, TemplateRenderer,
};
use crate::application::resolver::CredentialResolver;
use crate::application::services::config_render::{render_agent_config, render_proxy_config};
use crate::application::services::launch::{assemble, write_launch_descriptor};
use crate::domain::params::PROXY_ENABLED;
use crate::domain::{InstallOutcome, SetupOutcome, Stage, SupplyError, SupplyPaths, SupplyReport};

/// Collaborators the pipeline writes through.
pub struct SupplyPorts<'a, I, T, F, B> {
    pub installer: &'a I,
    pub renderer: &'a T,
    pub fs: &'a F,
    pub base_ids: &'a B,
}

/// Run the whole supply pipeline.
///
/// # Errors
///
/// Returns the first stage failure, with the stage name as context.
pub fn run_supply<I, T, F, B>(
    resolver: &CredentialResolver,
    ports: &SupplyPorts<'_, I, T, F, B>,
    paths: &SupplyPaths,
    reporter: &impl ProgressReporter,
) -> Result<SupplyReport>
where
    I: ArtifactInstaller,
    T: TemplateRenderer,
    F: LocalFs,
    B: BaseIdSource,
{
    info!(
        build_dir = %paths.build_dir.display(),
        dep_dir = %paths.dep_dir().display(),
        buildpack_dir = %paths.buildpack_dir.display(),
        cache_dir = %paths.cache_dir.display(),
        "supplying spire"
    );

    let certificates_installed = run_stage(reporter, Stage::InstallTrustMaterial, || {
        ports.installer.install_tree(&paths.certificates())
    })?;
    if certificates_installed == 0 {
        reporter.warn("no trust bundles found in the buildpack");
    } else {
        reporter.success(&format!("installed {certificates_installed} trust bundle file(s)"));
    }

    let agent = run_stage(reporter, Stage::RenderAgentConfig, || {
        render_agent_config(resolver, ports.renderer, ports.fs, paths)
    })?;
    reporter.success(&format!(
        "agent configured for {}:{} in trust domain {}",
        agent.server_address, agent.server_port, agent.trust_domain
    ));

    let agent_binary = run_stage(reporter, Stage::InstallAgentBinary, || {
        ports.installer.install_binary(&paths.agent_binary())
    })?;
    match agent_binary {
        InstallOutcome::Installed => reporter.success("spire-agent installed"),
        InstallOutcome::AlreadyPresent => reporter.success("spire-agent already installed"),
    }

    let plugins_installed = run_stage(reporter, Stage::InstallPlugins, || {
        ports.installer.install_tree(&paths.plugins())
    })?;
    reporter.success(&format!("installed {plugins_installed} plugin file(s)"));

    let (proxy_enabled, proxy_base_id) =
        run_stage(reporter, Stage::AssembleLaunchDescriptor, || {
            let proxy_enabled = resolver.is_enabled(PROXY_ENABLED)?;
            if proxy_enabled {
                render_proxy_config(resolver, ports.renderer, ports.fs, paths)?;
            }
            let descriptor = assemble(&paths.deps_idx, proxy_enabled, ports.base_ids);
            write_launch_descriptor(&descriptor, ports.renderer, ports.fs, paths)?;
            Ok((proxy_enabled, descriptor.proxy_base_id()))
        })?;
    match proxy_base_id {
        Some(base_id) => {
            reporter.success(&format!("launch descriptor written with proxy (base id {base_id})"));
        }
        None => reporter.success("launch descriptor written"),
    }

    let setup = run_stage(reporter, Stage::Setup, || setup(ports.fs, paths))?;
    reporter.success("setup complete");

    Ok(SupplyReport {
        certificates_installed,
        agent_binary,
        plugins_installed,
        proxy_enabled,
        proxy_base_id,
        setup,
    })
}

fn run_stage<T>(
    reporter: &impl ProgressReporter,
    stage: Stage,
    body: impl FnOnce() -> Result<T>,
) -> Result<T> {
    reporter.step(&format!("{stage}..."));
    body()
        .inspect_err(|err| error!(%stage, error = %format!("{err:#}"), "stage failed"))
        .context(stage.as_str())
}

/// Auxiliary setup: user override, manifest version lines, `logs/`.
///
/// # Errors
///
/// `SetupError` when `buildpack.yml` is malformed, the manifest cannot be
/// read, or `logs/` cannot be created. An existing `logs/` is fine only
/// when it is a directory.
pub fn setup(fs: &impl LocalFs, paths: &SupplyPaths) -> Result<SetupOutcome> {
    let user_config_path = paths.user_config();
    let user_config = if fs.exists(&user_config_path) {
        let content = fs
            .read_to_string(&user_config_path)
            .map_err(|e| SupplyError::SetupError(format!("{e:#}")))?;
        let config = BuildpackConfig::from_yaml(&content).map_err(|e| {
            SupplyError::SetupError(format!("cannot parse {}: {e}", user_config_path.display()))
        })?;
        info!(version = %config.spire_agent.version, dist = %config.dist, "loaded buildpack.yml");
        Some(config)
    } else {
        None
    };

    let manifest_path = paths.manifest();
    let content = fs
        .read_to_string(&manifest_path)
        .map_err(|e| SupplyError::SetupError(format!("{e:#}")))?;
    let manifest = BuildpackManifest::from_yaml(&content).map_err(|e| {
        SupplyError::SetupError(format!("cannot parse {}: {e}", manifest_path.display()))
    })?;

    let logs_dir = paths.logs_dir();
    let logs_dir_created = match fs.create_dir(&logs_dir) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::AlreadyExists && fs.is_dir(&logs_dir) => false,
        Err(e) => {
            return Err(SupplyError::SetupError(format!(
                "could not create 'logs' directory {}: {e}",
                logs_dir.display()
            ))
            .into());
        }
    };

    Ok(SetupOutcome {
        user_config,
        version_lines: manifest.version_lines,
        logs_dir_created,
    })
}
