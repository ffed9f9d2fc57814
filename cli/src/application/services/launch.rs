//! Launch descriptor assembly and streaming.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{BaseIdSource, LocalFs, TemplateRenderer};
use crate::domain::launch::LAUNCH_HEADER;
use crate::domain::{LaunchDescriptor, SupplyPaths};

/// Build the process list: the agent always, the proxy when enabled.
///
/// The base id is only drawn when the proxy entry is added.
#[must_use]
pub fn assemble(
    deps_idx: &str,
    proxy_enabled: bool,
    base_ids: &impl BaseIdSource,
) -> LaunchDescriptor {
    let descriptor = LaunchDescriptor::agent_only(deps_idx);
    if proxy_enabled {
        descriptor.with_proxy(base_ids.next_base_id())
    } else {
        descriptor
    }
}

/// Write `launch.yml`: the header line, then one rendered block per entry,
/// streamed into the same open file.
///
/// # Errors
///
/// Fails when the file cannot be created or written, or a process template
/// cannot be rendered.
pub fn write_launch_descriptor(
    descriptor: &LaunchDescriptor,
    renderer: &impl TemplateRenderer,
    fs: &impl LocalFs,
    paths: &SupplyPaths,
) -> Result<()> {
    let destination = paths.launch_descriptor();
    let mut out = fs.create_file(&destination)?;
    writeln!(out, "{LAUNCH_HEADER}")
        .with_context(|| format!("writing {}", destination.display()))?;

    for entry in descriptor.entries() {
        debug!(process = entry.name, "rendering process entry");
        renderer.render(
            &paths.template(entry.template_name()),
            &entry.context(),
            &mut out,
        )?;
    }

    out.flush()
        .with_context(|| format!("flushing {}", destination.display()))?;
    info!(
        path = %destination.display(),
        processes = descriptor.entries().len(),
        "launch descriptor written"
    );
    Ok(())
}
