//! Rendering of the agent and proxy configuration files.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::application::ports::{LocalFs, TemplateRenderer};
use crate::application::resolver::CredentialResolver;
use crate::domain::layout::{AGENT_CONF_TEMPLATE, PROXY_CONF_TEMPLATE};
use crate::domain::params::{
    AGENT_LOG_LEVEL, APP_SPIFFE_ID, DEFAULT_AGENT_LOG_LEVEL, SERVER_ADDRESS, SERVER_PORT,
    SVID_STORE_ENABLED, TRUST_DOMAIN,
};
use crate::domain::{AgentParameters, ProxyParameters, SupplyPaths};

/// Resolve the agent configuration values.
///
/// # Errors
///
/// `MissingParameter` when the server address, port or trust domain is absent.
pub fn agent_parameters(resolver: &CredentialResolver, deps_idx: &str) -> Result<AgentParameters> {
    Ok(AgentParameters {
        server_address: resolver.resolve_required(SERVER_ADDRESS)?,
        server_port: resolver.resolve_required(SERVER_PORT)?,
        trust_domain: resolver.resolve_required(TRUST_DOMAIN)?,
        log_level: resolver.resolve_or_default(AGENT_LOG_LEVEL, DEFAULT_AGENT_LOG_LEVEL),
        deps_idx: deps_idx.to_string(),
        svid_store: resolver.is_enabled(SVID_STORE_ENABLED)?.then_some(true),
    })
}

/// Resolve the proxy configuration values.
///
/// # Errors
///
/// `MissingParameter` when the application SPIFFE ID or trust domain is absent.
pub fn proxy_parameters(resolver: &CredentialResolver, deps_idx: &str) -> Result<ProxyParameters> {
    Ok(ProxyParameters {
        app_spiffe_id: resolver.resolve_required(APP_SPIFFE_ID)?,
        trust_domain: resolver.resolve_required(TRUST_DOMAIN)?,
        deps_idx: deps_idx.to_string(),
    })
}

/// Render `template` into a freshly created `destination`, replacing any
/// previous content.
///
/// # Errors
///
/// Fails when the destination cannot be created or the template cannot be
/// rendered.
pub fn render_to_file<T: Serialize>(
    renderer: &impl TemplateRenderer,
    fs: &impl LocalFs,
    template: &Path,
    context: &T,
    destination: &Path,
) -> Result<()> {
    let mut out = fs.create_file(destination)?;
    renderer.render(template, context, &mut out)?;
    out.flush()
        .with_context(|| format!("flushing {}", destination.display()))?;
    Ok(())
}

/// Render `agent.conf`.
///
/// # Errors
///
/// See [`agent_parameters`] and [`render_to_file`].
pub fn render_agent_config(
    resolver: &CredentialResolver,
    renderer: &impl TemplateRenderer,
    fs: &impl LocalFs,
    paths: &SupplyPaths,
) -> Result<AgentParameters> {
    let params = agent_parameters(resolver, &paths.deps_idx)?;
    let destination = paths.agent_conf();
    render_to_file(
        renderer,
        fs,
        &paths.template(AGENT_CONF_TEMPLATE),
        &params,
        &destination,
    )?;
    info!(
        path = %destination.display(),
        server = %format!("{}:{}", params.server_address, params.server_port),
        trust_domain = %params.trust_domain,
        svid_store = params.svid_store.is_some(),
        "agent configuration rendered"
    );
    Ok(params)
}

/// Render `proxy.conf`.
///
/// # Errors
///
/// See [`proxy_parameters`] and [`render_to_file`].
pub fn render_proxy_config(
    resolver: &CredentialResolver,
    renderer: &impl TemplateRenderer,
    fs: &impl LocalFs,
    paths: &SupplyPaths,
) -> Result<ProxyParameters> {
    let params = proxy_parameters(resolver, &paths.deps_idx)?;
    let destination = paths.proxy_conf();
    render_to_file(
        renderer,
        fs,
        &paths.template(PROXY_CONF_TEMPLATE),
        &params,
        &destination,
    )?;
    info!(
        path = %destination.display(),
        app_spiffe_id = %params.app_spiffe_id,
        "proxy configuration rendered"
    );
    Ok(params)
}
