//! Parameter keys and the typed template contexts built from them.

use serde::Serialize;

// ── Keys ─────────────────────────────────────────────────────────────────────

pub const SERVER_ADDRESS: &str = "SPIRE_SERVER_ADDRESS";
pub const SERVER_PORT: &str = "SPIRE_SERVER_PORT";
pub const TRUST_DOMAIN: &str = "SPIRE_TRUST_DOMAIN";
pub const APP_SPIFFE_ID: &str = "SPIRE_APP_SPIFFE_ID";
pub const PROXY_ENABLED: &str = "SPIRE_PROXY_ENABLED";
pub const SVID_STORE_ENABLED: &str = "SPIRE_SVID_STORE_ENABLED";
pub const AGENT_LOG_LEVEL: &str = "SPIRE_AGENT_LOG_LEVEL";

pub const DEFAULT_AGENT_LOG_LEVEL: &str = "INFO";

/// Every key the pipeline may look up.
pub const ALL_KEYS: &[&str] = &[
    SERVER_ADDRESS,
    SERVER_PORT,
    TRUST_DOMAIN,
    APP_SPIFFE_ID,
    PROXY_ENABLED,
    SVID_STORE_ENABLED,
    AGENT_LOG_LEVEL,
];

/// A feature flag is on only for the string `true`, in any letter case.
#[must_use]
pub fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

// ── Template contexts ────────────────────────────────────────────────────────

/// Values substituted into the agent configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentParameters {
    pub server_address: String,
    pub server_port: String,
    pub trust_domain: String,
    pub log_level: String,
    pub deps_idx: String,
    /// `Some(true)` renders the SVID store block; `None` leaves it out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svid_store: Option<bool>,
}

/// Values substituted into the proxy configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyParameters {
    pub app_spiffe_id: String,
    pub trust_domain: String,
    pub deps_idx: String,
}
