//! Launch descriptor model: the processes the platform starts next to the app.

use std::ops::Range;

use serde::Serialize;

use crate::domain::layout::{AGENT_PROCESS_TEMPLATE, PROXY_PROCESS_TEMPLATE};

/// First line of `launch.yml`; every process template renders one block below it.
pub const LAUNCH_HEADER: &str = "processes:";

/// Range the proxy base id is drawn from.
pub const BASE_ID_RANGE: Range<u32> = 1..65_000;

pub const AGENT_PROCESS: &str = "spire-agent";
pub const PROXY_PROCESS: &str = "spire-proxy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Agent,
    /// The proxy carries a base id so sidecars of different app instances
    /// do not collide on ports.
    Proxy { base_id: u32 },
}

/// One process entry of the launch descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub name: &'static str,
    pub index: String,
    pub kind: ProcessKind,
}

/// Values substituted into a process template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessContext<'a> {
    pub name: &'a str,
    pub deps_idx: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_id: Option<u32>,
}

impl ProcessEntry {
    #[must_use]
    pub fn template_name(&self) -> &'static str {
        match self.kind {
            ProcessKind::Agent => AGENT_PROCESS_TEMPLATE,
            ProcessKind::Proxy { .. } => PROXY_PROCESS_TEMPLATE,
        }
    }

    #[must_use]
    pub fn context(&self) -> ProcessContext<'_> {
        ProcessContext {
            name: self.name,
            deps_idx: &self.index,
            base_id: match self.kind {
                ProcessKind::Agent => None,
                ProcessKind::Proxy { base_id } => Some(base_id),
            },
        }
    }
}

/// Ordered process list; the agent entry is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDescriptor {
    entries: Vec<ProcessEntry>,
}

impl LaunchDescriptor {
    /// A descriptor holding only the agent entry.
    #[must_use]
    pub fn agent_only(deps_idx: &str) -> Self {
        Self {
            entries: vec![ProcessEntry {
                name: AGENT_PROCESS,
                index: deps_idx.to_string(),
                kind: ProcessKind::Agent,
            }],
        }
    }

    /// Append the proxy entry after the agent.
    #[must_use]
    pub fn with_proxy(mut self, base_id: u32) -> Self {
        let index = self.entries[0].index.clone();
        self.entries.push(ProcessEntry {
            name: PROXY_PROCESS,
            index,
            kind: ProcessKind::Proxy { base_id },
        });
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    /// Base id of the proxy entry, if there is one.
    #[must_use]
    pub fn proxy_base_id(&self) -> Option<u32> {
        self.entries.iter().find_map(|e| match e.kind {
            ProcessKind::Proxy { base_id } => Some(base_id),
            ProcessKind::Agent => None,
        })
    }
}
