//! Domain layer: pure types, constants and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod error;
pub mod launch;
pub mod layout;
pub mod params;
pub mod supply;

pub use error::{ConfigError, SupplyError};
pub use launch::{LaunchDescriptor, ProcessEntry, ProcessKind};
pub use layout::{InstallTarget, SupplyPaths};
pub use params::{AgentParameters, ProxyParameters, is_truthy};
pub use supply::{InstallOutcome, SetupOutcome, Stage, SupplyReport};
