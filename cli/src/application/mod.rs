//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod resolver;
pub mod services;

pub use ports::{
    ArtifactInstaller, BaseIdSource, LocalFs, ParameterSource, ProgressReporter, TemplateRenderer,
};
pub use resolver::CredentialResolver;
