//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need the variant walk the chain with
//! `anyhow::Error::chain` and `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

// ── Supply errors ─────────────────────────────────────────────────────────────

/// Failures of the sidecar supply pipeline.
#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("required parameter '{key}' is not set in the service binding or the environment")]
    MissingParameter { key: String },

    /// Recovered inside the resolver by falling back to the environment.
    #[error("service binding unavailable: {0}")]
    BindingUnavailable(String),

    #[error("failed to install {}", path.display())]
    InstallFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template {}: {reason}", path.display())]
    TemplateError { path: PathBuf, reason: String },

    #[error("setup failed: {0}")]
    SetupError(String),
}

impl SupplyError {
    /// Find the first `SupplyError` in an `anyhow` error chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&SupplyError> {
        err.chain().find_map(|cause| cause.downcast_ref::<SupplyError>())
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors in the arguments handed over by the build tool.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid dependency index '{0}': must be a non-negative integer")]
    InvalidDepsIndex(String),

    #[error("Cannot locate the buildpack directory. Pass --buildpack-dir or set BUILDPACK_DIR.")]
    BuildpackDirUnknown,
}
