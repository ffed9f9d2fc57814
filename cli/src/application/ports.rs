//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::domain::{InstallOutcome, InstallTarget};

// ── Parameter Source Port ─────────────────────────────────────────────────────

/// One link in the credential resolver chain.
pub trait ParameterSource {
    /// Short label used in log events, e.g. `"service-binding"`.
    fn name(&self) -> &'static str;

    /// Look up `key`.
    ///
    /// Returns `Ok(None)` when the source does not hold the key.
    ///
    /// # Errors
    ///
    /// `SupplyError::BindingUnavailable` when the source itself cannot be
    /// read; the resolver moves on to the next source. Any other error aborts
    /// the lookup.
    fn try_resolve(&self, key: &str) -> Result<Option<String>>;
}

// ── Artifact Installer Port ───────────────────────────────────────────────────

/// Copies artifacts from the dependency cache into the build output.
pub trait ArtifactInstaller {
    /// Install a single binary unless the destination already exists.
    ///
    /// # Errors
    ///
    /// `SupplyError::InstallFailed` on any read or write failure.
    fn install_binary(&self, target: &InstallTarget) -> Result<InstallOutcome>;

    /// Mirror every regular file below `target.source` into
    /// `target.destination`, returning the number of files copied.
    ///
    /// # Errors
    ///
    /// `SupplyError::InstallFailed` naming the first file that failed.
    fn install_tree(&self, target: &InstallTarget) -> Result<usize>;
}

// ── Template Renderer Port ────────────────────────────────────────────────────

/// Renders a template file with a serializable context.
pub trait TemplateRenderer {
    /// Render the template at `template` into `out`.
    ///
    /// Optional context fields that serialize as absent must suppress their
    /// guarded sections rather than fail.
    ///
    /// # Errors
    ///
    /// `SupplyError::TemplateError` when the template is missing, unreadable
    /// or malformed.
    fn render<T: Serialize>(
        &self,
        template: &Path,
        context: &T,
        out: &mut dyn Write,
    ) -> Result<()>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Raw filesystem operations used by the services.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create (or truncate) a file for writing, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error with the path attached.
    fn create_file(&self, path: &Path) -> Result<Box<dyn Write>>;

    /// # Errors
    ///
    /// Returns the I/O error with the path attached.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create a single directory. The raw I/O error is returned so callers
    /// can tell `AlreadyExists` apart from real failures.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error unchanged.
    fn create_dir(&self, path: &Path) -> std::io::Result<()>;
}

// ── Randomness Port ───────────────────────────────────────────────────────────

/// Source of the proxy base id.
pub trait BaseIdSource {
    /// A value inside `domain::launch::BASE_ID_RANGE`.
    fn next_base_id(&self) -> u32;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
