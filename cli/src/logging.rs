//! Diagnostic logging setup.
//!
//! Progress for the build log goes through `ProgressReporter`; this is the
//! `tracing` side, written to stderr and silent below `warn` unless
//! `SPIRE_SUPPLY_LOG` asks for more.

use anyhow::{Context, Result};
use console::Term;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV: &str = "SPIRE_SUPPLY_LOG";

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init(no_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(use_ansi(no_color, Term::stderr().is_term()));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

/// Escape codes only go to an interactive stderr; build logs stay plain.
fn use_ansi(no_color: bool, stderr_is_term: bool) -> bool {
    !no_color && stderr_is_term
}
