//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()`. The parameter environment is captured here;
//! commands and services only ever see the snapshot. `NO_COLOR` and
//! `BUILDPACK_DIR` reach the program as clap arguments, and the log filter
//! `SPIRE_SUPPLY_LOG` is read by `logging::init`.

use crate::infra::env::EnvSnapshot;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable build log output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Environment captured at startup.
    pub env: EnvSnapshot,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags, capturing the
    /// process environment.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        Self::with_env(flags, EnvSnapshot::capture())
    }

    /// Construct an `AppContext` around an explicit environment snapshot.
    ///
    /// JSON mode silences progress lines so stdout stays parseable.
    #[must_use]
    pub fn with_env(flags: &OutputFlags, env: EnvSnapshot) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            env,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}
