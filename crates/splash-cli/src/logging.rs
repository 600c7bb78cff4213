//! Logging setup
//!
//! Events go to stderr so they never mix with program output. `RUST_LOG`
//! takes precedence over the command-line verbosity.

use tracing_subscriber::{fmt, EnvFilter};

/// How much runtime detail to log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings only
    Quiet,
    /// Tokens and labels as they are registered (`--debug`)
    Debug,
    /// Every executed instruction with the stack (`--trace`)
    Trace,
}

impl Verbosity {
    /// Verbosity selected by the `--debug` / `--trace` flags
    pub fn from_flags(debug: bool, trace: bool) -> Self {
        if trace {
            Verbosity::Trace
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Quiet
        }
    }

    /// Default filter directive for this verbosity
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Debug => "warn,splash_runtime=debug",
            Verbosity::Trace => "warn,splash_runtime=trace",
        }
    }
}

/// Install the global subscriber
pub fn init(verbosity: Verbosity, ansi: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();
}
