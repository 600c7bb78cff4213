//! Run command - execute Splash source or compiled files

use anyhow::{Context, Result};
use splash_config::RunSettings;
use splash_runtime::{parse_value, ExecOptions, Splash};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for `splash run`
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub file: PathBuf,
    /// Input literal; overrides configuration
    pub input: Option<String>,
    pub trace: bool,
    pub strict_labels: bool,
    /// Do not print the final value
    pub quiet: bool,
}

impl RunArgs {
    /// Execution options after applying CLI flags on top of configuration
    pub fn options(&self, settings: &RunSettings) -> ExecOptions {
        ExecOptions {
            trace: self.trace || settings.trace,
            strict_labels: self.strict_labels || settings.strict_labels,
        }
    }

    /// Input literal after applying the CLI flag on top of configuration
    pub fn input_text<'a>(&'a self, settings: &'a RunSettings) -> &'a str {
        self.input.as_deref().unwrap_or(&settings.input)
    }
}

/// Run a Splash file
///
/// `.scb` files are decoded; anything else is tokenized and resolved first.
/// Prints program output as it happens, then the final value, then timing.
pub fn run(args: &RunArgs, settings: &RunSettings) -> Result<()> {
    let input_text = args.input_text(settings);
    let input = parse_value(input_text)
        .with_context(|| format!("Invalid input value `{}`", input_text))?;

    let runtime = Splash::new().with_options(args.options(settings));
    let mut program = runtime
        .load_file(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    tracing::debug!(file = %args.file.display(), %input, "running");

    let started = Instant::now();
    let result = runtime
        .run_program(&mut program, input)
        .with_context(|| format!("Failed to run {}", args.file.display()))?;
    let elapsed = started.elapsed();

    if !args.quiet {
        if let Some(value) = result {
            println!("{}", value);
        }
    }
    println!("\n[Done {:.2}ms]", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
