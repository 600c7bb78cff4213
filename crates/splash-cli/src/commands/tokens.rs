//! Tokens command - dump the resolved program as JSON

use anyhow::{Context, Result};
use splash_runtime::Splash;
use std::path::Path;

/// Print the resolved program (tokens, labels, stack) as pretty JSON
pub fn run(file: &Path) -> Result<()> {
    let program = Splash::new()
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let json = program
        .to_json()
        .context("Failed to serialize program")?;
    println!("{}", json);
    Ok(())
}
