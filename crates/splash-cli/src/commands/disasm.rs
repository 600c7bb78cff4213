//! Disasm command - print a program listing

use anyhow::{Context, Result};
use splash_runtime::{disassemble, Splash};
use std::path::Path;

/// Print the disassembly of a source or compiled file
pub fn run(file: &Path) -> Result<()> {
    let program = Splash::new()
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    print!("{}", disassemble(&program));
    Ok(())
}
