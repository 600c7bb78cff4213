//! Compile command - resolve a source file and write it as `.scb`

use anyhow::{Context, Result};
use splash_runtime::{Splash, PROGRAM_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the compiled program is written
///
/// An explicit output path wins; otherwise the file name is kept with the
/// `.scb` extension, placed in `out_dir` when one is configured.
pub fn output_path(file: &Path, output: Option<&Path>, out_dir: Option<&Path>) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    let compiled = file.with_extension(PROGRAM_EXTENSION);
    match (out_dir, compiled.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => compiled,
    }
}

/// Compile a Splash file
pub fn run(file: &Path, output: Option<&Path>, out_dir: Option<&Path>) -> Result<PathBuf> {
    let runtime = Splash::new();
    let program = runtime
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let target = output_path(file, output, out_dir);
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    runtime
        .save_program(&program, &target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    tracing::debug!(tokens = program.len(), output = %target.display(), "compiled");
    println!("Compiled {} -> {}", file.display(), target.display());

    Ok(target)
}
