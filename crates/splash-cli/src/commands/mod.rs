pub mod compile;
pub mod disasm;
pub mod run;
pub mod tokens;

use anyhow::{Context, Result};
use splash_config::{Config, ConfigLoader};

/// Load splash.toml / global config starting from the working directory
pub fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    ConfigLoader::new()
        .load_from_directory(&cwd)
        .context("Failed to load configuration")
}
