//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{ProjectConfig, RunConfig, PROJECT_CONFIG_FILE};
use crate::ConfigResult;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable enabling tracing
pub const ENV_TRACE: &str = "SPLASH_TRACE";
/// Environment variable enabling strict labels
pub const ENV_STRICT_LABELS: &str = "SPLASH_STRICT_LABELS";
/// Environment variable holding the input literal
pub const ENV_INPUT: &str = "SPLASH_INPUT";

/// Input used when no source provides one
pub const DEFAULT_INPUT: &str = "-1";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.splash/config.toml) - lowest priority
/// 2. Project config (./splash.toml) - overrides global
/// 3. Environment variables (SPLASH_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration, with environment overrides applied
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where splash.toml was found)
    pub project_root: Option<PathBuf>,
}

/// Effective execution settings after merging every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub trace: bool,
    pub strict_labels: bool,
    /// Input literal in source syntax
    pub input: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            trace: false,
            strict_labels: false,
            input: DEFAULT_INPUT.to_string(),
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.splash/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find splash.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config()?;
        let project_config = apply_env_overrides(project_config);

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = apply_env_overrides(project_config);

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        for dir in start_dir.ancestors() {
            let config_path = dir.join(PROJECT_CONFIG_FILE);
            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(dir.to_path_buf()), project_config));
            }
        }

        // Reached filesystem root without finding splash.toml
        Ok((None, ProjectConfig::default()))
    }

    /// Load global configuration
    ///
    /// A missing file (or home directory) yields the default config; a file
    /// that exists but does not parse is an error.
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            self.global_config_path = GlobalConfig::global_config_path().ok();
        }

        match &self.global_config_path {
            Some(path) if path.exists() => GlobalConfig::load_from_file(path),
            _ => Ok(GlobalConfig::default()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply SPLASH_* environment variables to the project's run settings
fn apply_env_overrides(mut config: ProjectConfig) -> ProjectConfig {
    if let Ok(trace) = env::var(ENV_TRACE) {
        config.run_mut().trace = Some(parse_bool(&trace));
    }

    if let Ok(strict) = env::var(ENV_STRICT_LABELS) {
        config.run_mut().strict_labels = Some(parse_bool(&strict));
    }

    if let Ok(input) = env::var(ENV_INPUT) {
        if !input.trim().is_empty() {
            config.run_mut().input = Some(input);
        }
    }

    config
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Merged run settings (global defaults < project < environment)
    pub fn resolved_run(&self) -> RunSettings {
        let mut merged = RunConfig::default();
        if let Some(defaults) = &self.global.defaults {
            merged.merge(defaults);
        }
        if let Some(run) = &self.project.run {
            merged.merge(run);
        }

        let fallback = RunSettings::default();
        RunSettings {
            trace: merged.trace.unwrap_or(fallback.trace),
            strict_labels: merged.strict_labels.unwrap_or(fallback.strict_labels),
            input: merged.input.unwrap_or(fallback.input),
        }
    }

    /// Output directory for compiled programs, resolved against the project root
    pub fn out_dir(&self) -> Option<PathBuf> {
        let dir = self.project.out_dir()?;
        Some(match &self.project_root {
            Some(root) if dir.is_relative() => root.join(dir),
            _ => dir.to_path_buf(),
        })
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Get the package name
    pub fn package_name(&self) -> Option<&str> {
        self.project.package_name()
    }

    /// Check if this is a project (has splash.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
