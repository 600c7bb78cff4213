//! Project Configuration (splash.toml)
//!
//! Handles project-level configuration stored in `splash.toml` at the project root.

use crate::{read_toml, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const PROJECT_CONFIG_FILE: &str = "splash.toml";

/// Project configuration from splash.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageConfig>,

    /// Execution settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfig>,

    /// Compilation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileConfig>,
}

/// Package metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Package description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Execution settings
///
/// Used both for `[run]` in splash.toml and `[defaults]` in the global config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RunConfig {
    /// Emit the stack and each instruction before it runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<bool>,

    /// Treat `GOTO` to an undefined label as an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_labels: Option<bool>,

    /// Literal pushed by `INPUT`, in source syntax (e.g. `42`, `"name"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

/// Compilation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CompileConfig {
    /// Directory for compiled `.scb` files, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(pkg) = &self.package {
            if pkg.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "package.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
        }

        if let Some(run) = &self.run {
            run.validate("run")?;
        }

        Ok(())
    }

    /// Get the package name, if present
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// Get the compile output directory, if present
    pub fn out_dir(&self) -> Option<&Path> {
        self.compile.as_ref().and_then(|c| c.out_dir.as_deref())
    }

    /// Run settings, creating an empty section if absent
    pub fn run_mut(&mut self) -> &mut RunConfig {
        self.run.get_or_insert_with(RunConfig::default)
    }
}

impl RunConfig {
    /// Check values that TOML typing alone does not rule out
    pub fn validate(&self, section: &str) -> ConfigResult<()> {
        if let Some(input) = &self.input {
            if input.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.input", section),
                    reason: "input cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge another run config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &RunConfig) {
        if other.trace.is_some() {
            self.trace = other.trace;
        }
        if other.strict_labels.is_some() {
            self.strict_labels = other.strict_labels;
        }
        if other.input.is_some() {
            self.input = other.input.clone();
        }
    }
}
