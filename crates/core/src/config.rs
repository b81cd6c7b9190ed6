//! Generator configuration.
//!
//! Read from `goapi.toml` when present; every key is optional and falls back
//! to the defaults below. The CLI overrides individual keys from flags.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::GenerateError;

/// Config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "goapi.toml";

const DEFAULT_VALIDATOR_IMPORT: &str = "github.com/go-playground/validator/v10";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Go package clause of the generated file.
    pub package: String,
    /// Module path prefix whose imports form the first-party tier.
    pub local_prefix: String,
    /// Wrap optional scalar fields in pointers.
    pub use_pointers: bool,
    /// Name of the business interface.
    pub service_interface: String,
    /// Name of the HTTP adapter struct.
    pub handler_struct: String,
    /// Import path of the validator package.
    pub validator_import: String,
    /// Appended to the document stem to form the output filename.
    pub file_suffix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: "api".to_string(),
            local_prefix: String::new(),
            use_pointers: true,
            service_interface: "Service".to_string(),
            handler_struct: "Handler".to_string(),
            validator_import: DEFAULT_VALIDATOR_IMPORT.to_string(),
            file_suffix: ".gen.go".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a TOML config.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, GenerateError> {
        toml::from_str(contents).map_err(|err| GenerateError::Config {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let contents = fs::read_to_string(path).map_err(|err| GenerateError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read config file: {err}"),
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Load `goapi.toml` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, GenerateError> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Package name of the validator import (last path segment, minus a
    /// major-version suffix).
    pub fn validator_package(&self) -> &str {
        let mut segments = self.validator_import.rsplit('/');
        let last = segments.next().unwrap_or(&self.validator_import);
        let is_major_version = last.len() > 1
            && last.starts_with('v')
            && last[1..].chars().all(|c| c.is_ascii_digit());
        if is_major_version {
            segments.next().unwrap_or(last)
        } else {
            last
        }
    }
}
