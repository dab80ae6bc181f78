//! Configuration system for the toolkit.
//!
//! This module defines the configuration structures used to parameterize
//! the components. It provides:
//! 1. **Defaults:** Baseline constants (generation count, assembler binary and target).
//! 2. **Structures:** Catalog loading, generator and validator sections.
//!
//! Configuration is supplied as JSON (`rvprofile --config file.json`); every field is
//! optional, so `Config::default()` and `{}` describe the same setup.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants.
mod defaults {
    /// Test cases generated per instruction when no count is given.
    pub const GENERATE_COUNT: usize = 1;

    /// Assembler used for byte-exact confirmation of validated files.
    pub const ASSEMBLER_PROGRAM: &str = "riscv32-unknown-elf-as";

    /// Target architecture string passed to the assembler as `-march`.
    pub const ASSEMBLER_MARCH: &str = "rv32gc";
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Catalog loading policy.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Random generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Assembly validation settings.
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// Catalog loading policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Reject (instead of flag) two definitions in one extension sharing an
    /// (opcode, funct3, funct7) encoding.
    #[serde(default)]
    pub reject_duplicates: bool,
}

/// Random generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for reproducible output; a fresh seed is drawn (and logged) when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Test cases per instruction.
    #[serde(default = "GeneratorConfig::default_count")]
    pub count: usize,
}

impl GeneratorConfig {
    /// Returns the default number of cases per instruction.
    fn default_count() -> usize {
        defaults::GENERATE_COUNT
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            count: defaults::GENERATE_COUNT,
        }
    }
}

/// Assembly validation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidatorConfig {
    /// External assembler oracle.
    #[serde(default)]
    pub assembler: AssemblerConfig,
}

/// External assembler oracle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblerConfig {
    /// Hand error-free files to the assembler for confirmation.
    #[serde(default)]
    pub enabled: bool,

    /// Assembler binary name or path.
    #[serde(default = "AssemblerConfig::default_program")]
    pub program: String,

    /// Value passed as `-march=`.
    #[serde(default = "AssemblerConfig::default_march")]
    pub march: String,
}

impl AssemblerConfig {
    /// Returns the default assembler binary name.
    fn default_program() -> String {
        defaults::ASSEMBLER_PROGRAM.to_owned()
    }

    /// Returns the default target architecture string.
    fn default_march() -> String {
        defaults::ASSEMBLER_MARCH.to_owned()
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            program: Self::default_program(),
            march: Self::default_march(),
        }
    }
}
