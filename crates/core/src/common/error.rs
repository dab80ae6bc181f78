//! Error types for every component.
//!
//! Each component reports through its own enum:
//! 1. **Catalog / Profiles / Config:** Load-time failures; malformed data fails fast.
//! 2. **Decode:** Malformed input text or byte slices. A word that matches no catalog
//!    entry is not an error; it decodes to [`Decoded::Unknown`](crate::isa::decode::Decoded).
//! 3. **Generate:** Unknown instructions and empty operand domains.
//! 4. **Assembler:** I/O failures around the external assembler. A missing binary is
//!    a verdict, not an error.
//!
//! Per-line validation findings are report data and live in
//! [`validate::issue`](crate::validate::issue).

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::isa::catalog::EncodingKey;
use crate::isa::format::Format;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while building an [`Catalog`](crate::isa::catalog::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read instruction catalog '{path}': {source}")]
    Read {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document is not a JSON object of extension objects.
    #[error("malformed instruction catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// One instruction record has the wrong shape.
    #[error("{extension}/{instruction}: malformed record: {source}")]
    Record {
        /// Extension the record belongs to.
        extension: String,
        /// Instruction name.
        instruction: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A numeric encoding field does not fit its bit width.
    #[error("{extension}/{instruction}: {field} value {value:#x} does not fit in {bits} bits")]
    FieldWidth {
        /// Extension the record belongs to.
        extension: String,
        /// Instruction name.
        instruction: String,
        /// Field name (`opcode`, `funct3`, `funct7`).
        field: &'static str,
        /// Declared value.
        value: u32,
        /// Field width in bits.
        bits: u32,
    },

    /// The format tag is not one of R/I/S/B/U/J/C/Unknown.
    #[error("{extension}/{instruction}: unknown format '{format}'")]
    UnknownFormat {
        /// Extension the record belongs to.
        extension: String,
        /// Instruction name.
        instruction: String,
        /// Declared format text.
        format: String,
    },

    /// A declared bit range is not `msb..lsb` or a single bit within 0..=31.
    #[error("{extension}/{instruction}: malformed bit range '{range}'")]
    BitRange {
        /// Extension the record belongs to.
        extension: String,
        /// Instruction name.
        instruction: String,
        /// Declared range text.
        range: String,
    },

    /// Operand constraints are unusable (bad kind, inverted or empty domain).
    #[error("{extension}/{instruction}: operand '{parameter}': {reason}")]
    Constraint {
        /// Extension the record belongs to.
        extension: String,
        /// Instruction name.
        instruction: String,
        /// Operand role name.
        parameter: String,
        /// Human readable reason.
        reason: String,
    },

    /// The same mnemonic appears twice in one extension.
    #[error("{extension}: instruction '{instruction}' is defined twice")]
    DuplicateInstruction {
        /// Extension containing the duplicate.
        extension: String,
        /// Duplicated mnemonic.
        instruction: String,
    },

    /// Two definitions in one extension share an encoding (strict loading only).
    #[error("{extension}: '{first}' and '{second}' share encoding {key}")]
    DuplicateEncoding {
        /// Extension containing both definitions.
        extension: String,
        /// Definition declared first.
        first: String,
        /// Definition declared second.
        second: String,
        /// Shared (opcode, funct3, funct7) key.
        key: EncodingKey,
    },
}

/// Failures while loading or querying a [`ProfileDatabase`](crate::profile::ProfileDatabase).
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile file could not be read.
    #[error("failed to read profile database '{path}': {source}")]
    Read {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document does not match the profile database shape.
    #[error("malformed profile database: {0}")]
    Parse(#[from] serde_json::Error),

    /// No profile with that name exists.
    #[error("profile '{0}' not found")]
    UnknownProfile(String),
}

/// Malformed decoder input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DecodeError {
    /// The text is not a hexadecimal 32-bit value.
    #[error("invalid hexadecimal instruction '{input}': {reason}")]
    InvalidHex {
        /// Offending input (trimmed).
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A byte slice was not exactly one instruction word long.
    #[error("expected 4 instruction bytes, got {0}")]
    ByteLength(usize),
}

/// Failures while generating test cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The requested mnemonic is not in the catalog.
    #[error("instruction '{0}' not found")]
    UnknownInstruction(String),

    /// Every value of a register range is excluded.
    #[error("{instruction}: no register left for '{parameter}' in [{min}, {max}] after exclusions")]
    EmptyRegisterDomain {
        /// Instruction being generated.
        instruction: String,
        /// Operand role name.
        parameter: String,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// No catalog instruction resolves to the requested format.
    #[error("no instructions found for format {0}")]
    NoInstructionsForFormat(Format),
}

/// I/O failures around the external assembler.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// Preparing the scratch directory or input file failed.
    #[error("failed to prepare assembler input: {0}")]
    Scratch(#[source] io::Error),

    /// The assembler exists but could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Resolved assembler path.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Failures while loading a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration document is malformed.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Umbrella error for callers that drive several components.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog loading failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Profile loading or lookup failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Decoder input was malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Test-case generation failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// The external assembler could not be driven.
    #[error(transparent)]
    Assembler(#[from] AssemblerError),

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A top-level input file could not be read.
    #[error("failed to read '{path}': {source}")]
    Input {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}
