//! RISC-V instruction analysis library.
//!
//! This crate implements the codec and constraint engine behind the `rvprofile` tool:
//! 1. **Catalog:** Immutable instruction definitions loaded once from structured data.
//! 2. **ISA:** Bit-field extraction, format classification and word decoding.
//! 3. **Profiles:** Resolution of the execution profiles able to run an extension set.
//! 4. **Generation:** Seedable random operand generation and assembly rendering.
//! 5. **Validation:** Line and file level assembly checks with an optional assembler oracle.
//!
//! The catalog and profile database are plain values constructed by the caller and
//! shared by reference; nothing in the crate keeps global state.

/// Shared constants, error types and serde helpers.
pub mod common;
/// Tool configuration (catalog loading, generator seed, assembler oracle).
pub mod config;
/// Instruction set handling (bit fields, formats, catalog, decoder).
pub mod isa;
/// Profile database and extension-set compatibility.
pub mod profile;
/// Random test-case generation from catalog constraints.
pub mod generate;
/// Assembly text validation.
pub mod validate;
/// Front-end operations combining decoder and profile resolver.
pub mod analyze;

/// Front-end entry point; borrow a catalog and a profile database.
pub use crate::analyze::Analyzer;
/// Crate-wide error type and result alias.
pub use crate::common::error::{Error, Result};
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Instruction catalog; construct with `Catalog::builtin` or `Catalog::from_json_str`.
pub use crate::isa::catalog::Catalog;
/// Word decoder and its result type.
pub use crate::isa::decode::{Decoded, Decoder};
/// Structural instruction format.
pub use crate::isa::format::Format;
/// Random test-case generator.
pub use crate::generate::Generator;
/// Profile database; construct with `ProfileDatabase::builtin` or from JSON.
pub use crate::profile::ProfileDatabase;
/// Assembly validator.
pub use crate::validate::Validator;
