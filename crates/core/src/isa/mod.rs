//! Instruction Set Architecture (ISA) handling.
//!
//! Contains the bit-field extraction helpers, the structural format classifier,
//! the instruction catalog and the word decoder built on top of them.
//!
//! # Data flow
//!
//! * `catalog`: Loads and validates instruction definitions once.
//! * `format`: Infers R/I/S/B/U/J/C/Unknown from a definition or a bare name.
//! * `decode`: Matches a raw 32-bit word against the catalog.

/// Instruction catalog (definitions, operand constraints, lookup).
pub mod catalog;

/// Word decoder producing known/unknown results.
pub mod decode;

/// Structural formats and the classification ladder.
pub mod format;

/// Bit-field extraction and encoding utilities.
pub mod instruction;
