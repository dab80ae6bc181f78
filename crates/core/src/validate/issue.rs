//! Validation findings.
//!
//! Errors make a line invalid; warnings never do.

use serde::Serialize;
use thiserror::Error;

use crate::isa::format::Format;

/// A finding that makes a line invalid.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// The mnemonic is neither in the catalog nor a known pseudo-instruction.
    #[error("unknown instruction: {mnemonic}")]
    UnknownMnemonic {
        /// Offending mnemonic.
        mnemonic: String,
    },

    /// A register operand is not `x<digits>`.
    #[error("invalid {role} operand '{token}' (expected x0..x31)")]
    MalformedRegister {
        /// Operand role.
        role: String,
        /// Offending token.
        token: String,
    },

    /// A register index is outside the register file or the catalog's bounds.
    #[error("register x{index} for {role} out of range [{min}, {max}]")]
    RegisterOutOfRange {
        /// Operand role.
        role: String,
        /// Parsed index.
        index: u64,
        /// Lowest allowed index.
        min: i64,
        /// Highest allowed index.
        max: i64,
    },

    /// The catalog excludes this register for the role.
    #[error("register x{index} is excluded for {role}")]
    ExcludedRegister {
        /// Operand role.
        role: String,
        /// Parsed index.
        index: u32,
    },

    /// An immediate is neither decimal nor `0x` hexadecimal.
    #[error("invalid immediate '{token}'")]
    MalformedImmediate {
        /// Offending token.
        token: String,
    },

    /// An immediate is outside the format's range.
    #[error("immediate {value} out of range [{min}, {max}] for {format}-type")]
    ImmediateOutOfRange {
        /// Instruction format.
        format: Format,
        /// Parsed value.
        value: i64,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// A branch or jump offset is odd.
    #[error("immediate {value} for {format}-type must be even")]
    MisalignedImmediate {
        /// Instruction format.
        format: Format,
        /// Parsed value.
        value: i64,
    },

    /// The line cannot be split into a mnemonic and operands.
    #[error("invalid syntax: '{text}'")]
    Syntax {
        /// Offending text.
        text: String,
    },
}

/// A finding that leaves the line valid.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Pseudo-instruction; only the mnemonic was checked.
    #[error("pseudo-instruction '{mnemonic}'; partial validation")]
    PseudoInstruction {
        /// Pseudo mnemonic.
        mnemonic: String,
    },

    /// Operand count differs from the format's arity.
    #[error("expected {expected} operands for {format}-type, found {found}")]
    OperandCount {
        /// Instruction format.
        format: Format,
        /// Arity of the format.
        expected: usize,
        /// Operands on the line.
        found: usize,
    },

    /// The destination is `x0`.
    #[error("rd = x0 (write discarded)")]
    DiscardedWrite,

    /// The format could not be determined; operands follow the catalog order.
    #[error("format of '{mnemonic}' is unknown; operands checked in catalog order")]
    UnclassifiedFormat {
        /// Mnemonic.
        mnemonic: String,
    },

    /// An immediate of a free-form instruction lies outside the catalog's bounds.
    #[error("immediate {value} for {role} outside catalog range [{min}, {max}]")]
    ImmediateOutsideCatalogRange {
        /// Operand role.
        role: String,
        /// Parsed value.
        value: i64,
        /// Declared lower bound.
        min: i64,
        /// Declared upper bound.
        max: i64,
    },
}
