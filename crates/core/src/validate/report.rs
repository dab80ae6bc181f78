//! Per-line and per-file validation results.

use std::fmt;

use serde::Serialize;

use crate::isa::format::Format;
use crate::validate::assembler::AssemblerVerdict;
use crate::validate::issue::{ValidationError, ValidationWarning};
use crate::validate::line::LineKind;

/// Outcome of validating one line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineResult {
    /// Classification.
    pub kind: LineKind,
    /// No errors were found.
    pub valid: bool,
    /// Mnemonic, label or directive name.
    pub instruction: Option<String>,
    /// Format the operands were checked against.
    pub format: Option<Format>,
    /// Operand tokens in order.
    pub operands: Vec<String>,
    /// Errors.
    pub errors: Vec<ValidationError>,
    /// Warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl LineResult {
    pub(crate) fn new(kind: LineKind) -> Self {
        Self {
            kind,
            valid: true,
            instruction: None,
            format: None,
            operands: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// A finding tagged with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tagged<T> {
    /// Line number.
    pub line: usize,
    /// Finding.
    #[serde(flatten)]
    pub issue: T,
}

impl<T: fmt::Display> fmt::Display for Tagged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}: {}", self.line, self.issue)
    }
}

/// Aggregate result for a whole source buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path or stream name.
    pub source: String,
    /// Lines in the buffer.
    pub total_lines: usize,
    /// Lines that are neither empty nor labels (directives included).
    pub instruction_lines: usize,
    /// Instruction lines without errors.
    pub valid_instructions: usize,
    /// Every error with its line.
    pub errors: Vec<Tagged<ValidationError>>,
    /// Every warning with its line.
    pub warnings: Vec<Tagged<ValidationWarning>>,
    /// Assembler verdict, when the oracle was consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembler: Option<AssemblerVerdict>,
}

impl FileReport {
    /// No line errors and the assembler (if consulted) did not reject the buffer.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !matches!(self.assembler, Some(AssemblerVerdict::Rejected { .. }))
    }

    /// Process exit code: 0 when valid, 1 otherwise. Warnings never matter.
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() { 0 } else { 1 }
    }
}
