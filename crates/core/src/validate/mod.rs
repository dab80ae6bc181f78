//! Assembly text validation.
//!
//! This module provides:
//! 1. **Line checks:** Classification ([`line`]), mnemonic lookup, format
//!    resolution and operand checks ([`operands`]).
//! 2. **File reports:** Aggregated counts and line-tagged findings ([`report`]).
//! 3. **Oracle:** Optional confirmation by an external assembler ([`assembler`]).
//!
//! Findings are data. Only an unreadable input file is a hard error.

/// External assembler oracle.
pub mod assembler;
/// Validation errors and warnings.
pub mod issue;
/// Line classification.
pub mod line;
/// Operand parsing and checks.
pub mod operands;
/// Line and file results.
pub mod report;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::constants::PSEUDO_INSTRUCTIONS;
use crate::common::error::{AssemblerError, Error, Result};
use crate::config::AssemblerConfig;
use crate::isa::catalog::Catalog;
use crate::isa::format::{self, Format};

pub use assembler::{Assembler, AssemblerVerdict};
pub use issue::{ValidationError, ValidationWarning};
pub use line::LineKind;
pub use report::{FileReport, LineResult, Tagged};

use line::Parsed;

/// Validates assembly against a borrowed catalog.
#[derive(Clone, Debug)]
pub struct Validator<'c> {
    catalog: &'c Catalog,
    assembler: Option<Assembler>,
}

impl<'c> Validator<'c> {
    /// Validator without the assembler oracle.
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            assembler: None,
        }
    }

    /// Enables the assembler oracle when `config.enabled` is set.
    #[must_use]
    pub fn with_assembler(mut self, config: &AssemblerConfig) -> Self {
        self.assembler = config.enabled.then(|| Assembler::new(config));
        self
    }

    /// Validates a single line.
    pub fn validate_line(&self, text: &str) -> LineResult {
        match line::parse(text) {
            Parsed::Empty => LineResult::new(LineKind::Empty),
            Parsed::Label(name) => LineResult {
                instruction: Some(name.to_owned()),
                ..LineResult::new(LineKind::Label)
            },
            Parsed::Directive(body) => {
                let (name, args) = body
                    .split_once(char::is_whitespace)
                    .map_or((body, ""), |(n, a)| (n, a.trim()));
                LineResult {
                    instruction: Some(name.to_owned()),
                    operands: args
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_owned)
                        .collect(),
                    ..LineResult::new(LineKind::Directive)
                }
            }
            Parsed::Malformed(code) => LineResult {
                valid: false,
                errors: vec![ValidationError::Syntax {
                    text: code.to_owned(),
                }],
                ..LineResult::new(LineKind::Unknown)
            },
            Parsed::Instruction { mnemonic, operands } => {
                self.check_instruction(mnemonic, &operands)
            }
        }
    }

    fn check_instruction(&self, mnemonic: String, operands: &[&str]) -> LineResult {
        let mut result = LineResult::new(LineKind::Instruction);
        result.operands = operands.iter().map(|op| (*op).to_owned()).collect();

        let definition = self.catalog.get(&mnemonic);
        if definition.is_none() {
            if PSEUDO_INSTRUCTIONS.contains(&mnemonic.as_str()) {
                result.warnings.push(ValidationWarning::PseudoInstruction {
                    mnemonic: mnemonic.clone(),
                });
            } else {
                result.errors.push(ValidationError::UnknownMnemonic {
                    mnemonic: mnemonic.clone(),
                });
            }
        }

        let resolved = match definition {
            Some(def) => def.resolved_format(),
            None => format::classify(&mnemonic, None),
        };
        if definition.is_some() && resolved == Format::Unknown {
            result.warnings.push(ValidationWarning::UnclassifiedFormat {
                mnemonic: mnemonic.clone(),
            });
        }

        let declared = definition.map_or(&[][..], |def| def.operands.as_slice());
        let findings = operands::check(resolved, operands, declared);
        result.errors.extend(findings.errors);
        result.warnings.extend(findings.warnings);

        result.valid = result.errors.is_empty();
        result.format = Some(resolved);
        result.instruction = Some(mnemonic);
        result
    }

    /// Validates a whole buffer; `source` names it in the report.
    ///
    /// # Errors
    ///
    /// Only when the assembler oracle is enabled and cannot be driven.
    pub fn validate_source(
        &self,
        source: &str,
        text: &str,
    ) -> std::result::Result<FileReport, AssemblerError> {
        let mut report = FileReport {
            source: source.to_owned(),
            total_lines: 0,
            instruction_lines: 0,
            valid_instructions: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            assembler: None,
        };

        for (index, content) in text.lines().enumerate() {
            let line = index + 1;
            let result = self.validate_line(content);
            report.total_lines += 1;
            if result.kind.counts_as_instruction() {
                report.instruction_lines += 1;
                if result.valid {
                    report.valid_instructions += 1;
                }
            }
            report
                .errors
                .extend(result.errors.into_iter().map(|issue| Tagged { line, issue }));
            report
                .warnings
                .extend(result.warnings.into_iter().map(|issue| Tagged { line, issue }));
        }

        if let Some(assembler) = self.assembler.as_ref().filter(|_| report.errors.is_empty()) {
            report.assembler = Some(assembler.check(text)?);
        }

        debug!(
            source,
            lines = report.total_lines,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validation finished"
        );
        Ok(report)
    }

    /// Reads and validates a file.
    ///
    /// # Errors
    ///
    /// [`Error::Input`] if the file cannot be read, [`Error::Assembler`] if the
    /// oracle is enabled and cannot be driven.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<FileReport> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.validate_source(&path.display().to_string(), &text)?)
    }
}
