//! Operand token parsing and per-format checks.
//!
//! Role order per format:
//! - R: `rd, rs1, rs2`
//! - I: `rd, rs1, imm` or `rd, imm(rs1)`
//! - S: `rs2, rs1, imm` or `rs2, imm(rs1)`
//! - B: `rs1, rs2, imm`
//! - U, J: `rd, imm`
//!
//! C and Unknown formats follow the catalog's operand declaration order.
//! Registers are also checked against the catalog's bounds and exclusions.

use crate::common::constants::MAX_REGISTER;
use crate::isa::catalog::{Constraint, Operand};
use crate::isa::format::Format;
use crate::validate::issue::{ValidationError, ValidationWarning};

/// Operand count of the `reg, imm(reg)` memory form.
const MEMORY_FORM_OPERANDS: usize = 2;

/// Parses a register token (`x0` .. `x31`).
///
/// # Errors
///
/// [`ValidationError::MalformedRegister`] unless the token is `x` followed by
/// digits, [`ValidationError::RegisterOutOfRange`] above 31.
pub fn parse_register(token: &str, role: &str) -> Result<u32, ValidationError> {
    let malformed = || ValidationError::MalformedRegister {
        role: role.to_owned(),
        token: token.to_owned(),
    };
    let digits = token.strip_prefix('x').ok_or_else(malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let index: u64 = digits.parse().map_err(|_| malformed())?;
    if index > MAX_REGISTER as u64 {
        return Err(ValidationError::RegisterOutOfRange {
            role: role.to_owned(),
            index,
            min: 0,
            max: MAX_REGISTER,
        });
    }
    Ok(index as u32)
}

/// Checks a register index against a catalog register constraint.
///
/// Non-register constraints accept every index.
///
/// # Errors
///
/// [`ValidationError::RegisterOutOfRange`] outside the declared bounds,
/// [`ValidationError::ExcludedRegister`] for an excluded index.
pub fn check_register(
    constraint: &Constraint,
    role: &str,
    index: u32,
) -> Result<(), ValidationError> {
    let Constraint::Register { min, max, exclude } = constraint else {
        return Ok(());
    };
    let value = i64::from(index);
    if value < *min || value > *max {
        return Err(ValidationError::RegisterOutOfRange {
            role: role.to_owned(),
            index: u64::from(index),
            min: *min,
            max: *max,
        });
    }
    if exclude.contains(&value) {
        return Err(ValidationError::ExcludedRegister {
            role: role.to_owned(),
            index,
        });
    }
    Ok(())
}

/// Parses a decimal or `0x` hexadecimal immediate with an optional sign.
///
/// # Errors
///
/// [`ValidationError::MalformedImmediate`] for anything else.
pub fn parse_immediate(token: &str) -> Result<i64, ValidationError> {
    let malformed = || ValidationError::MalformedImmediate {
        token: token.to_owned(),
    };
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).map_err(|_| malformed())?
        }
        Some(_) => return Err(malformed()),
        None if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) => {
            body.parse::<i64>().map_err(|_| malformed())?
        }
        None => return Err(malformed()),
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// Splits a memory operand `imm(xN)` into its immediate and register tokens.
pub fn split_memory(token: &str) -> Option<(&str, &str)> {
    let inner = token.strip_suffix(')')?;
    let (imm, reg) = inner.split_once('(')?;
    let (imm, reg) = (imm.trim(), reg.trim());
    if imm.is_empty() || reg.is_empty() {
        return None;
    }
    Some((imm, reg))
}

/// Checks an immediate against the format's range and alignment.
///
/// # Errors
///
/// [`ValidationError::ImmediateOutOfRange`] or
/// [`ValidationError::MisalignedImmediate`].
pub fn check_immediate(format: Format, value: i64) -> Result<(), ValidationError> {
    if let Some((min, max)) = format
        .validation_range()
        .filter(|(min, max)| value < *min || value > *max)
    {
        return Err(ValidationError::ImmediateOutOfRange {
            format,
            value,
            min,
            max,
        });
    }
    if format.requires_even() && value % 2 != 0 {
        return Err(ValidationError::MisalignedImmediate { format, value });
    }
    Ok(())
}

/// Findings for one operand list.
#[derive(Debug)]
pub(crate) struct Findings<'d> {
    declared: &'d [Operand],
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl<'d> Findings<'d> {
    const fn new(declared: &'d [Operand]) -> Self {
        Self {
            declared,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn constraint(&self, role: &str) -> Option<&'d Constraint> {
        self.declared
            .iter()
            .find(|op| op.name == role)
            .map(|op| &op.constraint)
    }

    fn register(&mut self, token: &str, role: &str) {
        let checked = parse_register(token, role).and_then(|index| {
            self.constraint(role)
                .map_or(Ok(()), |c| check_register(c, role, index))
                .map(|()| index)
        });
        match checked {
            Ok(0) if role == "rd" => self.warnings.push(ValidationWarning::DiscardedWrite),
            Ok(_) => {}
            Err(err) => self.errors.push(err),
        }
    }

    fn immediate(&mut self, token: &str, format: Format, role: &str) {
        let checked = parse_immediate(token).and_then(|v| check_immediate(format, v).map(|()| v));
        let value = match checked {
            Ok(value) => value,
            Err(err) => {
                self.errors.push(err);
                return;
            }
        };
        if format.validation_range().is_some() {
            return;
        }
        match self.constraint(role) {
            Some(&Constraint::Immediate { min, max }) if value < min || value > max => {
                self.warnings.push(ValidationWarning::ImmediateOutsideCatalogRange {
                    role: role.to_owned(),
                    value,
                    min,
                    max,
                });
            }
            _ => {}
        }
    }
}

/// Runs the arity and role checks of `format` over `operands`.
///
/// `declared` is the catalog's operand list; empty for mnemonics outside the
/// catalog.
pub(crate) fn check<'d>(
    format: Format,
    operands: &[&str],
    declared: &'d [Operand],
) -> Findings<'d> {
    let mut findings = Findings::new(declared);
    let n = operands.len();

    let memory_role = match format {
        Format::I => Some("rd"),
        Format::S => Some("rs2"),
        _ => None,
    };
    let memory = memory_role
        .filter(|_| n >= MEMORY_FORM_OPERANDS)
        .and_then(|role| split_memory(operands[1]).map(|parts| (role, parts)));

    let expected = match format.expected_operands() {
        _ if memory.is_some() => Some(MEMORY_FORM_OPERANDS),
        Some(arity) => Some(arity),
        None if declared.is_empty() => None,
        None => Some(declared.len()),
    };
    if let Some(expected) = expected.filter(|expected| n != *expected) {
        findings.warnings.push(ValidationWarning::OperandCount {
            format,
            expected,
            found: n,
        });
    }

    if let Some((role, (imm, base))) = memory {
        findings.register(operands[0], role);
        findings.immediate(imm, format, "imm");
        findings.register(base, "rs1");
        return findings;
    }

    match format {
        Format::R if n >= 3 => {
            findings.register(operands[0], "rd");
            findings.register(operands[1], "rs1");
            findings.register(operands[2], "rs2");
        }
        Format::I if n >= 3 => {
            findings.register(operands[0], "rd");
            findings.register(operands[1], "rs1");
            findings.immediate(operands[2], format, "imm");
        }
        Format::S if n >= 3 => {
            findings.register(operands[0], "rs2");
            findings.register(operands[1], "rs1");
            findings.immediate(operands[2], format, "imm");
        }
        Format::B if n >= 3 => {
            findings.register(operands[0], "rs1");
            findings.register(operands[1], "rs2");
            findings.immediate(operands[2], format, "imm");
        }
        Format::U | Format::J if n >= 2 => {
            findings.register(operands[0], "rd");
            findings.immediate(operands[1], format, "imm");
        }
        Format::C | Format::Unknown => {
            for (token, operand) in operands.iter().zip(declared) {
                match operand.constraint {
                    Constraint::Register { .. } => findings.register(token, &operand.name),
                    Constraint::Immediate { .. } => {
                        findings.immediate(token, format, &operand.name);
                    }
                    Constraint::Unknown => {}
                }
            }
        }
        _ => {}
    }
    findings
}
