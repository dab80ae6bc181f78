//! Structural instruction formats and the format classifier.
//!
//! A [`Format`] names the bit layout of an encoding (R, I, S, B, U, J, C) and
//! carries the numeric rules tied to it: the domain random immediates are drawn
//! from, the range the validator accepts, alignment, operand arity and the
//! re-encoding applied to generated immediates.
//!
//! [`classify`] infers a format from a mnemonic and, when known, the bit ranges
//! its encoding declares. The inference is an ordered ladder of [`Rule`]s; the
//! first rule that yields a format wins and anything unresolved is
//! [`Format::Unknown`]. Callers must tolerate `Unknown`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::common::constants::{
    B_IMM_MASK, IMM12_MASK, IMM12_MAX, IMM12_MIN, IMM12_SIGN_FOLD, J_IMM_MASK, JIMM_MAX, JIMM_MIN,
    U_IMM_MASK, UIMM20_MAX,
};

/// Structural layout of an instruction encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Format {
    /// Register-register.
    R,
    /// Register-immediate, loads, `jalr`, system.
    I,
    /// Stores.
    S,
    /// Conditional branches.
    B,
    /// Upper immediate.
    U,
    /// Jumps.
    J,
    /// Compressed.
    C,
    /// Not determined.
    Unknown,
}

/// Error returned when parsing a format tag fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFormatError(pub String);

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown instruction format '{}'", self.0)
    }
}

impl std::error::Error for ParseFormatError {}

impl Format {
    /// Short tag (`"R"`, `"I"`, ..., `"Unknown"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::R => "R",
            Self::I => "I",
            Self::S => "S",
            Self::B => "B",
            Self::U => "U",
            Self::J => "J",
            Self::C => "C",
            Self::Unknown => "Unknown",
        }
    }

    /// Inclusive domain random immediates are drawn from before re-encoding.
    ///
    /// B, J and U draw non-negative values so that the masked encoding stays
    /// inside the range the validator accepts for the same format.
    pub const fn generation_domain(self) -> (i64, i64) {
        match self {
            Self::B => (0, IMM12_MAX),
            Self::J => (0, JIMM_MAX),
            Self::U => (0, UIMM20_MAX),
            Self::R | Self::I | Self::S | Self::C | Self::Unknown => (IMM12_MIN, IMM12_MAX),
        }
    }

    /// Inclusive immediate range accepted by the validator, if the format has one.
    pub const fn validation_range(self) -> Option<(i64, i64)> {
        match self {
            Self::I | Self::S | Self::B => Some((IMM12_MIN, IMM12_MAX)),
            Self::U => Some((0, UIMM20_MAX)),
            Self::J => Some((JIMM_MIN, JIMM_MAX)),
            Self::R | Self::C | Self::Unknown => None,
        }
    }

    /// Whether immediates of this format must be even.
    pub const fn requires_even(self) -> bool {
        matches!(self, Self::B | Self::J)
    }

    /// Operand count the validator expects, if the format has a fixed arity.
    pub const fn expected_operands(self) -> Option<usize> {
        match self {
            Self::R | Self::I | Self::S | Self::B => Some(3),
            Self::U | Self::J => Some(2),
            Self::C | Self::Unknown => None,
        }
    }

    /// Re-encodes a drawn immediate into the format's field width.
    ///
    /// U keeps 20 bits, J and B keep their width with bit 0 cleared, and
    /// everything else folds to 12-bit two's complement (negative values keep
    /// their sign bits).
    pub const fn encode_immediate(self, value: i64) -> i64 {
        match self {
            Self::U => value & U_IMM_MASK,
            Self::J => value & J_IMM_MASK,
            Self::B => value & B_IMM_MASK,
            Self::R | Self::I | Self::S | Self::C | Self::Unknown => {
                if value >= 0 {
                    value & IMM12_MASK
                } else {
                    value | IMM12_SIGN_FOLD
                }
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ParseFormatError;

    /// Accepts `R` as well as `R-Type`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let tag = lower.strip_suffix("-type").unwrap_or(&lower);
        match tag {
            "r" => Ok(Self::R),
            "i" => Ok(Self::I),
            "s" => Ok(Self::S),
            "b" => Ok(Self::B),
            "u" => Ok(Self::U),
            "j" => Ok(Self::J),
            "c" => Ok(Self::C),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseFormatError(trimmed.to_owned())),
        }
    }
}

/// An inclusive bit range `msb..lsb` inside a 32-bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BitRange {
    /// Most significant bit.
    pub msb: u8,
    /// Least significant bit.
    pub lsb: u8,
}

impl BitRange {
    /// Builds a range, rejecting bits above 31 and inverted bounds.
    pub const fn new(msb: u8, lsb: u8) -> Option<Self> {
        if msb > 31 || lsb > msb {
            None
        } else {
            Some(Self { msb, lsb })
        }
    }
}

impl FromStr for BitRange {
    type Err = ();

    /// Parses `"31..12"` or a single bit such as `"7"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (msb, lsb) = match s.split_once("..") {
            Some((hi, lo)) => (hi.trim().parse::<u8>(), lo.trim().parse::<u8>()),
            None => (s.parse::<u8>(), s.parse::<u8>()),
        };
        match (msb, lsb) {
            (Ok(msb), Ok(lsb)) => Self::new(msb, lsb).ok_or(()),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.msb == self.lsb {
            write!(f, "{}", self.msb)
        } else {
            write!(f, "{}..{}", self.msb, self.lsb)
        }
    }
}

/// The encoding fields a catalog entry declares.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldSignature {
    /// An opcode is declared (always true for catalog entries).
    pub opcode: bool,
    /// A funct3 value is declared.
    pub funct3: bool,
    /// A funct7 value is declared.
    pub funct7: bool,
    /// Additional bit ranges (immediates, registers) in declaration order.
    pub ranges: Vec<BitRange>,
}

impl FieldSignature {
    /// Whether exactly the range `msb..lsb` is declared.
    pub fn declares(&self, msb: u8, lsb: u8) -> bool {
        self.ranges.iter().any(|r| r.msb == msb && r.lsb == lsb)
    }

    /// 20-bit upper immediate in bits 31..12.
    fn is_upper_immediate(&self) -> bool {
        self.declares(31, 12)
    }

    /// Store split immediate: imm[11:5] in 31..25 and imm[4:0] in 11..7.
    fn is_store_split(&self) -> bool {
        self.declares(31, 25) && self.declares(11, 7)
    }

    /// Branch split immediate: imm[4:1] in 11..8 and imm[11] in bit 7.
    fn is_branch_split(&self) -> bool {
        self.declares(11, 8) && self.declares(7, 7)
    }

    /// Jump split immediate: imm[10:1] in 30..21 and imm[19:12] in 19..12.
    fn is_jump_split(&self) -> bool {
        self.declares(30, 21) && self.declares(19, 12)
    }
}

/// One step of the classification ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Rule {
    /// Fixed table of canonical base-ISA mnemonics.
    CanonicalName,
    /// funct7 + funct3 + opcode declared.
    RegisterTriple,
    /// 20-bit upper immediate declared.
    UpperImmediate,
    /// Store split immediate declared.
    StoreSplit,
    /// Branch split immediate declared.
    BranchSplit,
    /// Jump split immediate declared.
    JumpSplit,
    /// Name ends in `i` (except `lui`).
    ImmediateSuffix,
    /// Name of at most four characters starting with `l`.
    ShortLoad,
    /// Name of at most four characters starting with `s`.
    ShortStore,
    /// Name starting with `b` (except `beqz`/`bnez`).
    BranchPrefix,
}

/// The ladder, in evaluation order.
pub const LADDER: [Rule; 10] = [
    Rule::CanonicalName,
    Rule::RegisterTriple,
    Rule::UpperImmediate,
    Rule::StoreSplit,
    Rule::BranchSplit,
    Rule::JumpSplit,
    Rule::ImmediateSuffix,
    Rule::ShortLoad,
    Rule::ShortStore,
    Rule::BranchPrefix,
];

/// Canonical base-ISA mnemonics and their formats.
const CANONICAL: [(&str, Format); 47] = [
    ("add", Format::R),
    ("sub", Format::R),
    ("sll", Format::R),
    ("slt", Format::R),
    ("sltu", Format::R),
    ("xor", Format::R),
    ("srl", Format::R),
    ("sra", Format::R),
    ("or", Format::R),
    ("and", Format::R),
    ("mul", Format::R),
    ("mulh", Format::R),
    ("mulhsu", Format::R),
    ("mulhu", Format::R),
    ("div", Format::R),
    ("divu", Format::R),
    ("rem", Format::R),
    ("remu", Format::R),
    ("addi", Format::I),
    ("slti", Format::I),
    ("sltiu", Format::I),
    ("xori", Format::I),
    ("ori", Format::I),
    ("andi", Format::I),
    ("slli", Format::I),
    ("srli", Format::I),
    ("srai", Format::I),
    ("lb", Format::I),
    ("lh", Format::I),
    ("lw", Format::I),
    ("lbu", Format::I),
    ("lhu", Format::I),
    ("jalr", Format::I),
    ("ecall", Format::I),
    ("ebreak", Format::I),
    ("sb", Format::S),
    ("sh", Format::S),
    ("sw", Format::S),
    ("beq", Format::B),
    ("bne", Format::B),
    ("blt", Format::B),
    ("bge", Format::B),
    ("bltu", Format::B),
    ("bgeu", Format::B),
    ("lui", Format::U),
    ("auipc", Format::U),
    ("jal", Format::J),
];

/// Looks a mnemonic up in the canonical table.
pub fn canonical_format(name: &str) -> Option<Format> {
    CANONICAL
        .iter()
        .find(|(mnemonic, _)| *mnemonic == name)
        .map(|&(_, format)| format)
}

impl Rule {
    /// Applies this rule, returning a format when it fires.
    pub fn apply(self, name: &str, signature: Option<&FieldSignature>) -> Option<Format> {
        match self {
            Self::CanonicalName => canonical_format(name),
            Self::RegisterTriple => signature
                .filter(|s| s.funct7 && s.funct3 && s.opcode)
                .map(|_| Format::R),
            Self::UpperImmediate => signature
                .filter(|s| s.is_upper_immediate())
                .map(|_| Format::U),
            Self::StoreSplit => signature.filter(|s| s.is_store_split()).map(|_| Format::S),
            Self::BranchSplit => signature.filter(|s| s.is_branch_split()).map(|_| Format::B),
            Self::JumpSplit => signature.filter(|s| s.is_jump_split()).map(|_| Format::J),
            Self::ImmediateSuffix => {
                (name.ends_with('i') && name != "lui").then_some(Format::I)
            }
            Self::ShortLoad => (name.len() <= 4 && name.starts_with('l')).then_some(Format::I),
            Self::ShortStore => (name.len() <= 4 && name.starts_with('s')).then_some(Format::S),
            Self::BranchPrefix => (name.starts_with('b') && name != "beqz" && name != "bnez")
                .then_some(Format::B),
        }
    }
}

/// Classifies an instruction, returning the format and the rule that decided it.
///
/// Returns `(Format::Unknown, None)` when no rule fires.
pub fn classify_with_rule(
    name: &str,
    signature: Option<&FieldSignature>,
) -> (Format, Option<Rule>) {
    LADDER
        .iter()
        .find_map(|&rule| rule.apply(name, signature).map(|f| (f, Some(rule))))
        .unwrap_or((Format::Unknown, None))
}

/// Classifies an instruction from its name and optional field signature.
pub fn classify(name: &str, signature: Option<&FieldSignature>) -> Format {
    classify_with_rule(name, signature).0
}
