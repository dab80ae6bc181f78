//! Instruction field extraction and encoding utilities.
//!
//! Provides bit extraction for the fixed fields every 32-bit RISC-V encoding
//! shares, the `Fields` snapshot used by the decoder, and the textual
//! hex/binary renderings reported for each word.

use serde::Serialize;

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for extracting a register field (5 bits).
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;

/// Bit position of the destination register field.
pub const RD_SHIFT: u32 = 7;
/// Bit position of the funct3 field.
pub const FUNCT3_SHIFT: u32 = 12;
/// Bit position of the first source register field.
pub const RS1_SHIFT: u32 = 15;
/// Bit position of the second source register field.
pub const RS2_SHIFT: u32 = 20;
/// Bit position of the funct7 field.
pub const FUNCT7_SHIFT: u32 = 25;

/// Trait for extracting instruction fields from encoded instructions.
///
/// Provides methods to extract the fixed-position fields shared by
/// all 32-bit RISC-V instruction formats.
pub trait InstructionBits {
    /// Extracts the opcode field (bits 0-6).
    ///
    /// The opcode selects the instruction family. Returns the 7-bit value.
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    ///
    /// Returns the 5-bit register index (0-31).
    fn rd(&self) -> u32;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> u32;

    /// Extracts the second source register field (bits 20-24).
    fn rs2(&self) -> u32;

    /// Extracts the funct3 field (bits 12-14).
    ///
    /// Used to distinguish between different operations within the same opcode.
    fn funct3(&self) -> u32;

    /// Extracts the funct7 field (bits 25-31).
    ///
    /// Distinguishes standard and alternate encodings (e.g., ADD vs SUB).
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> u32 {
        (self >> RD_SHIFT) & REG_MASK
    }

    #[inline(always)]
    fn rs1(&self) -> u32 {
        (self >> RS1_SHIFT) & REG_MASK
    }

    #[inline(always)]
    fn rs2(&self) -> u32 {
        (self >> RS2_SHIFT) & REG_MASK
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> FUNCT3_SHIFT) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> FUNCT7_SHIFT) & FUNCT7_MASK
    }
}

/// Fixed-position fields extracted from one instruction word.
///
/// Every field is extracted regardless of the instruction's actual format;
/// for formats that reuse these bits as immediates the values are still the
/// raw bit slices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Fields {
    /// Opcode (bits 0-6).
    pub opcode: u32,
    /// funct3 (bits 12-14).
    pub funct3: u32,
    /// funct7 (bits 25-31).
    pub funct7: u32,
    /// Destination register (bits 7-11).
    pub rd: u32,
    /// First source register (bits 15-19).
    pub rs1: u32,
    /// Second source register (bits 20-24).
    pub rs2: u32,
}

impl Fields {
    /// Extracts all fixed fields from `word`.
    pub fn extract(word: u32) -> Self {
        Self {
            opcode: word.opcode(),
            funct3: word.funct3(),
            funct7: word.funct7(),
            rd: word.rd(),
            rs1: word.rs1(),
            rs2: word.rs2(),
        }
    }

    /// Packs the fields back into a word; out-of-width values are masked.
    pub fn to_word(&self) -> u32 {
        (self.funct7 & FUNCT7_MASK) << FUNCT7_SHIFT
            | (self.rs2 & REG_MASK) << RS2_SHIFT
            | (self.rs1 & REG_MASK) << RS1_SHIFT
            | (self.funct3 & FUNCT3_MASK) << FUNCT3_SHIFT
            | (self.rd & REG_MASK) << RD_SHIFT
            | (self.opcode & OPCODE_MASK)
    }
}

/// Renders a word as 8 lowercase hex digits (no prefix).
pub fn hex_text(word: u32) -> String {
    format!("{word:08x}")
}

/// Renders a word as 32 binary digits.
pub fn binary_text(word: u32) -> String {
    format!("{word:032b}")
}
