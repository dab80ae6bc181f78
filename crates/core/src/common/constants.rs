//! Constants used throughout the crate.
//!
//! Register bounds, immediate domains per instruction format, and the masks
//! used when folding generated immediates into their encoded width.

/// Number of integer registers (x0-x31).
pub const REGISTER_COUNT: u32 = 32;

/// Highest valid integer register index.
pub const MAX_REGISTER: i64 = 31;

/// Smallest signed 12-bit immediate (I, S and B formats).
pub const IMM12_MIN: i64 = -2048;

/// Largest signed 12-bit immediate (I, S and B formats).
pub const IMM12_MAX: i64 = 2047;

/// Largest unsigned 20-bit upper immediate (U format).
pub const UIMM20_MAX: i64 = 0xFFFFF;

/// Smallest signed 20-bit jump offset (J format).
pub const JIMM_MIN: i64 = -524288;

/// Largest signed 20-bit jump offset (J format).
pub const JIMM_MAX: i64 = 524287;

/// Mask applied to generated U-type immediates.
pub const U_IMM_MASK: i64 = 0xFFFFF;

/// Mask applied to generated J-type immediates (20 bits, bit 0 cleared).
pub const J_IMM_MASK: i64 = 0xFFFFE;

/// Mask applied to generated B-type immediates (12 bits, bit 0 cleared).
pub const B_IMM_MASK: i64 = 0xFFE;

/// Mask applied to non-negative I/S-type immediates.
pub const IMM12_MASK: i64 = 0xFFF;

/// Sign bits OR-ed into negative I/S-type immediates.
pub const IMM12_SIGN_FOLD: i64 = 0xFFFF_F000;

/// Extension reported for words that match no catalog entry.
pub const UNKNOWN_EXTENSION: &str = "Unknown";

/// Pseudo-instructions accepted by the validator with a partial-check warning.
pub const PSEUDO_INSTRUCTIONS: [&str; 4] = ["li", "mv", "nop", "la"];
