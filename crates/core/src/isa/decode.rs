//! Word decoder.
//!
//! Maps a raw 32-bit word to the first catalog definition whose opcode and
//! declared function fields match. Extensions are searched in the catalog's
//! precedence order, definitions in declaration order, so the result is
//! deterministic for a given catalog. A word no definition matches is not an
//! error: it decodes to [`Decoded::Unknown`] with the raw fields attached.

use serde::Serialize;
use tracing::trace;

use crate::common::constants::UNKNOWN_EXTENSION;
use crate::common::error::DecodeError;
use crate::isa::catalog::{Catalog, InstructionDefinition};
use crate::isa::format::Format;
use crate::isa::instruction::{Fields, binary_text, hex_text};

/// Parses a hexadecimal instruction word.
///
/// Surrounding whitespace and a `0x`/`0X` prefix are accepted.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidHex`] for empty input, non-hex digits or a
/// value wider than 32 bits.
pub fn parse_hex(text: &str) -> Result<u32, DecodeError> {
    let trimmed = text.trim();
    let invalid = |reason: &str| DecodeError::InvalidHex {
        input: trimmed.to_owned(),
        reason: reason.to_owned(),
    };
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(invalid("no digits"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("not a hexadecimal number"));
    }
    u32::from_str_radix(digits, 16).map_err(|_| invalid("wider than 32 bits"))
}

/// Assembles a word from exactly four little-endian bytes.
///
/// # Errors
///
/// Returns [`DecodeError::ByteLength`] when `bytes` is not four bytes long.
pub fn word_from_le_bytes(bytes: &[u8]) -> Result<u32, DecodeError> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| DecodeError::ByteLength(bytes.len()))?;
    Ok(u32::from_le_bytes(array))
}

/// A raw word with its textual renderings and extracted fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Word {
    /// The word itself.
    pub raw: u32,
    /// Eight lowercase hex digits.
    pub hex: String,
    /// Thirty-two binary digits.
    pub binary: String,
    /// Fixed-position fields.
    #[serde(flatten)]
    pub fields: Fields,
}

impl Word {
    /// Extracts the fields of `raw`.
    pub fn new(raw: u32) -> Self {
        Self {
            raw,
            hex: hex_text(raw),
            binary: binary_text(raw),
            fields: Fields::extract(raw),
        }
    }
}

/// A word matched to a catalog definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodedInstruction {
    /// The decoded word.
    #[serde(flatten)]
    pub word: Word,
    /// Matched mnemonic.
    pub name: String,
    /// Extension of the matched definition.
    pub extension: String,
    /// Resolved format of the matched definition.
    pub format: Format,
}

/// A word no catalog definition matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnknownInstruction {
    /// The decoded word.
    #[serde(flatten)]
    pub word: Word,
    /// Always `"Unknown"`.
    pub extension: String,
}

/// Decoder output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Decoded {
    /// Matched a catalog definition.
    Known(DecodedInstruction),
    /// Matched nothing.
    Unknown(UnknownInstruction),
}

impl Decoded {
    /// Matched mnemonic, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Known(inst) => Some(&inst.name),
            Self::Unknown(_) => None,
        }
    }

    /// Resolved extension (`"Unknown"` when unmatched).
    pub fn extension(&self) -> &str {
        match self {
            Self::Known(inst) => &inst.extension,
            Self::Unknown(inst) => &inst.extension,
        }
    }

    /// Resolved format (`Unknown` when unmatched).
    pub const fn format(&self) -> Format {
        match self {
            Self::Known(inst) => inst.format,
            Self::Unknown(_) => Format::Unknown,
        }
    }

    /// The raw word and its fields.
    pub const fn word(&self) -> &Word {
        match self {
            Self::Known(inst) => &inst.word,
            Self::Unknown(inst) => &inst.word,
        }
    }

    /// Whether a catalog definition matched.
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// Decodes words against a borrowed catalog.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'c> {
    catalog: &'c Catalog,
}

impl<'c> Decoder<'c> {
    /// Creates a decoder over `catalog`.
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// First definition matching `word`, in precedence order.
    pub fn lookup(&self, word: u32) -> Option<&'c InstructionDefinition> {
        self.catalog.definitions().find(|def| def.matches(word))
    }

    /// Decodes one word.
    pub fn decode(&self, word: u32) -> Decoded {
        let decoded = match self.lookup(word) {
            Some(def) => Decoded::Known(DecodedInstruction {
                word: Word::new(word),
                name: def.name.clone(),
                extension: def.extension.clone(),
                format: def.resolved_format(),
            }),
            None => Decoded::Unknown(UnknownInstruction {
                word: Word::new(word),
                extension: UNKNOWN_EXTENSION.to_owned(),
            }),
        };
        trace!(word, name = decoded.name(), "decoded");
        decoded
    }

    /// Parses and decodes a hexadecimal word.
    ///
    /// # Errors
    ///
    /// See [`parse_hex`].
    pub fn decode_hex(&self, text: &str) -> Result<Decoded, DecodeError> {
        parse_hex(text).map(|word| self.decode(word))
    }

    /// Decodes four little-endian bytes.
    ///
    /// # Errors
    ///
    /// See [`word_from_le_bytes`].
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Decoded, DecodeError> {
        word_from_le_bytes(bytes).map(|word| self.decode(word))
    }
}
