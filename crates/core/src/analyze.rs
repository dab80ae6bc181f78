//! Front-end operations over the shared read-only context.
//!
//! [`Analyzer`] combines the decoder with the profile resolver for the three
//! input shapes the tool accepts: a single hex word, a raw little-endian
//! binary, and newline-delimited hex text.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::common::error::{DecodeError, ProfileError};
use crate::isa::catalog::Catalog;
use crate::isa::decode::{Decoded, Decoder, word_from_le_bytes};
use crate::profile::{ProfileDatabase, ProfileDescription};

/// Instruction word size in bytes.
const WORD_BYTES: usize = 4;

/// One decoded word with the profiles able to run it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstructionReport {
    /// Decoder result.
    pub decoded: Decoded,
    /// Compatible profiles; empty for unknown words.
    pub compatible_profiles: Vec<String>,
}

/// A decoded word inside a binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BinaryEntry {
    /// Byte offset of the word.
    pub offset: usize,
    /// Decoder result.
    pub decoded: Decoded,
}

/// Result of decoding a binary blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BinaryReport {
    /// Decoded words in file order.
    pub instructions: Vec<BinaryEntry>,
    /// Bytes after the last whole word.
    pub trailing_bytes: usize,
    /// Extensions of the known words, sorted.
    pub extensions_used: Vec<String>,
    /// Profiles able to run every known word.
    pub compatible_profiles: Vec<String>,
}

/// One line of hex text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HexLine {
    /// 1-based line number.
    pub line: usize,
    /// Decoder result or the parse failure for that line.
    #[serde(flatten)]
    pub outcome: HexOutcome,
}

/// Outcome of one hex line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HexOutcome {
    /// The line parsed and decoded.
    Decoded(Decoded),
    /// The line is not a hex word.
    Error(DecodeError),
}

/// Result of decoding hex text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HexTextReport {
    /// Non-empty, non-comment lines in order.
    pub entries: Vec<HexLine>,
    /// Extensions of the known words, sorted.
    pub extensions_used: Vec<String>,
    /// Profiles able to run every known word.
    pub compatible_profiles: Vec<String>,
}

impl HexTextReport {
    /// Number of lines that failed to parse.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, HexOutcome::Error(_)))
            .count()
    }
}

/// Decoder plus profile resolver over borrowed tables.
#[derive(Clone, Copy, Debug)]
pub struct Analyzer<'a> {
    catalog: &'a Catalog,
    profiles: &'a ProfileDatabase,
}

impl<'a> Analyzer<'a> {
    /// Analyzer over `catalog` and `profiles`.
    pub const fn new(catalog: &'a Catalog, profiles: &'a ProfileDatabase) -> Self {
        Self { catalog, profiles }
    }

    /// The decoder used by every operation.
    pub const fn decoder(&self) -> Decoder<'a> {
        Decoder::new(self.catalog)
    }

    /// Decodes one hex word.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidHex`] when `text` is not a hex word.
    pub fn decode_hex(&self, text: &str) -> Result<InstructionReport, DecodeError> {
        let decoded = self.decoder().decode_hex(text)?;
        let compatible_profiles = if decoded.is_known() {
            self.resolve([decoded.extension()])
        } else {
            Vec::new()
        };
        Ok(InstructionReport {
            decoded,
            compatible_profiles,
        })
    }

    /// Decodes `bytes` at a 4-byte stride starting at `offset`.
    ///
    /// An offset past the end yields an empty report.
    pub fn decode_binary(&self, bytes: &[u8], offset: usize) -> BinaryReport {
        let decoder = self.decoder();
        let body = bytes.get(offset..).unwrap_or_default();
        let chunks = body.chunks_exact(WORD_BYTES);
        let trailing_bytes = chunks.remainder().len();

        let instructions: Vec<BinaryEntry> = chunks
            .enumerate()
            .filter_map(|(i, chunk)| {
                word_from_le_bytes(chunk).ok().map(|word| BinaryEntry {
                    offset: offset + i * WORD_BYTES,
                    decoded: decoder.decode(word),
                })
            })
            .collect();

        let extensions_used = used_extensions(instructions.iter().map(|e| &e.decoded));
        let compatible_profiles = self.resolve(&extensions_used);
        debug!(
            words = instructions.len(),
            trailing_bytes,
            extensions = extensions_used.len(),
            "binary decoded"
        );
        BinaryReport {
            instructions,
            trailing_bytes,
            extensions_used,
            compatible_profiles,
        }
    }

    /// Decodes newline-delimited hex text; `#` starts a comment.
    pub fn decode_hex_text(&self, text: &str) -> HexTextReport {
        let decoder = self.decoder();
        let entries: Vec<HexLine> = text
            .lines()
            .enumerate()
            .filter_map(|(index, raw)| {
                let code = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
                if code.is_empty() {
                    return None;
                }
                let outcome = match decoder.decode_hex(code) {
                    Ok(decoded) => HexOutcome::Decoded(decoded),
                    Err(err) => HexOutcome::Error(err),
                };
                Some(HexLine {
                    line: index + 1,
                    outcome,
                })
            })
            .collect();

        let extensions_used = used_extensions(entries.iter().filter_map(|e| match &e.outcome {
            HexOutcome::Decoded(decoded) => Some(decoded),
            HexOutcome::Error(_) => None,
        }));
        let compatible_profiles = self.resolve(&extensions_used);
        HexTextReport {
            entries,
            extensions_used,
            compatible_profiles,
        }
    }

    /// Describes a named profile.
    ///
    /// # Errors
    ///
    /// [`ProfileError::UnknownProfile`] for an unknown name.
    pub fn describe_profile(&self, name: &str) -> Result<ProfileDescription, ProfileError> {
        self.profiles.describe(name)
    }

    fn resolve<I, S>(&self, extensions: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.profiles
            .compatible(extensions)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

/// Sorted set of extensions of the known instructions.
fn used_extensions<'d>(decoded: impl Iterator<Item = &'d Decoded>) -> Vec<String> {
    decoded
        .filter(|d| d.is_known())
        .map(|d| d.extension().to_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
