//! Instruction Decode Tests.
//!
//! Verifies that every catalog encoding decodes back to its own definition,
//! that unmatched words carry their raw fields, and that decoding is a pure
//! function of the word.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use rvprofile_core::Decoded;
use rvprofile_core::Decoder;
use rvprofile_core::Format;
use rvprofile_core::common::error::DecodeError;
use rvprofile_core::isa::decode::{parse_hex, word_from_le_bytes};
use rvprofile_core::isa::instruction::InstructionBits;

use crate::common::builder::{InstructionBuilder, i_type, r_type, u_type};
use crate::common::builtin_catalog;

/// Opcodes used by the embedded catalog.
const CATALOG_OPCODES: [u32; 11] = [0x37, 0x17, 0x6F, 0x67, 0x63, 0x03, 0x23, 0x13, 0x33, 0x0F, 0x73];

// ══════════════════════════════════════════════════════════
// 1. Concrete encodings
// ══════════════════════════════════════════════════════════

#[test]
fn decode_add_a0_a1_a2() {
    let catalog = builtin_catalog();
    let word = r_type(0x33, 10, 0, 11, 12, 0);
    assert_eq!(word, 0x00C5_8533);

    let decoded = Decoder::new(&catalog).decode(word);
    assert_eq!(decoded.name(), Some("add"));
    assert_eq!(decoded.format(), Format::R);
    assert_eq!(decoded.extension(), "I");

    let fields = decoded.word().fields;
    assert_eq!(fields.rd, 10);
    assert_eq!(fields.rs1, 11);
    assert_eq!(fields.rs2, 12);
    assert_eq!(decoded.word().hex, "00c58533");
}

#[test]
fn decode_sub_and_mul_by_funct7() {
    let catalog = builtin_catalog();
    let decoder = Decoder::new(&catalog);

    let sub = decoder.decode(r_type(0x33, 1, 0, 2, 3, 0x20));
    assert_eq!(sub.name(), Some("sub"));
    assert_eq!(sub.extension(), "I");

    let mul = decoder.decode(r_type(0x33, 1, 0, 2, 3, 0x01));
    assert_eq!(mul.name(), Some("mul"));
    assert_eq!(mul.extension(), "M");
}

#[test]
fn decode_ignores_undeclared_funct7() {
    // addi declares no funct7, so the immediate bits above rs2 are free.
    let catalog = builtin_catalog();
    let decoded = Decoder::new(&catalog).decode(i_type(0x13, 5, 0, 6, -1));
    assert_eq!(decoded.name(), Some("addi"));
    assert_eq!(decoded.format(), Format::I);
}

#[test]
fn decode_upper_immediate() {
    let catalog = builtin_catalog();
    let decoded = Decoder::new(&catalog).decode(u_type(0x37, 7, 0xABCDE));
    assert_eq!(decoded.name(), Some("lui"));
    assert_eq!(decoded.format(), Format::U);
}

#[test]
fn decode_srai_distinct_from_srli() {
    let catalog = builtin_catalog();
    let decoder = Decoder::new(&catalog);
    let srli = InstructionBuilder::new().opcode(0x13).funct3(5).rd(1).rs1(1).rs2(4).build();
    let srai = InstructionBuilder::new()
        .opcode(0x13)
        .funct3(5)
        .funct7(0x20)
        .rd(1)
        .rs1(1)
        .rs2(4)
        .build();
    assert_eq!(decoder.decode(srli).name(), Some("srli"));
    assert_eq!(decoder.decode(srai).name(), Some("srai"));
}

#[test]
fn decode_unknown_word_keeps_raw_fields() {
    let catalog = builtin_catalog();
    let decoded = Decoder::new(&catalog).decode(0xFFFF_FFFF);

    assert!(!decoded.is_known());
    assert_eq!(decoded.name(), None);
    assert_eq!(decoded.extension(), "Unknown");
    assert_eq!(decoded.format(), Format::Unknown);
    let word = decoded.word();
    assert_eq!(word.hex, "ffffffff");
    assert_eq!(word.binary, "1".repeat(32));
    assert_eq!(word.fields.opcode, 0x7F);
    assert_eq!(word.fields.funct7, 0x7F);
}

#[test]
fn decode_serializes_with_status_tag() {
    let catalog = builtin_catalog();
    let decoder = Decoder::new(&catalog);

    let known = serde_json::to_value(decoder.decode(0x00C5_8533)).unwrap();
    assert_eq!(known["status"], "known");
    assert_eq!(known["name"], "add");
    assert_eq!(known["format"], "R");
    assert_eq!(known["rd"], 10);

    let unknown = serde_json::to_value(decoder.decode(0)).unwrap();
    assert_eq!(unknown["status"], "unknown");
    assert_eq!(unknown["extension"], "Unknown");
    assert_eq!(unknown["hex"], "00000000");
}

// ══════════════════════════════════════════════════════════
// 2. Hex and byte input
// ══════════════════════════════════════════════════════════

#[test]
fn parse_hex_accepts_prefix_and_whitespace() {
    assert_eq!(parse_hex("0x00c58533"), Ok(0x00C5_8533));
    assert_eq!(parse_hex("  0X00C58533\n"), Ok(0x00C5_8533));
    assert_eq!(parse_hex("13"), Ok(0x13));
}

#[test]
fn parse_hex_rejects_garbage() {
    for input in ["", "0x", "xyz", "0x1_0", "123456789"] {
        assert!(
            matches!(parse_hex(input), Err(DecodeError::InvalidHex { .. })),
            "'{input}' should be rejected"
        );
    }
}

#[test]
fn decode_hex_reports_invalid_input() {
    let catalog = builtin_catalog();
    let err = Decoder::new(&catalog).decode_hex("nothex").unwrap_err();
    assert!(err.to_string().contains("nothex"), "got: {err}");
}

#[test]
fn bytes_are_little_endian() {
    assert_eq!(word_from_le_bytes(&[0x33, 0x85, 0xC5, 0x00]), Ok(0x00C5_8533));
    assert_eq!(word_from_le_bytes(&[0x33, 0x85]), Err(DecodeError::ByteLength(2)));

    let catalog = builtin_catalog();
    let decoded = Decoder::new(&catalog).decode_bytes(&[0x33, 0x85, 0xC5, 0x00]).unwrap();
    assert_eq!(decoded.name(), Some("add"));
}

// ══════════════════════════════════════════════════════════
// 3. Properties
// ══════════════════════════════════════════════════════════

#[test]
fn every_catalog_encoding_decodes_to_itself() {
    let catalog = builtin_catalog();
    let decoder = Decoder::new(&catalog);
    for def in catalog.definitions() {
        let word = InstructionBuilder::new()
            .opcode(def.opcode)
            .funct3(def.funct3.unwrap_or(0))
            .funct7(def.funct7.unwrap_or(0))
            .build();
        let decoded = decoder.decode(word);
        // The embedded catalog has no shared triples, so every word maps back.
        assert_eq!(decoded.name(), Some(def.name.as_str()), "word {word:#010x}");
        assert_eq!(decoded.extension(), def.extension);
    }
}

fn non_catalog_word() -> impl Strategy<Value = u32> {
    (any::<u32>(), 0u32..0x80)
        .prop_filter("opcode must be outside the catalog", |(_, op)| !CATALOG_OPCODES.contains(op))
        .prop_map(|(bits, op)| (bits & !0x7F) | op)
}

proptest! {
    #[test]
    fn decoding_is_idempotent(word in any::<u32>()) {
        let catalog = builtin_catalog();
        let decoder = Decoder::new(&catalog);
        prop_assert_eq!(decoder.decode(word), decoder.decode(word));
    }

    #[test]
    fn unknown_words_carry_exact_fields(word in non_catalog_word()) {
        let catalog = builtin_catalog();
        let decoded = Decoder::new(&catalog).decode(word);
        prop_assert!(matches!(decoded, Decoded::Unknown(_)));

        let fields = decoded.word().fields;
        prop_assert_eq!(fields.opcode, word.opcode());
        prop_assert_eq!(fields.funct3, word.funct3());
        prop_assert_eq!(fields.funct7, word.funct7());
        prop_assert_eq!(fields.rd, word.rd());
        prop_assert_eq!(fields.rs1, word.rs1());
        prop_assert_eq!(fields.rs2, word.rs2());
        prop_assert_eq!(fields.to_word(), word);
        prop_assert_eq!(&decoded.word().hex, &format!("{word:08x}"));
        prop_assert_eq!(&decoded.word().binary, &format!("{word:032b}"));
    }
}
