//! Instruction Catalog Tests.
//!
//! Covers the embedded data, extension-key normalisation, decode precedence,
//! duplicate handling and eager rejection of malformed records.

use pretty_assertions::assert_eq;

use rvprofile_core::Catalog;
use rvprofile_core::Format;
use rvprofile_core::common::error::CatalogError;
use rvprofile_core::config::CatalogConfig;
use rvprofile_core::isa::catalog::Constraint;

use crate::common::builtin_catalog;
use crate::common::fixtures::{COLLIDING_CATALOG, DUPLICATE_ENCODING_CATALOG, SMALL_CATALOG};

fn load(text: &str) -> Result<Catalog, CatalogError> {
    Catalog::from_json_str(text, &CatalogConfig::default())
}

/// Wraps one `addi`-shaped record body in a single-extension catalog.
fn single(record: &str) -> String {
    format!(r#"{{ "rv_i": {{ "sample": {record} }} }}"#)
}

// ══════════════════════════════════════════════════════════
// 1. Embedded data
// ══════════════════════════════════════════════════════════

#[test]
fn builtin_extensions_in_precedence_order() {
    let catalog = builtin_catalog();
    let names: Vec<&str> = catalog.extensions().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["I", "M", "Zicsr", "Zifencei"]);
    assert!(catalog.ambiguities().is_empty());
    assert!(catalog.collisions().is_empty());
}

#[test]
fn builtin_lookup_by_name() {
    let catalog = builtin_catalog();
    let addi = catalog.get("addi").unwrap();
    assert_eq!(addi.extension, "I");
    assert_eq!(addi.opcode, 0x13);
    assert_eq!(addi.funct3, Some(0));
    assert_eq!(addi.funct7, None);
    assert_eq!(addi.resolved_format(), Format::I);
    assert_eq!(addi.template, "addi x{rd}, x{rs1}, {imm}");
    assert_eq!(
        addi.operand("imm").unwrap().constraint,
        Constraint::Immediate { min: -2048, max: 2047 }
    );
    assert!(catalog.get("nope").is_none());
}

#[test]
fn builtin_names_are_sorted_and_unique() {
    let catalog = builtin_catalog();
    let names = catalog.names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), catalog.len());
}

#[test]
fn builtin_unknown_formats_are_resolved_by_classifier() {
    let catalog = builtin_catalog();
    let fence_i = catalog.get("fence.i").unwrap();
    assert_eq!(fence_i.format, Format::Unknown);
    assert_eq!(fence_i.resolved_format(), Format::I);

    let csrrw = catalog.get("csrrw").unwrap();
    assert_eq!(csrrw.resolved_format(), Format::Unknown);
    // No fixed immediate field, so the declared CSR space is kept whole.
    assert_eq!(
        csrrw.operand("csr").unwrap().constraint,
        Constraint::Immediate { min: 0, max: 4095 }
    );
}

#[test]
fn builtin_by_format_groups() {
    let catalog = builtin_catalog();
    let groups = catalog.by_format();
    let b: Vec<&str> = groups[&Format::B].iter().map(|d| d.name.as_str()).collect();
    assert_eq!(b, ["beq", "bne", "blt", "bge", "bltu", "bgeu"]);
    let u: Vec<&str> = groups[&Format::U].iter().map(|d| d.name.as_str()).collect();
    assert_eq!(u, ["lui", "auipc"]);
}

// ══════════════════════════════════════════════════════════
// 2. Loading rules
// ══════════════════════════════════════════════════════════

#[test]
fn keys_normalised_and_pseudo_keys_skipped() {
    let catalog = load(SMALL_CATALOG).unwrap();
    let names: Vec<&str> = catalog.extensions().iter().map(|e| e.name.as_str()).collect();
    // rv32_i is declared second but the base ISA takes precedence.
    assert_eq!(names, ["I", "Zicsr"]);
    assert!(catalog.get("nop").is_none());
    assert_eq!(catalog.len(), 3);
}

#[test]
fn constraint_kinds_inferred_from_roles() {
    let catalog = load(SMALL_CATALOG).unwrap();
    let add = catalog.get("add").unwrap();
    assert_eq!(
        add.operand("rs2").unwrap().constraint,
        Constraint::Register {
            min: 0,
            max: 31,
            exclude: Vec::new()
        }
    );
    assert_eq!(add.template, "add x{rd}, x{rs1}, x{rs2}");

    let addi = catalog.get("addi").unwrap();
    assert_eq!(
        addi.operand("rs1").unwrap().constraint,
        Constraint::Register {
            min: 0,
            max: 31,
            exclude: vec![2]
        }
    );
}

#[test]
fn extensions_sharing_a_normalised_name_are_merged() {
    let text = r#"{
      "rv32_i": { "add": { "opcode": 51, "funct3": 0, "funct7": 0, "format": "R" } },
      "rv64_i": { "sub": { "opcode": 51, "funct3": 0, "funct7": 32, "format": "R" } }
    }"#;
    let catalog = load(text).unwrap();
    assert_eq!(catalog.extensions().len(), 1);
    assert_eq!(catalog.extension("I").unwrap().definitions.len(), 2);
}

#[test]
fn cross_extension_collision_recorded_and_base_wins() {
    let catalog = load(COLLIDING_CATALOG).unwrap();
    assert_eq!(catalog.extensions()[0].name, "I");
    let collisions = catalog.collisions();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].first.name, "add");
    assert_eq!(collisions[0].second.name, "cadd");
    assert_eq!(collisions[0].second.to_string(), "Xcustom/cadd");
}

#[test]
fn duplicate_encoding_flagged_by_default() {
    let catalog = load(DUPLICATE_ENCODING_CATALOG).unwrap();
    let ambiguities = catalog.ambiguities();
    assert_eq!(ambiguities.len(), 1);
    assert_eq!(ambiguities[0].first.name, "add");
    assert_eq!(ambiguities[0].second.name, "add2");
}

#[test]
fn duplicate_encoding_rejected_when_strict() {
    let config = CatalogConfig {
        reject_duplicates: true,
    };
    let err = Catalog::from_json_str(DUPLICATE_ENCODING_CATALOG, &config).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateEncoding { .. }), "got {err:?}");
}

#[test]
fn duplicate_mnemonic_rejected() {
    let text = r#"{
      "rv32_i": { "add": { "opcode": 51, "funct3": 0, "funct7": 0 } },
      "rv64_i": { "add": { "opcode": 51, "funct3": 0, "funct7": 0 } }
    }"#;
    assert!(matches!(load(text), Err(CatalogError::DuplicateInstruction { .. })));
}

// ══════════════════════════════════════════════════════════
// 3. Eager rejection of malformed records
// ══════════════════════════════════════════════════════════

#[test]
fn rejects_non_object_document() {
    assert!(matches!(load("[1, 2, 3]"), Err(CatalogError::Parse(_))));
}

#[test]
fn rejects_record_without_opcode() {
    let err = load(&single(r#"{ "funct3": 0 }"#)).unwrap_err();
    assert!(matches!(err, CatalogError::Record { .. }));
    assert!(err.to_string().starts_with("I/sample"), "got: {err}");
}

#[test]
fn rejects_wide_fields() {
    let err = load(&single(r#"{ "opcode": 128 }"#)).unwrap_err();
    assert!(matches!(err, CatalogError::FieldWidth { field: "opcode", .. }));
    let err = load(&single(r#"{ "opcode": 19, "funct3": 8 }"#)).unwrap_err();
    assert!(matches!(err, CatalogError::FieldWidth { field: "funct3", .. }));
}

#[test]
fn rejects_unknown_format() {
    let err = load(&single(r#"{ "opcode": 19, "format": "R4" }"#)).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownFormat { .. }));
}

#[test]
fn rejects_malformed_bit_range() {
    let err = load(&single(r#"{ "opcode": 19, "fields": ["12..31"] }"#)).unwrap_err();
    assert!(matches!(err, CatalogError::BitRange { .. }));
}

#[test]
fn rejects_register_outside_file() {
    let record = r#"{ "opcode": 19, "format": "I",
        "parameters": [ { "name": "rd", "constraints": { "type": "register", "min": 0, "max": 32 } } ] }"#;
    let err = load(&single(record)).unwrap_err();
    assert!(matches!(err, CatalogError::Constraint { .. }));
}

#[test]
fn rejects_inverted_immediate() {
    let record = r#"{ "opcode": 19, "format": "I",
        "parameters": [ { "name": "imm", "constraints": { "type": "immediate", "min": 5, "max": 1 } } ] }"#;
    let err = load(&single(record)).unwrap_err();
    assert!(err.to_string().contains("inverted"), "got: {err}");
}

#[test]
fn rejects_immediate_outside_domain() {
    let record = r#"{ "opcode": 19, "format": "I",
        "parameters": [ { "name": "imm", "constraints": { "type": "immediate", "min": 4000, "max": 5000 } } ] }"#;
    assert!(matches!(load(&single(record)), Err(CatalogError::Constraint { .. })));
}

#[test]
fn fixed_format_immediate_narrowed_to_domain() {
    let record = r#"{ "opcode": 99, "funct3": 0, "format": "B",
        "parameters": [ { "name": "imm", "constraints": { "type": "immediate", "min": -4096, "max": 4094 } } ] }"#;
    let catalog = load(&single(record)).unwrap();
    let def = catalog.definitions().next().unwrap();
    assert_eq!(
        def.operand("imm").unwrap().constraint,
        Constraint::Immediate { min: 0, max: 2047 }
    );
}

#[test]
fn free_format_immediate_keeps_declared_bounds() {
    let record = r#"{ "opcode": 115, "funct3": 1, "format": "Unknown",
        "parameters": [ { "name": "csr", "constraints": { "type": "immediate", "min": 0, "max": 4095 } } ] }"#;
    let catalog = load(&single(record)).unwrap();
    let def = catalog.definitions().next().unwrap();
    assert_eq!(def.resolved_format(), Format::Unknown);
    assert_eq!(
        def.operand("csr").unwrap().constraint,
        Constraint::Immediate { min: 0, max: 4095 }
    );
}

#[test]
fn rejects_immediate_exclusions() {
    let record = r#"{ "opcode": 19, "format": "I",
        "parameters": [ { "name": "imm", "constraints": { "type": "immediate", "exclude": [0] } } ] }"#;
    assert!(matches!(load(&single(record)), Err(CatalogError::Constraint { .. })));
}

#[test]
fn rejects_repeated_operand() {
    let record = r#"{ "opcode": 51, "format": "R",
        "parameters": [ { "name": "rd" }, { "name": "rd" } ] }"#;
    let err = load(&single(record)).unwrap_err();
    assert!(err.to_string().contains("declared twice"), "got: {err}");
}

#[test]
fn load_reports_missing_file() {
    let err = Catalog::load("/definitely/not/here.json", &CatalogConfig::default()).unwrap_err();
    assert!(matches!(err, CatalogError::Read { .. }));
}
