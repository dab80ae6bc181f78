//! Test-Case Generation Tests.
//!
//! Seeded reproducibility, constraint domains, batch bookkeeping, the
//! assembly file writer and the generator → validator round trip.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rvprofile_core::common::error::GenerateError;
use rvprofile_core::config::CatalogConfig;
use rvprofile_core::generate::{GenerateWarning, render_assembly_file};
use rvprofile_core::{Catalog, Format, Generator, Validator};

use crate::common::builtin_catalog;
use crate::common::fixtures::SMALL_CATALOG;

fn small_catalog() -> Catalog {
    Catalog::from_json_str(SMALL_CATALOG, &CatalogConfig::default()).unwrap()
}

fn value(case: &rvprofile_core::generate::TestCase, role: &str) -> i64 {
    case.parameters
        .iter()
        .find(|p| p.name == role)
        .map(|p| p.value)
        .unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Single cases
// ══════════════════════════════════════════════════════════

#[test]
fn same_seed_same_cases() {
    let catalog = builtin_catalog();
    let a = Generator::seeded(&catalog, 42).generate_many("addi", 20).unwrap();
    let b = Generator::seeded(&catalog, 42).generate_many("addi", 20).unwrap();
    assert_eq!(a, b);
}

#[test]
fn generator_accepts_any_rng() {
    let catalog = builtin_catalog();
    let mut generator = Generator::new(&catalog, ChaCha8Rng::seed_from_u64(7));
    let case = generator.generate("lui").unwrap();
    assert_eq!(case.instruction, "lui");
    assert_eq!(case.format, Format::U);
    assert_eq!(case.extension, "I");
    assert_eq!(case.description, "Random test case for lui");
    assert!(case.assembly.starts_with("lui x"));
}

#[test]
fn unknown_instruction_is_an_error() {
    let catalog = builtin_catalog();
    let err = Generator::seeded(&catalog, 0).generate("frobnicate").unwrap_err();
    assert_eq!(err, GenerateError::UnknownInstruction("frobnicate".to_owned()));
}

#[test]
fn values_respect_declared_constraints() {
    let catalog = small_catalog();
    let mut generator = Generator::seeded(&catalog, 1234);
    for case in generator.generate_many("addi", 200).unwrap() {
        let rd = value(&case, "rd");
        let rs1 = value(&case, "rs1");
        let imm = value(&case, "imm");
        assert!((1..=31).contains(&rd), "rd {rd}");
        assert!((0..=31).contains(&rs1) && rs1 != 2, "rs1 {rs1}");
        assert!((-16..=16).contains(&imm), "imm {imm}");
        assert_eq!(case.assembly, format!("addi x{rd}, x{rs1}, {imm}"));
    }
}

#[test]
fn branch_and_jump_immediates_are_even() {
    let catalog = builtin_catalog();
    let mut generator = Generator::seeded(&catalog, 99);
    for name in ["beq", "bgeu", "jal"] {
        for case in generator.generate_many(name, 50).unwrap() {
            assert_eq!(value(&case, "imm") % 2, 0, "{}", case.assembly);
        }
    }
}

#[test]
fn csr_numbers_cover_declared_space() {
    let catalog = builtin_catalog();
    let mut generator = Generator::seeded(&catalog, 7);
    let csrs: Vec<i64> = generator
        .generate_many("csrrw", 2000)
        .unwrap()
        .iter()
        .map(|case| value(case, "csr"))
        .collect();
    assert!(csrs.iter().all(|csr| (0..=4095).contains(csr)));
    assert!(csrs.iter().any(|csr| *csr > 2047), "machine-level CSRs never drawn");
}

#[test]
fn empty_register_domain_is_an_error() {
    let text = r#"{ "rv_i": { "add": { "opcode": 51, "funct3": 0, "funct7": 0, "format": "R",
        "parameters": [ { "name": "rd", "constraints": { "type": "register", "min": 0, "max": 1, "exclude": [0, 1] } } ] } } }"#;
    let catalog = Catalog::from_json_str(text, &CatalogConfig::default()).unwrap();
    let err = Generator::seeded(&catalog, 0).generate("add").unwrap_err();
    assert!(matches!(err, GenerateError::EmptyRegisterDomain { .. }), "got {err:?}");
}

#[test]
fn unknown_constraint_generates_zero() {
    let text = r#"{ "rv_i": { "sample": { "opcode": 11, "format": "I",
        "parameters": [ { "name": "pred" } ], "assembly_template": "sample {pred}" } } }"#;
    let catalog = Catalog::from_json_str(text, &CatalogConfig::default()).unwrap();
    let case = Generator::seeded(&catalog, 0).generate("sample").unwrap();
    assert_eq!(case.assembly, "sample 0");
}

#[test]
fn missing_template_role_falls_back_to_mnemonic() {
    let text = r#"{ "rv_i": { "add": { "opcode": 51, "funct3": 0, "funct7": 0, "format": "R",
        "parameters": [ { "name": "rd" } ], "assembly_template": "add x{rd}, x{rs1}" } } }"#;
    let catalog = Catalog::from_json_str(text, &CatalogConfig::default()).unwrap();
    let case = Generator::seeded(&catalog, 0).generate("add").unwrap();
    assert_eq!(case.assembly, "add");
    assert_eq!(
        case.warnings,
        vec![GenerateWarning::MissingRole {
            template: "add x{rd}, x{rs1}".to_owned(),
            role: "rs1".to_owned(),
        }]
    );
}

// ══════════════════════════════════════════════════════════
// 2. Batches
// ══════════════════════════════════════════════════════════

#[test]
fn suite_collects_missing_names() {
    let catalog = builtin_catalog();
    let suite = Generator::seeded(&catalog, 5).generate_suite(&["add", "bogus", "lw"], 3);

    assert_eq!(suite.metadata.total_instructions, 3);
    assert_eq!(suite.metadata.cases_per_instruction, 3);
    assert_eq!(suite.metadata.total_test_cases, 6);
    assert_eq!(suite.missing, ["bogus"]);
    assert!(suite.failures.is_empty());
    let groups: Vec<&str> = suite.groups.iter().map(|g| g.instruction.as_str()).collect();
    assert_eq!(groups, ["add", "lw"]);
}

#[test]
fn format_batch_splits_total_exactly() {
    let catalog = builtin_catalog();
    // Six B-type instructions share fifteen cases: 3, 3, 3, 2, 2, 2.
    let suite = Generator::seeded(&catalog, 8).generate_for_format(Format::B, 15).unwrap();
    let counts: Vec<usize> = suite.groups.iter().map(|g| g.cases.len()).collect();
    assert_eq!(counts, [3, 3, 3, 2, 2, 2]);
    assert_eq!(suite.metadata.total_test_cases, 15);
    assert!(suite.cases().all(|c| c.format == Format::B));
}

#[test]
fn format_batch_skips_zero_shares() {
    let catalog = builtin_catalog();
    let suite = Generator::seeded(&catalog, 8).generate_for_format(Format::U, 1).unwrap();
    assert_eq!(suite.groups.len(), 1);
    assert_eq!(suite.groups[0].instruction, "lui");
}

#[test]
fn format_batch_without_instructions() {
    let catalog = builtin_catalog();
    let err = Generator::seeded(&catalog, 8).generate_for_format(Format::C, 10).unwrap_err();
    assert_eq!(err, GenerateError::NoInstructionsForFormat(Format::C));
}

#[test]
fn instructions_grouped_by_format() {
    let catalog = builtin_catalog();
    let groups = Generator::seeded(&catalog, 0).instructions_by_format();
    assert_eq!(groups[&Format::J], ["jal"]);
    assert_eq!(groups[&Format::S], ["sb", "sh", "sw"]);
}

// ══════════════════════════════════════════════════════════
// 3. Output and round trip
// ══════════════════════════════════════════════════════════

#[test]
fn assembly_file_layout() {
    let catalog = builtin_catalog();
    let cases = Generator::seeded(&catalog, 3).generate_many("add", 2).unwrap();
    let text = render_assembly_file(&cases);

    let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with("# Generated")).collect();
    assert!(lines.contains(&".section .text"));
    assert!(lines.contains(&".globl _start"));
    assert!(lines.contains(&"_start:"));
    assert!(text.contains("# Test case 1: Random test case for add"));
    assert!(text.contains("# Test case 2: Random test case for add"));
    assert!(text.trim_end().ends_with("ecall"));
}

#[test]
fn assembly_file_validates_cleanly() {
    let catalog = builtin_catalog();
    let all = catalog.names();
    let suite = Generator::seeded(&catalog, 2024).generate_suite(&all, 2);
    let cases = suite.into_cases();
    let text = render_assembly_file(&cases);

    let report = Validator::new(&catalog).validate_source("generated.s", &text).unwrap();
    assert!(report.errors.is_empty(), "{:#?}", report.errors);
    assert!(report.is_valid());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_cases_validate_without_errors(seed in any::<u64>()) {
        let catalog = builtin_catalog();
        let validator = Validator::new(&catalog);
        let mut generator = Generator::seeded(&catalog, seed);
        for name in catalog.names() {
            let case = generator.generate(name).unwrap();
            let result = validator.validate_line(&case.assembly);
            prop_assert!(result.errors.is_empty(), "{}: {:?}", case.assembly, result.errors);
        }
    }
}
