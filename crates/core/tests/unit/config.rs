//! Configuration Tests.

use rvprofile_core::Config;
use rvprofile_core::common::error::ConfigError;

#[test]
fn empty_document_matches_defaults() {
    let config = Config::from_json_str("{}").unwrap();
    assert!(!config.catalog.reject_duplicates);
    assert_eq!(config.generator.seed, None);
    assert_eq!(config.generator.count, 1);
    assert!(!config.validator.assembler.enabled);
    assert_eq!(config.validator.assembler.program, "riscv32-unknown-elf-as");
    assert_eq!(config.validator.assembler.march, "rv32gc");

    let default = Config::default();
    assert_eq!(default.generator.count, config.generator.count);
    assert_eq!(default.validator.assembler.program, config.validator.assembler.program);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let text = r#"{
        "generator": { "seed": 42 },
        "validator": { "assembler": { "enabled": true, "march": "rv32im" } }
    }"#;
    let config = Config::from_json_str(text).unwrap();
    assert_eq!(config.generator.seed, Some(42));
    assert_eq!(config.generator.count, 1);
    assert!(config.validator.assembler.enabled);
    assert_eq!(config.validator.assembler.march, "rv32im");
    assert_eq!(config.validator.assembler.program, "riscv32-unknown-elf-as");
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rvprofile.json");
    std::fs::write(&path, r#"{ "catalog": { "reject_duplicates": true } }"#).unwrap();
    let config = Config::load(&path).unwrap();
    assert!(config.catalog.reject_duplicates);
}

#[test]
fn load_errors() {
    assert!(matches!(Config::load("/no/such/config.json"), Err(ConfigError::Read { .. })));
    assert!(matches!(Config::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
}
