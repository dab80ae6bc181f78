//! Profile Resolution Tests.
//!
//! Verifies the subset rule over the embedded database, declaration order of
//! results, and profile descriptions against an injected fixture database.

use pretty_assertions::assert_eq;
use rstest::rstest;

use rvprofile_core::ProfileDatabase;
use rvprofile_core::common::error::ProfileError;
use rvprofile_core::profile::ExtensionDescription;

use crate::common::builtin_profiles;
use crate::common::fixtures::SMALL_PROFILES;

// ──────────────────────────────────────────────────────────
// Compatibility
// ──────────────────────────────────────────────────────────

#[test]
fn base_and_multiply_resolve_to_plain_integer_profiles() {
    let db = builtin_profiles();
    assert_eq!(db.compatible(["I", "M"]), ["RV32I", "RV64I", "RV128I"]);
}

#[rstest]
#[case(&["I"], &["RV32I", "RV64I", "RV128I"])]
#[case(&["E"], &["RV32E"])]
#[case(&["I", "M", "C"], &["RV32I", "RV64I", "RV128I", "RV32IMC", "RV64IMC"])]
#[case(&["M"], &[])]
#[case(&[], &[])]
fn compatible_profiles(#[case] extensions: &[&str], #[case] expected: &[&str]) {
    let db = builtin_profiles();
    assert_eq!(db.compatible(extensions.iter().copied()), expected);
}

#[test]
fn full_general_purpose_set_admits_gc() {
    let db = builtin_profiles();
    let set = ["I", "M", "A", "F", "D", "C", "Zicsr", "Zifencei"];
    let result = db.compatible(set);
    assert!(result.contains(&"RV32GC"));
    assert!(result.contains(&"RV64GC"));
    assert!(!result.contains(&"RV32E"));
}

#[test]
fn input_order_and_duplicates_do_not_matter() {
    let db = builtin_profiles();
    assert_eq!(db.compatible(["M", "I", "M", "I"]), db.compatible(["I", "M"]));
}

#[test]
fn owned_strings_are_accepted() {
    let db = builtin_profiles();
    let set: Vec<String> = vec!["I".to_owned()];
    assert_eq!(db.compatible(&set), ["RV32I", "RV64I", "RV128I"]);
}

// ──────────────────────────────────────────────────────────
// Database and descriptions
// ──────────────────────────────────────────────────────────

#[test]
fn profiles_keep_declaration_order() {
    let db = ProfileDatabase::from_json_str(SMALL_PROFILES).unwrap();
    let names: Vec<&str> = db.profiles().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["TINY", "MATHY"]);
    assert_eq!(db.extension("M").unwrap().key, "M");
    assert!(db.profile("NOPE").is_none());
}

#[test]
fn describe_attaches_extension_descriptions() {
    let db = ProfileDatabase::from_json_str(SMALL_PROFILES).unwrap();
    let desc = db.describe("MATHY").unwrap();

    assert_eq!(desc.name, "MATHY");
    assert_eq!(
        desc.base,
        ExtensionDescription {
            key: "RV32I".to_owned(),
            description: Some("Base integer ISA".to_owned()),
        }
    );
    assert_eq!(desc.status, "draft");
    assert_eq!(
        desc.mandatory,
        vec![
            ExtensionDescription {
                key: "I".to_owned(),
                description: Some("Base integer ISA".to_owned()),
            },
            ExtensionDescription {
                key: "M".to_owned(),
                description: Some("Integer multiply and divide".to_owned()),
            },
        ]
    );
    // Undocumented extensions are kept without a description.
    assert_eq!(
        desc.optional,
        vec![ExtensionDescription {
            key: "Xvendor".to_owned(),
            description: None,
        }]
    );
}

#[rstest]
#[case("RV64GC", "RV64I", "Base integer instructions")]
#[case("RV128I", "RV128I", "Base integer instructions")]
#[case("RV32E", "RV32E", "Reduced version of I")]
fn describe_includes_base_isa(#[case] profile: &str, #[case] base: &str, #[case] prefix: &str) {
    let db = builtin_profiles();
    let desc = db.describe(profile).unwrap();
    assert_eq!(desc.base.key, base);
    let description = desc.base.description.unwrap();
    assert!(description.starts_with(prefix), "{profile}: {description}");
}

#[test]
fn describe_unknown_profile() {
    let db = builtin_profiles();
    let err = db.describe("RV99Z").unwrap_err();
    assert!(matches!(&err, ProfileError::UnknownProfile(name) if name == "RV99Z"));
}

#[test]
fn malformed_database_is_rejected() {
    let err = ProfileDatabase::from_json_str(r#"{ "profiles": [] }"#).unwrap_err();
    assert!(matches!(err, ProfileError::Parse(_)));
}
