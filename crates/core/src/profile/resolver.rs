//! Profile compatibility and descriptions.
//!
//! A profile is compatible with an extension set when every mandatory extension
//! of the profile is in the set. Optional extensions never affect the answer.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::error::ProfileError;
use crate::profile::database::ProfileDatabase;

/// One extension in a profile description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtensionDescription {
    /// Extension key.
    pub key: String,
    /// Description from the database, if documented.
    pub description: Option<String>,
}

/// Human-readable summary of one profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileDescription {
    /// Profile name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Base ISA, described by its base extension (`RV64I` → `I`).
    pub base: ExtensionDescription,
    /// Mandatory extensions, in profile order.
    pub mandatory: Vec<ExtensionDescription>,
    /// Optional extensions, in profile order.
    pub optional: Vec<ExtensionDescription>,
    /// Ratification status.
    pub status: String,
    /// Typical deployment.
    pub typical_use: String,
}

impl ProfileDatabase {
    /// Names of the profiles able to run `extensions`, in declaration order.
    ///
    /// Duplicates and ordering of the input do not matter.
    pub fn compatible<I, S>(&self, extensions: I) -> Vec<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available: BTreeSet<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().to_owned())
            .collect();
        self.profiles
            .iter()
            .filter(|p| {
                p.mandatory_extensions
                    .iter()
                    .all(|m| available.contains(m))
            })
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Describes one profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownProfile`] when no such profile exists.
    pub fn describe(&self, name: &str) -> Result<ProfileDescription, ProfileError> {
        let profile = self
            .profile(name)
            .ok_or_else(|| ProfileError::UnknownProfile(name.to_owned()))?;
        let describe_all = |keys: &[String]| -> Vec<ExtensionDescription> {
            keys.iter()
                .map(|key| ExtensionDescription {
                    key: key.clone(),
                    description: self.extension(key).map(|e| e.description.clone()),
                })
                .collect()
        };
        Ok(ProfileDescription {
            name: profile.name.clone(),
            description: profile.description.clone(),
            base: ExtensionDescription {
                key: profile.base_isa.clone(),
                description: self
                    .extension(&profile.base_isa)
                    .or_else(|| self.extension(base_extension(&profile.base_isa)))
                    .map(|e| e.description.clone()),
            },
            mandatory: describe_all(&profile.mandatory_extensions),
            optional: describe_all(&profile.optional_extensions),
            status: profile.status.clone(),
            typical_use: profile.typical_use.clone(),
        })
    }
}

/// Base extension letter of a base ISA name: `RV32I` → `I`, `RV32E` → `E`.
fn base_extension(base_isa: &str) -> &str {
    base_isa
        .strip_prefix("RV")
        .map_or(base_isa, |rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
}
