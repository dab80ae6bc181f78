//! Profile database records and loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::ProfileError;
use crate::common::ordered::OrderedMap;

/// Built-in profile database.
const BUILTIN_PROFILES: &str = include_str!("../../data/profiles.json");

/// One execution profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// Profile name (`RV32I`, `RV64GC`, ...). Taken from the document key.
    #[serde(skip_deserializing)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Base ISA name.
    #[serde(default)]
    pub base_isa: String,
    /// Extensions a target must implement.
    #[serde(default)]
    pub mandatory_extensions: Vec<String>,
    /// Extensions a target may implement.
    #[serde(default)]
    pub optional_extensions: Vec<String>,
    /// Ratification status.
    #[serde(default)]
    pub status: String,
    /// Typical deployment.
    #[serde(default)]
    pub typical_use: String,
}

/// Documentation for one extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Extension key (`M`, `Zicsr`, ...). Taken from the document key.
    #[serde(skip_deserializing)]
    pub key: String,
    /// Long name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ratification status.
    #[serde(default)]
    pub status: String,
    /// Grouping (`base`, `arithmetic`, `bit-manipulation`, ...).
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    #[serde(default)]
    profiles: OrderedMap<ProfileDefinition>,
    #[serde(default)]
    extensions: OrderedMap<ExtensionInfo>,
}

/// Read-only profile and extension tables.
#[derive(Clone, Debug, Default)]
pub struct ProfileDatabase {
    pub(crate) profiles: Vec<ProfileDefinition>,
    pub(crate) extensions: Vec<ExtensionInfo>,
}

impl ProfileDatabase {
    /// Loads the embedded database.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded data is malformed.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_json_str(BUILTIN_PROFILES)
    }

    /// Reads and parses a database file.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Read`] or [`ProfileError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a database from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Parse`] when the document is malformed.
    pub fn from_json_str(text: &str) -> Result<Self, ProfileError> {
        let raw: RawDatabase = serde_json::from_str(text)?;
        let profiles: Vec<ProfileDefinition> = raw
            .profiles
            .into_entries()
            .into_iter()
            .map(|(name, mut profile)| {
                profile.name = name;
                profile
            })
            .collect();
        let extensions: Vec<ExtensionInfo> = raw
            .extensions
            .into_entries()
            .into_iter()
            .map(|(key, mut info)| {
                info.key = key;
                info
            })
            .collect();
        debug!(
            profiles = profiles.len(),
            extensions = extensions.len(),
            "profile database loaded"
        );
        Ok(Self {
            profiles,
            extensions,
        })
    }

    /// Profiles in declaration order.
    pub fn profiles(&self) -> &[ProfileDefinition] {
        &self.profiles
    }

    /// Profile by name.
    pub fn profile(&self, name: &str) -> Option<&ProfileDefinition> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Documented extensions in declaration order.
    pub fn extensions(&self) -> &[ExtensionInfo] {
        &self.extensions
    }

    /// Extension documentation by key.
    pub fn extension(&self, key: &str) -> Option<&ExtensionInfo> {
        self.extensions.iter().find(|e| e.key == key)
    }
}
