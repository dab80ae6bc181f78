//! Execution profiles.
//!
//! A profile bundles a base ISA with a mandatory and an optional extension set.
//! This module provides:
//! 1. **Database:** Profile and extension records loaded once from JSON, kept in
//!    declaration order.
//! 2. **Resolver:** Which profiles can run a given set of extensions, and
//!    human-readable descriptions of a single profile.

/// Profile and extension records.
pub mod database;
/// Compatibility resolution and profile descriptions.
pub mod resolver;

pub use database::{ExtensionInfo, ProfileDatabase, ProfileDefinition};
pub use resolver::{ExtensionDescription, ProfileDescription};
