//! Common utilities and types used throughout the crate.
//!
//! This module provides building blocks shared by every component:
//! 1. **Constants:** Register file size, immediate domains and encoding masks.
//! 2. **Error Handling:** One error enum per component plus the umbrella `Error`.
//! 3. **Ordered Maps:** A serde helper that keeps JSON object keys in declaration order.

/// Constants for register ranges, immediate domains and masks.
pub mod constants;

/// Error types for every component.
pub mod error;

/// Declaration-order preserving JSON object deserialization.
pub mod ordered;

pub use error::{Error, Result};
pub use ordered::OrderedMap;
