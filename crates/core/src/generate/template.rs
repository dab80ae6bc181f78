//! Assembly template rendering.
//!
//! Templates are plain text with `{role}` placeholders, e.g.
//! `addi x{rd}, x{rs1}, {imm}`. Register prefixes are part of the template.

use std::fmt;

use serde::Serialize;

use crate::generate::Parameter;

/// Non-fatal problems while rendering a template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerateWarning {
    /// The template names a role the instruction does not generate.
    MissingRole {
        /// Template text.
        template: String,
        /// Placeholder without a value.
        role: String,
    },
    /// A `{` without its closing `}`.
    UnterminatedPlaceholder {
        /// Template text.
        template: String,
    },
}

impl fmt::Display for GenerateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRole { template, role } => {
                write!(f, "template '{template}' references missing parameter '{role}'")
            }
            Self::UnterminatedPlaceholder { template } => {
                write!(f, "template '{template}' has an unterminated placeholder")
            }
        }
    }
}

/// Substitutes every `{role}` in `template` with its generated value.
///
/// # Errors
///
/// Returns the first [`GenerateWarning`] encountered; callers fall back to
/// the bare mnemonic.
pub fn render(template: &str, parameters: &[Parameter]) -> Result<String, GenerateWarning> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(GenerateWarning::UnterminatedPlaceholder {
                template: template.to_owned(),
            });
        };
        let role = &after[..close];
        let value = parameters
            .iter()
            .find(|p| p.name == role)
            .ok_or_else(|| GenerateWarning::MissingRole {
                template: template.to_owned(),
                role: role.to_owned(),
            })?;
        out.push_str(&value.value.to_string());
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
