//! Line classification.
//!
//! Every input line is classified once, in this order: empty (blank or only a
//! comment), label, directive, instruction. A label in front of an instruction
//! (`loop: addi x1, x1, -1`) is dropped and the rest classified again.

use serde::Serialize;

/// Terminal classification of one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LineKind {
    /// Blank or comment-only.
    Empty,
    /// `identifier:` on its own.
    Label,
    /// Starts with `.`.
    Directive,
    /// Mnemonic plus operands.
    Instruction,
    /// Not parseable.
    Unknown,
}

impl LineKind {
    /// Whether the line counts towards the instruction-line total.
    pub const fn counts_as_instruction(self) -> bool {
        !matches!(self, Self::Empty | Self::Label)
    }
}

/// Structure of one line, before any catalog lookup.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed<'a> {
    Empty,
    Label(&'a str),
    Directive(&'a str),
    Instruction {
        mnemonic: String,
        operands: Vec<&'a str>,
    },
    Malformed(&'a str),
}

/// Drops everything from the first `#`.
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$') => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))
        }
        Some(c) if c.is_ascii_digit() => chars.all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn is_mnemonic(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
}

pub(crate) fn parse(line: &str) -> Parsed<'_> {
    let mut code = strip_comment(line).trim();
    if code.is_empty() {
        return Parsed::Empty;
    }

    if let Some((name, rest)) = code
        .split_once(':')
        .filter(|(name, _)| is_label_name(name.trim_end()))
    {
        let rest = rest.trim();
        if rest.is_empty() {
            return Parsed::Label(name.trim_end());
        }
        code = rest;
    }

    if code.starts_with('.') {
        return Parsed::Directive(code);
    }

    let (head, tail) = code
        .split_once(char::is_whitespace)
        .map_or((code, ""), |(h, t)| (h, t.trim()));
    if !is_mnemonic(head) {
        return Parsed::Malformed(code);
    }
    let operands = tail
        .split(',')
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .collect();
    Parsed::Instruction {
        mnemonic: head.to_ascii_lowercase(),
        operands,
    }
}
