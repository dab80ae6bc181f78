//! Constraint-validated random test generation.
//!
//! This module provides:
//! 1. **Draws:** Registers uniformly from their allowed indices, immediates
//!    uniformly from their domain followed by the format re-encoding.
//! 2. **Rendering:** Substitution of the drawn values into the catalog template
//!    ([`template`]) and whole-file output ([`writer`]).
//! 3. **Batches:** Per-instruction suites and format-wide batches.
//!
//! The random source is always passed in; [`Generator::seeded`] builds a
//! reproducible ChaCha stream from a `u64` seed.

/// Template substitution.
pub mod template;
/// Assembly file output.
pub mod writer;

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::error::GenerateError;
use crate::isa::catalog::{Catalog, Constraint, InstructionDefinition};
use crate::isa::format::Format;

pub use template::GenerateWarning;
pub use writer::render_assembly_file;

/// One generated operand value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Role name.
    pub name: String,
    /// Drawn (and, for immediates, re-encoded) value.
    pub value: i64,
}

/// A generated instruction instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Mnemonic.
    pub instruction: String,
    /// Extension of the definition.
    pub extension: String,
    /// Resolved format.
    pub format: Format,
    /// Operand values in declaration order.
    pub parameters: Vec<Parameter>,
    /// Rendered assembly line.
    pub assembly: String,
    /// Short description.
    pub description: String,
    /// Rendering problems; `assembly` is the bare mnemonic when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<GenerateWarning>,
}

/// Cases generated for one instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseGroup {
    /// Mnemonic.
    pub instruction: String,
    /// Generated cases.
    pub cases: Vec<TestCase>,
}

/// An instruction that could not be generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Mnemonic.
    pub instruction: String,
    /// Error message.
    pub reason: String,
}

/// Summary counts of a suite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SuiteMetadata {
    /// Instructions requested.
    pub total_instructions: usize,
    /// Cases requested per instruction (format batches: the even share).
    pub cases_per_instruction: usize,
    /// Cases actually generated.
    pub total_test_cases: usize,
}

/// Result of a batch: grouped cases plus everything that did not generate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    /// Summary counts.
    pub metadata: SuiteMetadata,
    /// Cases per instruction, in request order.
    pub groups: Vec<CaseGroup>,
    /// Requested names absent from the catalog.
    pub missing: Vec<String>,
    /// Instructions whose constraints could not be satisfied.
    pub failures: Vec<Failure>,
}

impl TestSuite {
    /// All cases in order.
    pub fn cases(&self) -> impl Iterator<Item = &TestCase> + '_ {
        self.groups.iter().flat_map(|g| g.cases.iter())
    }

    /// Cases in order, consuming the suite.
    pub fn into_cases(self) -> Vec<TestCase> {
        self.groups.into_iter().flat_map(|g| g.cases).collect()
    }
}

/// Random test generator over a borrowed catalog.
#[derive(Debug)]
pub struct Generator<'c, R> {
    catalog: &'c Catalog,
    rng: R,
}

impl<'c> Generator<'c, ChaCha8Rng> {
    /// Generator with a reproducible stream for `seed`.
    pub fn seeded(catalog: &'c Catalog, seed: u64) -> Self {
        Self::new(catalog, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<'c, R: Rng> Generator<'c, R> {
    /// Generator drawing from `rng`.
    pub const fn new(catalog: &'c Catalog, rng: R) -> Self {
        Self { catalog, rng }
    }

    /// Mnemonics grouped by resolved format.
    pub fn instructions_by_format(&self) -> BTreeMap<Format, Vec<&'c str>> {
        let catalog: &'c Catalog = self.catalog;
        catalog
            .by_format()
            .into_iter()
            .map(|(format, defs)| (format, defs.into_iter().map(|d| d.name.as_str()).collect()))
            .collect()
    }

    /// Generates one case for `name`.
    ///
    /// # Errors
    ///
    /// [`GenerateError::UnknownInstruction`] if `name` is not in the catalog,
    /// [`GenerateError::EmptyRegisterDomain`] if exclusions leave no register.
    pub fn generate(&mut self, name: &str) -> Result<TestCase, GenerateError> {
        let catalog = self.catalog;
        let def = catalog
            .get(name)
            .ok_or_else(|| GenerateError::UnknownInstruction(name.to_owned()))?;
        self.generate_from(def)
    }

    /// Generates `count` independent cases for `name`.
    ///
    /// # Errors
    ///
    /// See [`Generator::generate`].
    pub fn generate_many(&mut self, name: &str, count: usize) -> Result<Vec<TestCase>, GenerateError> {
        let catalog = self.catalog;
        let def = catalog
            .get(name)
            .ok_or_else(|| GenerateError::UnknownInstruction(name.to_owned()))?;
        (0..count).map(|_| self.generate_from(def)).collect()
    }

    /// Generates `per_instruction` cases for each of `names`.
    ///
    /// Unknown names and unsatisfiable constraints are collected, never fatal.
    pub fn generate_suite<S: AsRef<str>>(&mut self, names: &[S], per_instruction: usize) -> TestSuite {
        let mut suite = TestSuite {
            metadata: SuiteMetadata {
                total_instructions: names.len(),
                cases_per_instruction: per_instruction,
                total_test_cases: 0,
            },
            ..TestSuite::default()
        };
        for name in names {
            let name = name.as_ref();
            match self.generate_many(name, per_instruction) {
                Ok(cases) => suite.groups.push(CaseGroup {
                    instruction: name.to_owned(),
                    cases,
                }),
                Err(GenerateError::UnknownInstruction(_)) => {
                    warn!(instruction = name, "no test cases generated: unknown instruction");
                    suite.missing.push(name.to_owned());
                }
                Err(err) => {
                    warn!(instruction = name, error = %err, "no test cases generated");
                    suite.failures.push(Failure {
                        instruction: name.to_owned(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        suite.metadata.total_test_cases = suite.cases().count();
        suite
    }

    /// Spreads `total` cases over every instruction whose resolved format is `format`.
    ///
    /// Each instruction gets `total / n` cases and the first `total % n`
    /// instructions one more; instructions left with zero cases are skipped.
    ///
    /// # Errors
    ///
    /// [`GenerateError::NoInstructionsForFormat`] when nothing has that format.
    pub fn generate_for_format(&mut self, format: Format, total: usize) -> Result<TestSuite, GenerateError> {
        let catalog = self.catalog;
        let defs: Vec<&InstructionDefinition> = catalog
            .definitions()
            .filter(|d| d.resolved_format() == format)
            .collect();
        if defs.is_empty() {
            return Err(GenerateError::NoInstructionsForFormat(format));
        }

        let base = total / defs.len();
        let remainder = total % defs.len();
        let mut suite = TestSuite {
            metadata: SuiteMetadata {
                total_instructions: defs.len(),
                cases_per_instruction: base,
                total_test_cases: 0,
            },
            ..TestSuite::default()
        };
        for (i, def) in defs.into_iter().enumerate() {
            let count = base + usize::from(i < remainder);
            if count == 0 {
                continue;
            }
            let cases: Result<Vec<_>, _> = (0..count).map(|_| self.generate_from(def)).collect();
            match cases {
                Ok(cases) => suite.groups.push(CaseGroup {
                    instruction: def.name.clone(),
                    cases,
                }),
                Err(err) => suite.failures.push(Failure {
                    instruction: def.name.clone(),
                    reason: err.to_string(),
                }),
            }
        }
        suite.metadata.total_test_cases = suite.cases().count();
        debug!(%format, total, generated = suite.metadata.total_test_cases, "format batch generated");
        Ok(suite)
    }

    fn generate_from(&mut self, def: &InstructionDefinition) -> Result<TestCase, GenerateError> {
        let format = def.resolved_format();
        let mut parameters = Vec::with_capacity(def.operands.len());
        for operand in &def.operands {
            let value = match &operand.constraint {
                Constraint::Register { min, max, exclude } => {
                    let candidates: Vec<i64> =
                        (*min..=*max).filter(|r| !exclude.contains(r)).collect();
                    *candidates.choose(&mut self.rng).ok_or_else(|| {
                        GenerateError::EmptyRegisterDomain {
                            instruction: def.name.clone(),
                            parameter: operand.name.clone(),
                            min: *min,
                            max: *max,
                        }
                    })?
                }
                Constraint::Immediate { min, max } => {
                    format.encode_immediate(self.rng.gen_range(*min..=*max))
                }
                Constraint::Unknown => 0,
            };
            parameters.push(Parameter {
                name: operand.name.clone(),
                value,
            });
        }

        let mut warnings = Vec::new();
        let assembly = match template::render(&def.template, &parameters) {
            Ok(text) => text,
            Err(warning) => {
                warn!(instruction = %def.name, %warning, "falling back to bare mnemonic");
                warnings.push(warning);
                def.name.clone()
            }
        };

        Ok(TestCase {
            instruction: def.name.clone(),
            extension: def.extension.clone(),
            format,
            parameters,
            assembly,
            description: format!("Random test case for {}", def.name),
            warnings,
        })
    }
}
