//! External assembler oracle.
//!
//! An error-free buffer can be handed to a real assembler for byte-exact
//! confirmation. The buffer is written into a scoped temporary directory that is
//! removed on every exit path. A missing assembler is a verdict
//! ([`AssemblerVerdict::Unavailable`]), not an error.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;
use tracing::{debug, warn};

use crate::common::error::AssemblerError;
use crate::config::AssemblerConfig;

/// Prefix of the scratch directory.
const SCRATCH_PREFIX: &str = "rvprofile_validate_";

/// Header prepended to buffers without any directive.
const WRAP_HEADER: &str = ".section .text\n.globl _start\n_start:\n";

/// What the assembler said about a buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssemblerVerdict {
    /// Assembled without errors.
    Accepted,
    /// Assembly failed.
    Rejected {
        /// Captured stdout followed by stderr.
        output: String,
    },
    /// The assembler binary was not found.
    Unavailable {
        /// Program that was looked up.
        program: String,
    },
}

/// Drives one external assembler.
#[derive(Clone, Debug)]
pub struct Assembler {
    program: String,
    march: String,
}

impl Assembler {
    /// Assembler described by `config`.
    pub fn new(config: &AssemblerConfig) -> Self {
        Self {
            program: config.program.clone(),
            march: config.march.clone(),
        }
    }

    /// Locates the binary on `PATH` (or as given, when it is a path).
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    /// Assembles `source`.
    ///
    /// # Errors
    ///
    /// [`AssemblerError::Scratch`] if the scratch directory or input file cannot
    /// be created, [`AssemblerError::Spawn`] if the binary exists but cannot be
    /// started.
    pub fn check(&self, source: &str) -> Result<AssemblerVerdict, AssemblerError> {
        let Some(binary) = self.locate() else {
            warn!(program = %self.program, "assembler not found; skipping byte-exact check");
            return Ok(self.unavailable());
        };

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(AssemblerError::Scratch)?;
        let input = scratch.path().join("temp.s");
        let object = scratch.path().join("temp.o");
        fs::write(&input, wrap(source)).map_err(AssemblerError::Scratch)?;

        let output = Command::new(&binary)
            .arg(format!("-march={}", self.march))
            .arg("-o")
            .arg(&object)
            .arg(&input)
            .output();
        let output = match output {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(self.unavailable()),
            Err(source) => {
                return Err(AssemblerError::Spawn {
                    program: binary.display().to_string(),
                    source,
                });
            }
        };

        debug!(program = %binary.display(), status = %output.status, "assembler finished");
        if output.status.success() {
            Ok(AssemblerVerdict::Accepted)
        } else {
            Ok(AssemblerVerdict::Rejected {
                output: format!(
                    "{}{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                ),
            })
        }
    }

    fn unavailable(&self) -> AssemblerVerdict {
        AssemblerVerdict::Unavailable {
            program: self.program.clone(),
        }
    }
}

/// Prepends a text section and `_start` unless some line is a directive.
pub fn wrap(source: &str) -> String {
    if source.lines().any(|l| l.trim_start().starts_with('.')) {
        source.to_owned()
    } else {
        format!("{WRAP_HEADER}{source}")
    }
}
