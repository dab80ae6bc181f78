//! Assembly file output for generated cases.

use std::fmt::Write as _;

use crate::generate::TestCase;

/// Renders `cases` as a complete assembly source.
///
/// The output has a text section with a `_start` entry point, one commented
/// line per case and an exit system call at the end.
pub fn render_assembly_file(cases: &[TestCase]) -> String {
    let mut out = String::new();
    out.push_str("# Generated RISC-V test cases\n");
    out.push_str("# Randomly generated instruction test cases\n\n");
    out.push_str(".section .text\n");
    out.push_str(".globl _start\n\n");
    out.push_str("_start:\n");
    for (i, case) in cases.iter().enumerate() {
        let _ = writeln!(out, "    # Test case {}: {}", i + 1, case.description);
        let _ = writeln!(out, "    {}", case.assembly);
    }
    out.push_str("\n    # Program termination\n");
    out.push_str("    li a7, 93     # sys_exit\n");
    out.push_str("    li a0, 0      # exit status\n");
    out.push_str("    ecall\n");
    out
}
