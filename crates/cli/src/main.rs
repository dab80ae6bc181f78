//! RISC-V instruction analysis CLI.
//!
//! This binary provides a single entry point for every operation of the toolkit:
//! 1. **Decode:** One hex word, a raw binary, or a file of hex words, each with the
//!    execution profiles able to run the instructions found.
//! 2. **Profiles:** List the profile database or describe one profile.
//! 3. **Generate:** Random, constraint-legal test cases per instruction or per format.
//! 4. **Validate:** Check an assembly file (optionally confirmed by a real assembler).
//!
//! Logging goes to stderr; `RUST_LOG` overrides the `-v` levels.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rvprofile_core::analyze::{BinaryReport, HexOutcome, HexTextReport, InstructionReport};
use rvprofile_core::generate::{TestSuite, render_assembly_file};
use rvprofile_core::isa::decode::Decoded;
use rvprofile_core::profile::ProfileDescription;
use rvprofile_core::validate::{AssemblerVerdict, FileReport};
use rvprofile_core::{Analyzer, Catalog, Config, Format, Generator, ProfileDatabase, Validator};

/// Total cases for `generate --format` when no count is given.
const FORMAT_BATCH_DEFAULT: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "rvprofile",
    author,
    version,
    about = "RISC-V decoder, profile classifier, test generator and assembly validator",
    long_about = "Decode RISC-V machine code, resolve the execution profiles able to run it, generate random \
                  constraint-legal test instructions, and validate assembly files.\n\nExamples:\n  \
                  rvprofile instruction 0x00b50533\n  rvprofile binary program.bin --offset 64\n  \
                  rvprofile generate addi lw --count 5 --seed 42\n  rvprofile validate test.s --assemble"
)]
struct Cli {
    /// Instruction catalog JSON (defaults to the built-in I/M/Zicsr/Zifencei data).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Profile database JSON (defaults to the built-in database).
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,

    /// Configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one hexadecimal instruction word.
    Instruction {
        /// Word such as 0x00b50533.
        hex: String,
    },

    /// Decode a raw little-endian binary at a 4-byte stride.
    Binary {
        /// Binary file.
        file: PathBuf,

        /// Byte offset of the first instruction.
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Show at most this many instructions in text output.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Decode a text file with one hex word per line (`#` comments allowed).
    Hexfile {
        /// Text file.
        file: PathBuf,
    },

    /// List profiles, or describe one.
    Profiles {
        /// Profile name (e.g. RV32IMC).
        name: Option<String>,
    },

    /// Generate random test cases.
    Generate {
        /// Instructions to generate (all catalog instructions when empty).
        names: Vec<String>,

        /// Generate for every instruction of this format instead (R, I, S, B, U, J).
        #[arg(long, conflicts_with = "names")]
        format: Option<Format>,

        /// Cases per instruction, or the total for --format.
        #[arg(long)]
        count: Option<usize>,

        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Write the cases as an assembly file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// List available instructions by extension.
        #[arg(long)]
        list: bool,

        /// List available instructions by format.
        #[arg(long)]
        list_by_format: bool,
    },

    /// Validate an assembly file.
    Validate {
        /// Assembly file (omit with --stdin).
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read the source from standard input.
        #[arg(long)]
        stdin: bool,

        /// Confirm error-free sources with the external assembler.
        #[arg(long)]
        assemble: bool,

        /// Only print the summary.
        #[arg(long)]
        quiet: bool,
    },
}

/// Failures surfaced as a message and exit code 1.
#[derive(Debug, Error)]
enum CliError {
    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] rvprofile_core::Error),

    /// JSON output could not be produced.
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl CliError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Loaded configuration and read-only tables.
struct Context {
    config: Config,
    catalog: Catalog,
    profiles: ProfileDatabase,
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    process::exit(code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_context(cli: &Cli) -> Result<Context, CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path).map_err(rvprofile_core::Error::from)?,
        None => Config::default(),
    };
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path, &config.catalog),
        None => Catalog::builtin(),
    }
    .map_err(rvprofile_core::Error::from)?;
    let profiles = match &cli.profiles {
        Some(path) => ProfileDatabase::load(path),
        None => ProfileDatabase::builtin(),
    }
    .map_err(rvprofile_core::Error::from)?;
    Ok(Context {
        config,
        catalog,
        profiles,
        json: cli.json,
    })
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let mut ctx = load_context(&cli)?;
    match cli.command {
        Commands::Instruction { hex } => cmd_instruction(&ctx, &hex),
        Commands::Binary {
            file,
            offset,
            limit,
        } => cmd_binary(&ctx, &file, offset, limit),
        Commands::Hexfile { file } => cmd_hexfile(&ctx, &file),
        Commands::Profiles { name } => cmd_profiles(&ctx, name.as_deref()),
        Commands::Generate {
            names,
            format,
            count,
            seed,
            output,
            list,
            list_by_format,
        } => {
            if let Some(seed) = seed {
                ctx.config.generator.seed = Some(seed);
            }
            if list || list_by_format {
                return cmd_list(&ctx, list_by_format);
            }
            cmd_generate(&ctx, &names, format, count, output.as_deref())
        }
        Commands::Validate {
            file,
            stdin,
            assemble,
            quiet,
        } => {
            if assemble {
                ctx.config.validator.assembler.enabled = true;
            }
            cmd_validate(&ctx, file.as_deref(), stdin, quiet)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::io(path, e))
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}

fn print_decoded(decoded: &Decoded) {
    let word = decoded.word();
    match decoded {
        Decoded::Known(inst) => {
            println!("Instruction: {}", inst.name);
            println!("Format:      {}", inst.format);
            println!("Extension:   {}", inst.extension);
        }
        Decoded::Unknown(_) => {
            println!("Instruction: unknown");
            println!("Extension:   {}", decoded.extension());
        }
    }
    println!("Hex:         0x{}", word.hex);
    println!("Binary:      {}", word.binary);
    let f = &word.fields;
    println!(
        "Fields:      opcode={:#04x} rd={} funct3={} rs1={} rs2={} funct7={:#04x}",
        f.opcode, f.rd, f.funct3, f.rs1, f.rs2, f.funct7
    );
}

fn print_profiles_line(profiles: &[String]) {
    if profiles.is_empty() {
        println!("Profiles:    none");
    } else {
        println!("Profiles:    {}", profiles.join(", "));
    }
}

fn cmd_instruction(ctx: &Context, hex: &str) -> Result<i32, CliError> {
    let analyzer = Analyzer::new(&ctx.catalog, &ctx.profiles);
    let report: InstructionReport = analyzer
        .decode_hex(hex)
        .map_err(rvprofile_core::Error::from)?;
    if ctx.json {
        print_json(&report)?;
    } else {
        print_decoded(&report.decoded);
        print_profiles_line(&report.compatible_profiles);
    }
    Ok(0)
}

fn cmd_binary(
    ctx: &Context,
    file: &Path,
    offset: usize,
    limit: Option<usize>,
) -> Result<i32, CliError> {
    let bytes = read_bytes(file)?;
    let analyzer = Analyzer::new(&ctx.catalog, &ctx.profiles);
    let report: BinaryReport = analyzer.decode_binary(&bytes, offset);
    if ctx.json {
        print_json(&report)?;
        return Ok(0);
    }

    let shown = limit.unwrap_or(report.instructions.len());
    println!("Decoded {} instructions from {}", report.instructions.len(), file.display());
    for entry in report.instructions.iter().take(shown) {
        let word = entry.decoded.word();
        println!(
            "  {:08x}: {}  {:<10} {:<8} {}",
            entry.offset,
            word.hex,
            entry.decoded.name().unwrap_or("unknown"),
            entry.decoded.extension(),
            entry.decoded.format()
        );
    }
    if shown < report.instructions.len() {
        println!("  ... {} more", report.instructions.len() - shown);
    }
    if report.trailing_bytes > 0 {
        println!("Trailing bytes: {}", report.trailing_bytes);
    }
    println!("Extensions:  {}", report.extensions_used.join(", "));
    print_profiles_line(&report.compatible_profiles);
    Ok(0)
}

fn cmd_hexfile(ctx: &Context, file: &Path) -> Result<i32, CliError> {
    let text = read_text(file)?;
    let analyzer = Analyzer::new(&ctx.catalog, &ctx.profiles);
    let report: HexTextReport = analyzer.decode_hex_text(&text);
    let code = i32::from(report.error_count() > 0);
    if ctx.json {
        print_json(&report)?;
        return Ok(code);
    }

    for entry in &report.entries {
        match &entry.outcome {
            HexOutcome::Decoded(decoded) => println!(
                "L{}: {}  {:<10} {:<8} {}",
                entry.line,
                decoded.word().hex,
                decoded.name().unwrap_or("unknown"),
                decoded.extension(),
                decoded.format()
            ),
            HexOutcome::Error(err) => println!("L{}: error: {err}", entry.line),
        }
    }
    println!("Extensions:  {}", report.extensions_used.join(", "));
    print_profiles_line(&report.compatible_profiles);
    Ok(code)
}

fn print_description(desc: &ProfileDescription) {
    println!("{} ({})", desc.name, desc.status);
    println!("  {}", desc.description);
    println!(
        "  Base ISA:    {} ({})",
        desc.base.key,
        desc.base.description.as_deref().unwrap_or("undocumented base ISA")
    );
    println!("  Typical use: {}", desc.typical_use);
    println!("  Mandatory:");
    for ext in &desc.mandatory {
        println!("    {:<10} {}", ext.key, ext.description.as_deref().unwrap_or("(undocumented)"));
    }
    println!("  Optional:");
    for ext in &desc.optional {
        println!("    {:<10} {}", ext.key, ext.description.as_deref().unwrap_or("(undocumented)"));
    }
}

fn cmd_profiles(ctx: &Context, name: Option<&str>) -> Result<i32, CliError> {
    if let Some(name) = name {
        let desc = ctx
            .profiles
            .describe(name)
            .map_err(rvprofile_core::Error::from)?;
        if ctx.json {
            print_json(&desc)?;
        } else {
            print_description(&desc);
        }
        return Ok(0);
    }

    if ctx.json {
        print_json(&ctx.profiles.profiles())?;
        return Ok(0);
    }
    for profile in ctx.profiles.profiles() {
        println!(
            "{:<10} {:<10} mandatory: {}",
            profile.name,
            profile.status,
            profile.mandatory_extensions.join(", ")
        );
    }
    Ok(0)
}

fn cmd_list(ctx: &Context, by_format: bool) -> Result<i32, CliError> {
    if by_format {
        let groups: BTreeMap<Format, Vec<&str>> = ctx
            .catalog
            .by_format()
            .into_iter()
            .map(|(format, defs)| (format, defs.iter().map(|d| d.name.as_str()).collect()))
            .collect();
        if ctx.json {
            print_json(&groups)?;
        } else {
            for (format, names) in &groups {
                println!("{format}: {}", names.join(", "));
            }
        }
        return Ok(0);
    }

    if ctx.json {
        print_json(&ctx.catalog.extensions())?;
        return Ok(0);
    }
    for extension in ctx.catalog.extensions() {
        let names: Vec<&str> = extension.definitions.iter().map(|d| d.name.as_str()).collect();
        println!("{}: {}", extension.name, names.join(", "));
    }
    Ok(0)
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    seed: u64,
    #[serde(flatten)]
    suite: &'a TestSuite,
}

fn cmd_generate(
    ctx: &Context,
    names: &[String],
    format: Option<Format>,
    count: Option<usize>,
    output: Option<&Path>,
) -> Result<i32, CliError> {
    let seed = ctx.config.generator.seed.unwrap_or_else(rand::random::<u64>);
    info!(seed, "generator seeded");
    let mut generator = Generator::seeded(&ctx.catalog, seed);

    let suite = match format {
        Some(format) => generator
            .generate_for_format(format, count.unwrap_or(FORMAT_BATCH_DEFAULT))
            .map_err(rvprofile_core::Error::from)?,
        None if names.is_empty() => {
            let all = ctx.catalog.names();
            generator.generate_suite(&all, count.unwrap_or(ctx.config.generator.count))
        }
        None => generator.generate_suite(names, count.unwrap_or(ctx.config.generator.count)),
    };

    if let Some(path) = output {
        let cases: Vec<_> = suite.cases().cloned().collect();
        fs::write(path, render_assembly_file(&cases)).map_err(|e| CliError::io(path, e))?;
        info!(path = %path.display(), cases = cases.len(), "assembly file written");
    }

    if ctx.json {
        print_json(&GenerateOutput { seed, suite: &suite })?;
    } else {
        println!("# seed {seed}");
        for case in suite.cases() {
            println!(
                "{:<32} # {} ({}-type, {})",
                case.assembly, case.instruction, case.format, case.extension
            );
            for warning in &case.warnings {
                println!("    warning: {warning}");
            }
        }
        for name in &suite.missing {
            eprintln!("warning: instruction '{name}' not found");
        }
        for failure in &suite.failures {
            eprintln!("warning: {}: {}", failure.instruction, failure.reason);
        }
    }
    Ok(i32::from(!suite.missing.is_empty() || !suite.failures.is_empty()))
}

fn print_report(report: &FileReport, quiet: bool) {
    println!("Source:              {}", report.source);
    println!("Total lines:         {}", report.total_lines);
    println!("Instruction lines:   {}", report.instruction_lines);
    println!("Valid instructions:  {}", report.valid_instructions);
    if !quiet {
        for error in &report.errors {
            println!("  error   {error}");
        }
        for warning in &report.warnings {
            println!("  warning {warning}");
        }
    }
    if let Some(verdict) = &report.assembler {
        match verdict {
            AssemblerVerdict::Accepted => {
                println!("Assembler:           accepted");
            }
            AssemblerVerdict::Rejected { output } => {
                println!("Assembler:           rejected");
                if !quiet {
                    println!("{output}");
                }
            }
            AssemblerVerdict::Unavailable { program } => {
                println!("Assembler:           '{program}' not found, skipped");
            }
        }
    }
    println!("Result:              {}", if report.is_valid() { "VALID" } else { "INVALID" });
}

fn cmd_validate(
    ctx: &Context,
    file: Option<&Path>,
    stdin: bool,
    quiet: bool,
) -> Result<i32, CliError> {
    let validator = Validator::new(&ctx.catalog).with_assembler(&ctx.config.validator.assembler);
    let report = match file {
        Some(path) if !stdin => validator.validate_file(path)?,
        _ => {
            let mut text = String::new();
            let _ = io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CliError::io(Path::new("<stdin>"), e))?;
            validator
                .validate_source("<stdin>", &text)
                .map_err(rvprofile_core::Error::from)?
        }
    };

    if ctx.json {
        print_json(&report)?;
    } else {
        print_report(&report, quiet);
    }
    Ok(report.exit_code())
}
