//! Instruction catalog.
//!
//! The catalog is built once from a JSON document of the shape
//! `{ extension: { mnemonic: record } }` and is read-only afterwards. Every
//! record is validated eagerly: field widths, the format tag, bit ranges and
//! operand constraints are checked at load time so that decode, generate and
//! validate never see a half-formed definition.
//!
//! Extensions are kept in decode precedence order: the base ISA (`I`, `E`)
//! first, then single-letter standard extensions, then `Z*` extensions, then
//! anything else. Within a class the declaration order of the document is kept.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::constants::MAX_REGISTER;
use crate::common::error::CatalogError;
use crate::common::ordered::OrderedMap;
use crate::config::CatalogConfig;
use crate::isa::format::{self, BitRange, FieldSignature, Format};
use crate::isa::instruction::{FUNCT3_MASK, FUNCT7_MASK, InstructionBits, OPCODE_MASK};

/// Built-in instruction data (I, M, Zicsr, Zifencei).
const BUILTIN_OPCODES: &str = include_str!("../../data/opcodes.json");

/// Role names that are registers when a record omits the constraint kind.
const REGISTER_ROLES: [&str; 4] = ["rd", "rs1", "rs2", "rs3"];

/// Role names that are immediates when a record omits the constraint kind.
const IMMEDIATE_ROLES: [&str; 5] = ["imm", "shamt", "csr", "uimm", "zimm"];

#[derive(Debug, Deserialize)]
struct RawRecord {
    opcode: u32,
    #[serde(default)]
    funct3: Option<u32>,
    #[serde(default)]
    funct7: Option<u32>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    #[serde(default)]
    assembly_template: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(default)]
    constraints: RawConstraints,
}

#[derive(Debug, Default, Deserialize)]
struct RawConstraints {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default)]
    exclude: Vec<i64>,
}

/// Numeric domain of one operand role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constraint {
    /// Integer register index in `[min, max]` minus `exclude`.
    Register {
        /// Lowest index.
        min: i64,
        /// Highest index.
        max: i64,
        /// Indices never drawn.
        exclude: Vec<i64>,
    },
    /// Immediate in `[min, max]` before format re-encoding.
    Immediate {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// Operand of unknown kind; generated as 0.
    Unknown,
}

impl Constraint {
    /// Whether this operand is a register.
    pub const fn is_register(&self) -> bool {
        matches!(self, Self::Register { .. })
    }
}

/// A named operand role (`rd`, `rs1`, `imm`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Operand {
    /// Role name as used in the assembly template.
    pub name: String,
    /// Numeric domain.
    pub constraint: Constraint,
}

/// Lookup key of an encoding: opcode plus the function fields it declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EncodingKey {
    /// 7-bit opcode.
    pub opcode: u32,
    /// 3-bit funct3, if declared.
    pub funct3: Option<u32>,
    /// 7-bit funct7, if declared.
    pub funct7: Option<u32>,
}

impl fmt::Display for EncodingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(opcode={:#04x}", self.opcode)?;
        match self.funct3 {
            Some(v) => write!(f, ", funct3={v:#x}")?,
            None => f.write_str(", funct3=*")?,
        }
        match self.funct7 {
            Some(v) => write!(f, ", funct7={v:#04x})"),
            None => f.write_str(", funct7=*)"),
        }
    }
}

/// One instruction of the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstructionDefinition {
    /// Mnemonic.
    pub name: String,
    /// Owning extension (normalised, e.g. `I`, `Zicsr`).
    pub extension: String,
    /// 7-bit opcode.
    pub opcode: u32,
    /// 3-bit funct3; `None` matches any value.
    pub funct3: Option<u32>,
    /// 7-bit funct7; `None` matches any value.
    pub funct7: Option<u32>,
    /// Format as declared in the data.
    pub format: Format,
    /// Declared encoding fields.
    pub signature: FieldSignature,
    /// Operand roles in declaration order.
    pub operands: Vec<Operand>,
    /// Assembly template with `{role}` placeholders.
    pub template: String,
    resolved: Format,
}

impl InstructionDefinition {
    /// Whether `word` has this definition's opcode and every declared function field.
    pub fn matches(&self, word: u32) -> bool {
        word.opcode() == self.opcode
            && self.funct3.is_none_or(|f| f == word.funct3())
            && self.funct7.is_none_or(|f| f == word.funct7())
    }

    /// Declared format, or the classifier's answer when the data says `Unknown`.
    pub const fn resolved_format(&self) -> Format {
        self.resolved
    }

    /// The (opcode, funct3, funct7) key of this definition.
    pub const fn encoding_key(&self) -> EncodingKey {
        EncodingKey {
            opcode: self.opcode,
            funct3: self.funct3,
            funct7: self.funct7,
        }
    }

    /// The operand named `name`, if any.
    pub fn operand(&self, name: &str) -> Option<&Operand> {
        self.operands.iter().find(|op| op.name == name)
    }
}

/// A named group of instructions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extension {
    /// Normalised name.
    pub name: String,
    /// Definitions in declaration order.
    pub definitions: Vec<InstructionDefinition>,
}

/// Reference to one definition by extension and mnemonic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefinitionRef {
    /// Extension name.
    pub extension: String,
    /// Mnemonic.
    pub name: String,
}

impl fmt::Display for DefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.extension, self.name)
    }
}

/// Two definitions sharing an encoding key; `first` wins when decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    /// Shared key.
    pub key: EncodingKey,
    /// Definition that takes precedence.
    pub first: DefinitionRef,
    /// Definition shadowed by `first`.
    pub second: DefinitionRef,
}

/// Immutable instruction table.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    extensions: Vec<Extension>,
    ambiguities: Vec<Ambiguity>,
    collisions: Vec<Ambiguity>,
}

impl Catalog {
    /// Loads the embedded instruction data.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded data is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_OPCODES, &CatalogConfig::default())
    }

    /// Reads and loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] if the file cannot be read, otherwise
    /// anything [`Catalog::from_json_str`] reports.
    pub fn load(path: impl AsRef<Path>, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, config)
    }

    /// Builds a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the first malformed record, or a duplicate encoding inside one
    /// extension when `config.reject_duplicates` is set.
    pub fn from_json_str(text: &str, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let document: OrderedMap<OrderedMap<serde_json::Value>> = serde_json::from_str(text)?;

        let mut extensions: Vec<Extension> = Vec::new();
        for (key, records) in document.into_entries() {
            if key.starts_with('$') {
                continue;
            }
            let name = normalize_extension(&key);
            let index = match extensions.iter().position(|e| e.name == name) {
                Some(index) => index,
                None => {
                    extensions.push(Extension {
                        name: name.clone(),
                        definitions: Vec::new(),
                    });
                    extensions.len() - 1
                }
            };

            for (mnemonic, value) in records.into_entries() {
                if mnemonic.starts_with('$') {
                    continue;
                }
                let definition = build_definition(&name, &mnemonic, value)?;
                let extension = &mut extensions[index];
                if extension.definitions.iter().any(|d| d.name == definition.name) {
                    return Err(CatalogError::DuplicateInstruction {
                        extension: name,
                        instruction: mnemonic,
                    });
                }
                extension.definitions.push(definition);
            }
        }

        extensions.sort_by_key(|e| precedence_class(&e.name));

        let mut ambiguities = Vec::new();
        for extension in &extensions {
            let mut seen: HashMap<EncodingKey, &str> = HashMap::new();
            for def in &extension.definitions {
                let key = def.encoding_key();
                match seen.get(&key) {
                    Some(&first) if config.reject_duplicates => {
                        return Err(CatalogError::DuplicateEncoding {
                            extension: extension.name.clone(),
                            first: first.to_owned(),
                            second: def.name.clone(),
                            key,
                        });
                    }
                    Some(&first) => {
                        warn!(
                            extension = %extension.name,
                            first,
                            second = %def.name,
                            %key,
                            "duplicate encoding inside extension; first declaration wins"
                        );
                        ambiguities.push(Ambiguity {
                            key,
                            first: DefinitionRef {
                                extension: extension.name.clone(),
                                name: first.to_owned(),
                            },
                            second: DefinitionRef {
                                extension: extension.name.clone(),
                                name: def.name.clone(),
                            },
                        });
                    }
                    None => {
                        let _ = seen.insert(key, &def.name);
                    }
                }
            }
        }

        let mut collisions = Vec::new();
        let mut owners: HashMap<EncodingKey, &InstructionDefinition> = HashMap::new();
        for def in extensions.iter().flat_map(|e| &e.definitions) {
            match owners.get(&def.encoding_key()) {
                Some(first) if first.extension != def.extension => {
                    let collision = Ambiguity {
                        key: def.encoding_key(),
                        first: DefinitionRef {
                            extension: first.extension.clone(),
                            name: first.name.clone(),
                        },
                        second: DefinitionRef {
                            extension: def.extension.clone(),
                            name: def.name.clone(),
                        },
                    };
                    warn!(
                        key = %collision.key,
                        winner = %collision.first,
                        shadowed = %collision.second,
                        "encoding shared across extensions"
                    );
                    collisions.push(collision);
                }
                Some(_) => {}
                None => {
                    let _ = owners.insert(def.encoding_key(), def);
                }
            }
        }

        let catalog = Self {
            extensions,
            ambiguities,
            collisions,
        };
        debug!(
            extensions = catalog.extensions.len(),
            instructions = catalog.len(),
            "instruction catalog loaded"
        );
        Ok(catalog)
    }

    /// Extensions in decode precedence order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Extension by normalised name.
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name == name)
    }

    /// Every definition, extensions in precedence order.
    pub fn definitions(&self) -> impl Iterator<Item = &InstructionDefinition> + '_ {
        self.extensions.iter().flat_map(|e| e.definitions.iter())
    }

    /// Definition by mnemonic; the first extension in precedence order wins.
    pub fn get(&self, name: &str) -> Option<&InstructionDefinition> {
        self.definitions().find(|d| d.name == name)
    }

    /// Sorted, de-duplicated mnemonics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Definitions grouped by resolved format, precedence order inside each group.
    pub fn by_format(&self) -> BTreeMap<Format, Vec<&InstructionDefinition>> {
        let mut groups: BTreeMap<Format, Vec<&InstructionDefinition>> = BTreeMap::new();
        for def in self.definitions() {
            groups.entry(def.resolved_format()).or_default().push(def);
        }
        groups
    }

    /// Duplicate encodings inside one extension that were flagged at load.
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Encodings shared by definitions in different extensions.
    pub fn collisions(&self) -> &[Ambiguity] {
        &self.collisions
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.extensions.iter().map(|e| e.definitions.len()).sum()
    }

    /// Whether the catalog holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalises a data key to an extension name.
///
/// `rv32_i` becomes `I`, `rv_zicsr` becomes `Zicsr`; keys without the `rv..._`
/// prefix are returned unchanged.
pub fn normalize_extension(key: &str) -> String {
    let Some(rest) = key.strip_prefix("rv") else {
        return key.to_owned();
    };
    let Some((width, suffix)) = rest.split_once('_') else {
        return key.to_owned();
    };
    if !width.chars().all(|c| c.is_ascii_digit()) || suffix.is_empty() {
        return key.to_owned();
    }
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => {
            let mut name = first.to_ascii_uppercase().to_string();
            name.push_str(&chars.as_str().to_ascii_lowercase());
            name
        }
        None => key.to_owned(),
    }
}

/// Decode precedence class of an extension name.
fn precedence_class(name: &str) -> u8 {
    match name {
        "I" | "E" => 0,
        _ if name.len() == 1 && name.chars().all(|c| c.is_ascii_uppercase()) => 1,
        _ if name.starts_with('Z') => 2,
        _ => 3,
    }
}

fn build_definition(
    extension: &str,
    name: &str,
    value: serde_json::Value,
) -> Result<InstructionDefinition, CatalogError> {
    let raw: RawRecord =
        serde_json::from_value(value).map_err(|source| CatalogError::Record {
            extension: extension.to_owned(),
            instruction: name.to_owned(),
            source,
        })?;

    let width = |field: &'static str, value: u32, mask: u32| {
        if value > mask {
            Err(CatalogError::FieldWidth {
                extension: extension.to_owned(),
                instruction: name.to_owned(),
                field,
                value,
                bits: mask.count_ones(),
            })
        } else {
            Ok(value)
        }
    };
    let opcode = width("opcode", raw.opcode, OPCODE_MASK)?;
    let funct3 = raw
        .funct3
        .map(|v| width("funct3", v, FUNCT3_MASK))
        .transpose()?;
    let funct7 = raw
        .funct7
        .map(|v| width("funct7", v, FUNCT7_MASK))
        .transpose()?;

    let declared = match raw.format.as_deref() {
        None => Format::Unknown,
        Some(text) => text
            .parse::<Format>()
            .map_err(|_| CatalogError::UnknownFormat {
                extension: extension.to_owned(),
                instruction: name.to_owned(),
                format: text.to_owned(),
            })?,
    };

    let ranges = raw
        .fields
        .iter()
        .map(|text| {
            text.parse::<BitRange>()
                .map_err(|()| CatalogError::BitRange {
                    extension: extension.to_owned(),
                    instruction: name.to_owned(),
                    range: text.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let signature = FieldSignature {
        opcode: true,
        funct3: funct3.is_some(),
        funct7: funct7.is_some(),
        ranges,
    };

    let resolved = match declared {
        Format::Unknown => format::classify(name, Some(&signature)),
        known => known,
    };

    let operands = raw
        .parameters
        .into_iter()
        .map(|param| {
            let constraint = build_constraint(name, &param, resolved).map_err(|reason| {
                CatalogError::Constraint {
                    extension: extension.to_owned(),
                    instruction: name.to_owned(),
                    parameter: param.name.clone(),
                    reason,
                }
            })?;
            Ok(Operand {
                name: param.name,
                constraint,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    let mut seen = HashSet::new();
    if let Some(dup) = operands.iter().find(|op| !seen.insert(op.name.as_str())) {
        return Err(CatalogError::Constraint {
            extension: extension.to_owned(),
            instruction: name.to_owned(),
            parameter: dup.name.clone(),
            reason: "operand declared twice".to_owned(),
        });
    }

    let template = raw
        .assembly_template
        .unwrap_or_else(|| default_template(name, &operands));

    Ok(InstructionDefinition {
        name: name.to_owned(),
        extension: extension.to_owned(),
        opcode,
        funct3,
        funct7,
        format: declared,
        signature,
        operands,
        template,
        resolved,
    })
}

fn build_constraint(
    instruction: &str,
    param: &RawParameter,
    format: Format,
) -> Result<Constraint, String> {
    let raw = &param.constraints;
    let kind = match raw.kind.as_deref() {
        Some(kind) => kind.to_ascii_lowercase(),
        None if REGISTER_ROLES.contains(&param.name.as_str()) => "register".to_owned(),
        None if IMMEDIATE_ROLES.contains(&param.name.as_str()) => "immediate".to_owned(),
        None => "unknown".to_owned(),
    };

    match kind.as_str() {
        "register" => {
            let min = raw.min.unwrap_or(0);
            let max = raw.max.unwrap_or(MAX_REGISTER);
            if min < 0 || max > MAX_REGISTER || min > max {
                return Err(format!(
                    "register range [{min}, {max}] is not inside [0, {MAX_REGISTER}]"
                ));
            }
            Ok(Constraint::Register {
                min,
                max,
                exclude: raw.exclude.clone(),
            })
        }
        "immediate" => {
            if !raw.exclude.is_empty() {
                return Err("exclusions are only supported for registers".to_owned());
            }
            let (lo, hi) = format.generation_domain();
            let declared_min = raw.min.unwrap_or(lo);
            let declared_max = raw.max.unwrap_or(hi);
            if declared_min > declared_max {
                return Err(format!(
                    "immediate range [{declared_min}, {declared_max}] is inverted"
                ));
            }
            // Formats without a fixed immediate field keep the declared bounds.
            if format.validation_range().is_none() {
                return Ok(Constraint::Immediate {
                    min: declared_min,
                    max: declared_max,
                });
            }
            let min = declared_min.max(lo);
            let max = declared_max.min(hi);
            if min > max {
                return Err(format!(
                    "immediate range [{declared_min}, {declared_max}] lies outside the {format} domain [{lo}, {hi}]"
                ));
            }
            if (min, max) != (declared_min, declared_max) {
                warn!(
                    instruction,
                    parameter = %param.name,
                    %format,
                    declared_min,
                    declared_max,
                    min,
                    max,
                    "immediate range narrowed to the format domain"
                );
            }
            Ok(Constraint::Immediate { min, max })
        }
        "unknown" => Ok(Constraint::Unknown),
        other => Err(format!("unsupported constraint type '{other}'")),
    }
}

/// `name x{rd}, x{rs1}, {imm}` style template for records without one.
fn default_template(name: &str, operands: &[Operand]) -> String {
    if operands.is_empty() {
        return name.to_owned();
    }
    let rendered: Vec<String> = operands
        .iter()
        .map(|op| {
            if op.constraint.is_register() {
                format!("x{{{}}}", op.name)
            } else {
                format!("{{{}}}", op.name)
            }
        })
        .collect();
    format!("{name} {}", rendered.join(", "))
}
