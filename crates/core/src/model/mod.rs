//! Core data model for debug entries, function signatures, and resolved bindings.
//!
//! Types here flow through every stage:
//! - `DebugEntry` is produced by the dump walker.
//! - `FunctionSignature` is produced by the extractor.
//! - `ResolvedFunction` is produced by the binding filter and consumed by codegen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Offset of a debug entry inside the dump. Every type reference points at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey(pub u64);

impl EntryKey {
    /// Parse a bare (`2d`) or prefixed (`0x2d`) hexadecimal offset.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(EntryKey)
    }

    /// Parse a type-reference attribute value such as `<0x2d>`.
    pub fn parse_reference(value: &str) -> Option<Self> {
        let inner = value.trim().strip_prefix('<')?.strip_suffix('>')?;
        if !inner.starts_with("0x") && !inner.starts_with("0X") {
            return None;
        }
        Self::parse_hex(inner)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for EntryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKey::parse_hex(s)
            .ok_or_else(|| format!("Invalid entry key '{s}'; expected hex like 0x2d"))
    }
}

/// Debug entry tags the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DieTag {
    CompileUnit,
    Subprogram,
    FormalParameter,
    UnspecifiedParameters,
    PointerType,
    BaseType,
    StructureType,
    Typedef,
    ConstType,
    /// `Abbrev Number: 0`: closes the children of the enclosing entry.
    Null,
    /// Any other tag; carried along but never added to the type graph.
    Other(String),
}

impl DieTag {
    /// Map a `DW_TAG_*` name to a tag.
    pub fn from_dwarf_name(name: &str) -> Self {
        match name.strip_prefix("DW_TAG_").unwrap_or(name) {
            "compile_unit" => DieTag::CompileUnit,
            "subprogram" => DieTag::Subprogram,
            "formal_parameter" => DieTag::FormalParameter,
            "unspecified_parameters" => DieTag::UnspecifiedParameters,
            "pointer_type" => DieTag::PointerType,
            "base_type" => DieTag::BaseType,
            "structure_type" => DieTag::StructureType,
            "typedef" => DieTag::Typedef,
            "const_type" => DieTag::ConstType,
            _ => DieTag::Other(name.to_string()),
        }
    }
}

/// Attribute names the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrName {
    Name,
    Type,
    External,
    Inline,
    LowPc,
    Declaration,
    Other(String),
}

impl AttrName {
    /// Map a `DW_AT_*` name to an attribute name.
    pub fn from_dwarf_name(name: &str) -> Self {
        match name.strip_prefix("DW_AT_").unwrap_or(name) {
            "name" => AttrName::Name,
            "type" => AttrName::Type,
            "external" => AttrName::External,
            "inline" => AttrName::Inline,
            "low_pc" => AttrName::LowPc,
            "declaration" => AttrName::Declaration,
            _ => AttrName::Other(name.to_string()),
        }
    }
}

/// One attribute line of a debug entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: AttrName,
    /// Raw value text (already stripped of readelf's indirect-string prefix).
    pub value: String,
}

impl Attribute {
    /// Type reference carried by this attribute, if its value is `<0x..>`.
    pub fn type_ref(&self) -> Option<EntryKey> {
        EntryKey::parse_reference(&self.value)
    }
}

/// A debug entry as reconstructed by the dump walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    pub key: EntryKey,
    pub depth: u32,
    pub tag: DieTag,
    /// Attributes in dump order.
    pub attributes: Vec<Attribute>,
    /// Whether the entry belongs to the sources we bind against.
    pub in_scope: bool,
    /// 1-based line number of the entry header in the dump.
    pub line: usize,
}

impl DebugEntry {
    pub fn new(key: EntryKey, depth: u32, tag: DieTag, line: usize) -> Self {
        Self { key, depth, tag, attributes: Vec::new(), in_scope: true, line }
    }

    /// First `DW_AT_name` value.
    pub fn name(&self) -> Option<&str> {
        self.attributes.iter().find(|a| a.name == AttrName::Name).map(|a| a.value.as_str())
    }

    /// First `DW_AT_type` reference.
    pub fn type_ref(&self) -> Option<EntryKey> {
        self.attributes.iter().find(|a| a.name == AttrName::Type).and_then(Attribute::type_ref)
    }

    pub fn has_attribute(&self, name: &AttrName) -> bool {
        self.attributes.iter().any(|a| &a.name == name)
    }
}

/// Symbol visibility of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    External,
    Static,
}

impl Linkage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Linkage::External => "external",
            Linkage::Static => "static",
        }
    }
}

/// Return type of an extracted signature, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Void,
    Ref(EntryKey),
}

/// Parameter of an extracted signature, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Named { name: String, type_ref: EntryKey },
    Variadic,
}

impl Parameter {
    pub fn named(name: impl Into<String>, type_ref: EntryKey) -> Self {
        Parameter::Named { name: name.into(), type_ref }
    }
}

/// Signature of one subprogram entry as read from the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub address: EntryKey,
    pub name: String,
    pub linkage: Linkage,
    /// Prototype only (`DW_AT_declaration`); the body lives in another unit.
    pub declaration: bool,
    pub return_type: ReturnType,
    pub parameters: Vec<Parameter>,
}

/// Marshaling category: selects the runtime accessor/pusher pair for a C type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Integer,
    Number,
    String,
    UnsignedHandle,
}

impl Category {
    /// Suffix of the `luaL_check*` accessor used to pull this category off the stack.
    pub fn accessor(&self) -> &'static str {
        match self {
            Category::Integer => "checkint",
            Category::Number => "checknumber",
            Category::String => "checkstring",
            Category::UnsignedHandle => "checkunsigned",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Integer => "integer",
            Category::Number => "number",
            Category::String => "string",
            Category::UnsignedHandle => "unsigned-handle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter whose type chain resolved to a supported category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedParameter {
    Named { name: String, ty: String, category: Category },
    Variadic,
}

impl ResolvedParameter {
    pub fn is_variadic(&self) -> bool {
        matches!(self, ResolvedParameter::Variadic)
    }
}

/// A parameter declared through a typedef; codegen emits the alias instead of the expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefUse {
    pub parameter: String,
    pub alias: String,
    /// Fully resolved type the alias stands for.
    pub target: String,
}

/// A function eligible for wrapper generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFunction {
    pub name: String,
    pub return_type: String,
    /// `None` only when the return type is `void`.
    pub return_category: Option<Category>,
    pub parameters: Vec<ResolvedParameter>,
    pub typedefs: Vec<TypedefUse>,
}

impl ResolvedFunction {
    pub fn returns_void(&self) -> bool {
        self.return_category.is_none()
    }

    /// Typedef alias used for the named parameter, if any.
    pub fn typedef_for(&self, parameter: &str) -> Option<&TypedefUse> {
        self.typedefs.iter().find(|t| t.parameter == parameter)
    }
}
