//! Binding configuration: what to skip, where our sources live, and how to name
//! the generated glue.
//!
//! Stored as JSON (`.json`) or YAML (anything else). Every field has a default,
//! so an empty document is a valid configuration.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Source-path fragments that decide which compilation units are ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScope {
    /// A `DW_AT_name` containing one of these switches the walker into scope.
    #[serde(default = "default_scope_include")]
    pub include: Vec<String>,
    /// A `DW_AT_name` containing one of these switches it out. Checked first.
    #[serde(default = "default_scope_exclude")]
    pub exclude: Vec<String>,
}

impl Default for SourceScope {
    fn default() -> Self {
        Self { include: default_scope_include(), exclude: default_scope_exclude() }
    }
}

/// Names and boilerplate used by the code generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Kernel headers, written verbatim after `#include `.
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    /// Macros defined between the kernel and the runtime headers.
    #[serde(default = "default_defines")]
    pub defines: Vec<String>,
    /// Scripting-runtime headers, included after the defines.
    #[serde(default = "default_runtime_includes")]
    pub runtime_includes: Vec<String>,
    /// Prefix for every generated wrapper function.
    #[serde(default = "default_wrapper_prefix")]
    pub wrapper_prefix: String,
    /// Name of the static registration table.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    /// Library name; the entry point is `luaopen_<library_name>`.
    #[serde(default = "default_library_name")]
    pub library_name: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            defines: default_defines(),
            runtime_includes: default_runtime_includes(),
            wrapper_prefix: default_wrapper_prefix(),
            table_name: default_table_name(),
            library_name: default_library_name(),
        }
    }
}

/// File names of the artifacts written into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNames {
    #[serde(default = "default_excluded_name")]
    pub excluded: String,
    #[serde(default = "default_listing_name")]
    pub listing: String,
    #[serde(default = "default_source_name")]
    pub source: String,
    #[serde(default = "default_diagnostics_name")]
    pub diagnostics: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            excluded: default_excluded_name(),
            listing: default_listing_name(),
            source: default_source_name(),
            diagnostics: default_diagnostics_name(),
        }
    }
}

/// Top-level configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Resolved type strings with no safe marshaling strategy. `...` here rejects variadics.
    #[serde(default = "default_ignore_types")]
    pub ignore_types: Vec<String>,
    /// Functions never exposed, whatever their signature.
    #[serde(default = "default_deny_functions")]
    pub deny_functions: Vec<String>,
    #[serde(default)]
    pub scope: SourceScope,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub outputs: OutputNames,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            ignore_types: default_ignore_types(),
            deny_functions: default_deny_functions(),
            scope: SourceScope::default(),
            codegen: CodegenConfig::default(),
            outputs: OutputNames::default(),
        }
    }
}

impl BindingConfig {
    /// True when `resolved` exactly matches an ignore-list entry.
    pub fn ignores_type(&self, resolved: &str) -> bool {
        self.ignore_types.iter().any(|t| t == resolved)
    }

    pub fn ignores_variadic(&self) -> bool {
        self.ignores_type("...")
    }

    pub fn denies(&self, function: &str) -> bool {
        self.deny_functions.iter().any(|f| f == function)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("codegen.wrapper_prefix", &self.codegen.wrapper_prefix),
            ("codegen.table_name", &self.codegen.table_name),
            ("codegen.library_name", &self.codegen.library_name),
        ] {
            if !is_c_identifier(value) {
                return Err(anyhow!("Config '{label}' must be a C identifier, got '{value}'"));
            }
        }
        for (label, value) in [
            ("outputs.excluded", &self.outputs.excluded),
            ("outputs.listing", &self.outputs.listing),
            ("outputs.source", &self.outputs.source),
            ("outputs.diagnostics", &self.outputs.diagnostics),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("Config '{label}' is required"));
            }
        }
        Ok(())
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<BindingConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config: BindingConfig = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body).context("Failed to parse config JSON")?
    } else if body.trim().is_empty() {
        BindingConfig::default()
    } else {
        serde_yaml::from_str(&body).context("Failed to parse config YAML")?
    };
    config.validate()?;
    Ok(config)
}

/// Serialize a configuration in the format implied by `path`'s extension.
pub fn render_config(config: &BindingConfig, path: &Path) -> Result<String> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")
    } else {
        serde_yaml::to_string(config).context("Failed to serialize config to YAML")
    }
}

fn is_c_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn default_ignore_types() -> Vec<String> {
    vec!["struct __va_list_tag *".to_string()]
}

fn default_deny_functions() -> Vec<String> {
    vec!["panic".to_string()]
}

fn default_scope_include() -> Vec<String> {
    vec!["src/nautilus/".to_string()]
}

fn default_scope_exclude() -> Vec<String> {
    vec!["src/lua_src/".to_string()]
}

fn default_includes() -> Vec<String> {
    ["<nautilus/naut_types.h>", "<nautilus/libccompat.h>", "<nautilus/math.h>"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_runtime_includes() -> Vec<String> {
    ["\"lua/lua.h\"", "\"lua/lauxlib.h\"", "\"lua/lualib.h\"", "\"lua/luaconf.h\""]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_defines() -> Vec<String> {
    vec!["lmathlib_c".to_string(), "LUA_LIB".to_string()]
}

fn default_wrapper_prefix() -> String {
    "naut_".to_string()
}

fn default_table_name() -> String {
    "nautlib".to_string()
}

fn default_library_name() -> String {
    "naut".to_string()
}

fn default_excluded_name() -> String {
    "filtered_functions.txt".to_string()
}

fn default_listing_name() -> String {
    "resolved_functions.txt".to_string()
}

fn default_source_name() -> String {
    "lnautlib.c".to_string()
}

fn default_diagnostics_name() -> String {
    "diagnostics.txt".to_string()
}
