//! Lua call-glue generation for bindable functions.
//!
//! Produces a single C unit: boilerplate includes, struct/union forward
//! declarations, typedefs and `extern` declarations, one wrapper per function,
//! the `luaL_Reg` registration table, and the `luaopen_*` entry point.

use std::collections::HashSet;
use std::fmt::Write;

use crate::config::CodegenConfig;
use crate::model::{Category, ResolvedFunction, ResolvedParameter};

/// Renders the generated unit from a set of resolved functions.
pub struct GlueGenerator<'a> {
    config: &'a CodegenConfig,
}

impl<'a> GlueGenerator<'a> {
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self { config }
    }

    /// Render the full unit. `provenance` ends up in the header comment.
    pub fn render(&self, functions: &[ResolvedFunction], provenance: Option<&str>) -> String {
        let mut out = String::new();
        self.write_header(&mut out, provenance);
        self.write_forward_declarations(&mut out, functions);
        self.write_externs(&mut out, functions);
        out.push('\n');
        for function in functions {
            self.write_wrapper(&mut out, function);
        }
        out.push('\n');
        self.write_table(&mut out, functions);
        self.write_footer(&mut out);
        out
    }

    pub fn wrapper_name(&self, function: &str) -> String {
        format!("{}{}", self.config.wrapper_prefix, function)
    }

    fn write_header(&self, out: &mut String, provenance: Option<&str>) {
        out.push_str("/* Generated by dwarf-glue. Do not edit. */\n");
        if let Some(provenance) = provenance {
            let _ = writeln!(out, "/* {provenance} */");
        }
        for include in &self.config.includes {
            let _ = writeln!(out, "#include {include}");
        }
        for define in &self.config.defines {
            let _ = writeln!(out, "#define {define}");
        }
        for include in &self.config.runtime_includes {
            let _ = writeln!(out, "#include {include}");
        }
        out.push('\n');
    }

    fn write_forward_declarations(&self, out: &mut String, functions: &[ResolvedFunction]) {
        let mut seen: HashSet<String> = HashSet::new();
        for function in functions {
            for parameter in &function.parameters {
                let ResolvedParameter::Named { ty, .. } = parameter else { continue };
                if let Some(tag) = aggregate_tag(ty) {
                    if seen.insert(tag.clone()) {
                        let _ = writeln!(out, "{tag};");
                    }
                }
            }
        }
        out.push('\n');
    }

    fn write_externs(&self, out: &mut String, functions: &[ResolvedFunction]) {
        let mut declared_aliases: HashSet<&str> = HashSet::new();
        for function in functions {
            let mut types = Vec::with_capacity(function.parameters.len());
            for parameter in &function.parameters {
                match parameter {
                    ResolvedParameter::Variadic => types.push("...".to_string()),
                    ResolvedParameter::Named { name, ty, .. } => match function.typedef_for(name) {
                        Some(typedef) => {
                            if declared_aliases.insert(typedef.alias.as_str()) {
                                let _ =
                                    writeln!(out, "typedef {} {};", typedef.target, typedef.alias);
                            }
                            types.push(typedef.alias.clone());
                        }
                        None => types.push(ty.clone()),
                    },
                }
            }
            let _ = writeln!(
                out,
                "extern {} {}({});",
                function.return_type,
                function.name,
                types.join(", ")
            );
        }
    }

    fn write_wrapper(&self, out: &mut String, function: &ResolvedFunction) {
        let _ = writeln!(out, "static int {}(lua_State *L){{", self.wrapper_name(&function.name));
        let mut arguments: Vec<&str> = Vec::new();
        for (idx, parameter) in function.parameters.iter().enumerate() {
            let ResolvedParameter::Named { name, ty, category } = parameter else { continue };
            let slot = idx + 1;
            let declared = function.typedef_for(name).map(|t| t.alias.as_str()).unwrap_or(ty);
            let accessor = category.accessor();
            let _ = writeln!(out, "\t{declared} {name} = ({declared})luaL_{accessor}(L, {slot});");
            arguments.push(name);
        }
        let call = format!("{}({})", function.name, arguments.join(", "));
        match function.return_category {
            None => {
                let _ = writeln!(out, "\t{call};");
            }
            Some(Category::String) => {
                let _ = writeln!(out, "\t{} temp_return = {call};", function.return_type);
                out.push_str("\tlua_pushstring(L, temp_return);\n");
            }
            Some(_) => {
                let ret = &function.return_type;
                let value = if !ret.contains('*') {
                    call
                } else if ret.contains("double") || ret.contains("float") {
                    format!("*(lua_Number *){call}")
                } else {
                    format!("(lua_Number)(unsigned long){call}")
                };
                let _ = writeln!(out, "\tlua_Number temp_return = {value};");
                out.push_str("\tlua_pushnumber(L, temp_return);\n");
            }
        }
        out.push_str("\treturn 1;\n}\n");
    }

    fn write_table(&self, out: &mut String, functions: &[ResolvedFunction]) {
        let _ = writeln!(out, "static const luaL_Reg {}[] = {{", self.config.table_name);
        for function in functions {
            let wrapper = self.wrapper_name(&function.name);
            let _ = writeln!(out, "{{\"{}\", {}}},", function.name, wrapper);
        }
        out.push_str("{NULL, NULL}\n};\n");
    }

    fn write_footer(&self, out: &mut String) {
        let library = &self.config.library_name;
        let _ = writeln!(out, "LUAMOD_API int luaopen_{library} (lua_State *L) {{");
        let _ = writeln!(out, "\tluaL_newlib(L, {});", self.config.table_name);
        out.push_str("\treturn 1;\n}\n");
    }
}

/// `struct foo` / `union bar` (qualifiers and stars stripped) for aggregate types.
fn aggregate_tag(ty: &str) -> Option<String> {
    let words: Vec<&str> = ty.split_whitespace().filter(|w| *w != "*" && *w != "const").collect();
    let pos = words.iter().position(|w| *w == "struct" || *w == "union")?;
    let name = words.get(pos + 1)?;
    Some(format!("{} {}", words[pos], name))
}
