//! Binding filter: decides which extracted functions can be marshaled.
//!
//! The category table is an ordered, first-match rule list. The rules overlap
//! (`unsigned char *` is both a pointer and unsigned), so the order below is
//! part of the contract: reordering changes which functions bind.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::config::BindingConfig;
use crate::diagnostics::Diagnostics;
use crate::model::{
    Category, EntryKey, FunctionSignature, Linkage, Parameter, ResolvedFunction,
    ResolvedParameter, ReturnType, TypedefUse,
};
use crate::services::resolver::{ResolutionError, TypeGraph, TypedefAliases};

/// Why a function was left out of the bindable set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("function is on the deny list")]
    Denied,
    #[error("no external linkage ({0})")]
    NotExternal(&'static str),
    #[error("declaration only; no definition in scope")]
    DeclarationOnly,
    #[error("{site}: {source}")]
    Resolution { site: String, source: ResolutionError },
    #[error("{site}: type '{ty}' is on the ignore list")]
    IgnoredType { site: String, ty: String },
    #[error("{site}: unsupported type '{ty}'")]
    UnsupportedType { site: String, ty: String },
    #[error("variadic arguments are on the ignore list")]
    IgnoredVariadic,
}

impl Rejection {
    /// Linkage and policy rejections are routed to the excluded list silently.
    pub fn is_diagnostic(&self) -> bool {
        !matches!(
            self,
            Rejection::Denied
                | Rejection::NotExternal(_)
                | Rejection::DeclarationOnly
                | Rejection::IgnoredVariadic
        )
    }
}

/// Classify a resolved declaration string, first match wins.
pub fn classify(decl: &str) -> Option<Category> {
    let decl = decl.trim();
    if decl.contains("struct") || decl.contains("union") {
        return decl.ends_with('*').then_some(Category::UnsignedHandle);
    }
    if decl.contains('*') && !decl.contains("char") {
        Some(Category::UnsignedHandle)
    } else if decl.contains("double") || decl.contains("float") {
        Some(Category::Number)
    } else if has_char_pointer(decl) {
        Some(Category::String)
    } else if is_signed_char(decl) || has_long_int(decl) || decl.starts_with("int") {
        Some(Category::Integer)
    } else if decl.contains("unsigned") || decl == "char" || has_void_pointer(decl) {
        Some(Category::UnsignedHandle)
    } else {
        None
    }
}

/// `char` followed by optional whitespace and `*`.
fn has_char_pointer(decl: &str) -> bool {
    followed_by(decl, "char", false, |rest| rest.starts_with('*'))
}

/// `void`, at least one whitespace, then `*`.
fn has_void_pointer(decl: &str) -> bool {
    followed_by(decl, "void", true, |rest| rest.starts_with('*'))
}

/// Starts with `signed`, optional whitespace, `char`.
fn is_signed_char(decl: &str) -> bool {
    decl.strip_prefix("signed").is_some_and(|rest| rest.trim_start().starts_with("char"))
}

/// One or more `long` tokens, each followed by whitespace, then `int`.
fn has_long_int(decl: &str) -> bool {
    followed_by(decl, "long", true, |mut rest| loop {
        if rest.starts_with("int") {
            return true;
        }
        match rest.strip_prefix("long") {
            Some(after) if after.starts_with(char::is_whitespace) => rest = after.trim_start(),
            _ => return false,
        }
    })
}

/// True if some occurrence of `word` is followed (after whitespace, required or
/// optional) by text satisfying `tail`.
fn followed_by(decl: &str, word: &str, need_space: bool, tail: impl Fn(&str) -> bool) -> bool {
    decl.match_indices(word).any(|(idx, _)| {
        let after = &decl[idx + word.len()..];
        let trimmed = after.trim_start();
        if need_space && trimmed.len() == after.len() {
            return false;
        }
        tail(trimmed)
    })
}

/// Outcome of filtering every extracted signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Bindable functions, in dump order, one per name.
    pub bindable: Vec<ResolvedFunction>,
    /// Names of rejected functions, in dump order (may repeat).
    pub excluded: Vec<String>,
}

/// Resolves and classifies signatures against the type graph.
pub struct BindingFilter<'a> {
    pub config: &'a BindingConfig,
    pub graph: &'a TypeGraph,
    pub aliases: &'a TypedefAliases,
}

impl<'a> BindingFilter<'a> {
    pub fn new(
        config: &'a BindingConfig,
        graph: &'a TypeGraph,
        aliases: &'a TypedefAliases,
    ) -> Self {
        Self { config, graph, aliases }
    }

    /// Partition signatures into bindable and excluded, logging every drop.
    ///
    /// A prototype is skipped outright when the same name is defined somewhere
    /// in the dump, whichever comes first.
    pub fn filter(
        &self,
        signatures: &[FunctionSignature],
        diagnostics: &mut Diagnostics,
    ) -> FilterOutcome {
        let defined: HashSet<&str> = signatures
            .iter()
            .filter(|s| !s.declaration)
            .map(|s| s.name.as_str())
            .collect();

        let mut outcome = FilterOutcome::default();
        let mut bound: HashSet<String> = HashSet::new();
        for signature in signatures {
            if signature.declaration && defined.contains(signature.name.as_str()) {
                debug!(
                    function = %signature.name,
                    address = %signature.address,
                    "prototype superseded by definition"
                );
                continue;
            }
            match self.bind(signature, diagnostics) {
                Ok(function) => {
                    if bound.insert(function.name.clone()) {
                        outcome.bindable.push(function);
                    } else {
                        debug!(
                            function = %signature.name,
                            address = %signature.address,
                            "duplicate definition ignored"
                        );
                    }
                }
                Err(rejection) => {
                    debug!(function = %signature.name, reason = %rejection, "function excluded");
                    if rejection.is_diagnostic() {
                        diagnostics.push(signature.name.clone(), rejection.to_string());
                    }
                    outcome.excluded.push(signature.name.clone());
                }
            }
        }
        outcome
    }

    /// Resolve one signature into a bindable function.
    pub fn bind(
        &self,
        signature: &FunctionSignature,
        diagnostics: &mut Diagnostics,
    ) -> Result<ResolvedFunction, Rejection> {
        if self.config.denies(&signature.name) {
            return Err(Rejection::Denied);
        }
        if signature.linkage != Linkage::External {
            return Err(Rejection::NotExternal(signature.linkage.as_str()));
        }
        if signature.declaration {
            return Err(Rejection::DeclarationOnly);
        }

        let (return_type, return_category) = match signature.return_type {
            ReturnType::Void => ("void".to_string(), None),
            ReturnType::Ref(key) => {
                let ty = self.resolve_checked(key, "return type", diagnostics)?;
                match classify(&ty) {
                    Some(category) => (ty, Some(category)),
                    None if ty == "void" => (ty, None),
                    None => {
                        return Err(Rejection::UnsupportedType { site: "return type".into(), ty })
                    }
                }
            }
        };

        let mut parameters = Vec::with_capacity(signature.parameters.len());
        let mut typedefs = Vec::new();
        for parameter in &signature.parameters {
            match parameter {
                Parameter::Variadic => {
                    if self.config.ignores_variadic() {
                        return Err(Rejection::IgnoredVariadic);
                    }
                    parameters.push(ResolvedParameter::Variadic);
                }
                Parameter::Named { name, type_ref } => {
                    let site = format!("parameter '{name}'");
                    let ty = self.resolve_checked(*type_ref, &site, diagnostics)?;
                    let Some(category) = classify(&ty) else {
                        return Err(Rejection::UnsupportedType { site, ty });
                    };
                    if let Some(alias) = self.aliases.get(*type_ref) {
                        typedefs.push(TypedefUse {
                            parameter: name.clone(),
                            alias: alias.to_string(),
                            target: ty.clone(),
                        });
                    }
                    parameters.push(ResolvedParameter::Named { name: name.clone(), ty, category });
                }
            }
        }

        Ok(ResolvedFunction {
            name: signature.name.clone(),
            return_type,
            return_category,
            parameters,
            typedefs,
        })
    }

    fn resolve_checked(
        &self,
        key: EntryKey,
        site: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, Rejection> {
        let ty = self
            .graph
            .resolve(key, diagnostics)
            .map_err(|source| Rejection::Resolution { site: site.to_string(), source })?;
        if self.config.ignores_type(ty.trim()) {
            return Err(Rejection::IgnoredType { site: site.to_string(), ty });
        }
        Ok(ty)
    }
}
