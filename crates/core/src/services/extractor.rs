//! Function-signature extraction.
//!
//! Each depth-1 `subprogram` entry drives a small state machine over its own
//! attributes and its depth-2 children:
//!
//! ```text
//! AwaitingName -> AwaitingReturnType -> AwaitingParameter <-> InParameterName -> InParameterType
//!        \______________\_______________________\________________________________-> Closed
//! ```
//!
//! Any depth-1 entry closes the function in progress, so a truncated entry can
//! never leak state into its sibling.

use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::model::{
    AttrName, Attribute, DebugEntry, DieTag, EntryKey, FunctionSignature, Linkage, Parameter,
    ReturnType,
};

/// Position of the state machine inside one subprogram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Header attributes; no name seen yet.
    AwaitingName,
    /// Header attributes after the name.
    AwaitingReturnType,
    /// Between children.
    AwaitingParameter,
    /// Inside a `formal_parameter` with no name yet.
    InParameterName { type_ref: Option<EntryKey> },
    /// Inside a `formal_parameter` whose name is known.
    InParameterType { name: String },
    /// Finished or discarded; everything up to the next depth-1 entry is ignored.
    Closed,
}

/// Signature being accumulated for one subprogram entry.
#[derive(Debug)]
struct PendingFunction {
    address: EntryKey,
    name: Option<String>,
    external: bool,
    is_static: bool,
    declaration: bool,
    discarded: bool,
    return_type: Option<ReturnType>,
    parameters: Vec<Parameter>,
    state: EntryState,
}

impl PendingFunction {
    fn new(address: EntryKey) -> Self {
        Self {
            address,
            name: None,
            external: false,
            is_static: false,
            declaration: false,
            discarded: false,
            return_type: None,
            parameters: Vec::new(),
            state: EntryState::AwaitingName,
        }
    }

    fn in_header(&self) -> bool {
        matches!(self.state, EntryState::AwaitingName | EntryState::AwaitingReturnType)
    }

    fn default_return(&mut self) {
        if self.return_type.is_none() {
            self.return_type = Some(ReturnType::Void);
        }
    }

    fn header_attribute(&mut self, attr: &Attribute, extraction: &mut Extraction) {
        match attr.name {
            AttrName::External => self.external = true,
            AttrName::Declaration => self.declaration = true,
            AttrName::Inline => {
                if let Some(name) = &self.name {
                    extraction.unresolved_pool.push(name.clone());
                }
                debug!(address = %self.address, "discarding inlined subprogram");
                self.discarded = true;
                self.state = EntryState::Closed;
            }
            AttrName::Name if self.state == EntryState::AwaitingName => {
                self.name = Some(attr.value.clone());
                self.state = EntryState::AwaitingReturnType;
            }
            AttrName::Type if self.return_type.is_none() => {
                match attr.type_ref() {
                    Some(key) => self.return_type = Some(ReturnType::Ref(key)),
                    None => warn!(
                        address = %self.address,
                        value = %attr.value,
                        "unreadable return type"
                    ),
                }
            }
            AttrName::LowPc => {
                if self.external {
                    self.default_return();
                } else {
                    self.is_static = true;
                }
            }
            _ => {}
        }
    }

    fn open_child(&mut self, child: &DebugEntry, diagnostics: &mut Diagnostics) {
        if self.state == EntryState::Closed {
            return;
        }
        self.abandon_parameter(child.line, diagnostics);
        if child.depth != 2 {
            self.state = EntryState::AwaitingParameter;
            return;
        }
        match child.tag {
            DieTag::FormalParameter => {
                self.default_return();
                self.state = EntryState::InParameterName { type_ref: None };
            }
            DieTag::UnspecifiedParameters => {
                self.default_return();
                self.parameters.push(Parameter::Variadic);
                self.state = EntryState::AwaitingParameter;
            }
            _ => self.state = EntryState::AwaitingParameter,
        }
    }

    fn parameter_attribute(&mut self, attr: &Attribute) {
        let state = std::mem::replace(&mut self.state, EntryState::AwaitingParameter);
        self.state = match (state, &attr.name) {
            (EntryState::InParameterName { type_ref }, AttrName::Name) => match type_ref {
                Some(key) => {
                    self.parameters.push(Parameter::named(attr.value.clone(), key));
                    EntryState::AwaitingParameter
                }
                None => EntryState::InParameterType { name: attr.value.clone() },
            },
            (EntryState::InParameterName { type_ref: None }, AttrName::Type) => {
                EntryState::InParameterName { type_ref: attr.type_ref() }
            }
            (EntryState::InParameterType { name }, AttrName::Type) => match attr.type_ref() {
                Some(key) => {
                    self.parameters.push(Parameter::named(name, key));
                    EntryState::AwaitingParameter
                }
                None => EntryState::InParameterType { name },
            },
            (state, _) => state,
        };
    }

    /// Drop a parameter whose block ended before both name and type were seen.
    fn abandon_parameter(&mut self, line: usize, diagnostics: &mut Diagnostics) {
        let subject = match &self.state {
            EntryState::InParameterName { .. } => "<unnamed>".to_string(),
            EntryState::InParameterType { name } => name.clone(),
            _ => return,
        };
        let function = self.name.clone().unwrap_or_else(|| self.address.to_string());
        self.state = EntryState::AwaitingParameter;
        if self.declaration {
            // Prototype parameters carry no names.
            debug!(function = %function, parameter = %subject, "prototype parameter skipped");
            return;
        }
        warn!(function = %function, parameter = %subject, line, "malformed formal parameter");
        diagnostics.push(
            format!("{function}({subject})"),
            "malformed parameter: missing name or type",
        );
    }

    fn attribute(&mut self, attr: &Attribute, extraction: &mut Extraction) {
        if self.in_header() {
            self.header_attribute(attr, extraction);
        } else if matches!(
            self.state,
            EntryState::InParameterName { .. } | EntryState::InParameterType { .. }
        ) {
            self.parameter_attribute(attr);
        }
    }

    fn finish(mut self, diagnostics: &mut Diagnostics) -> Option<FunctionSignature> {
        self.abandon_parameter(0, diagnostics);
        if self.discarded {
            return None;
        }
        let Some(name) = self.name else {
            debug!(address = %self.address, "subprogram without a name dropped");
            return None;
        };
        let linkage = if self.external && !self.is_static {
            Linkage::External
        } else {
            Linkage::Static
        };
        Some(FunctionSignature {
            address: self.address,
            name,
            linkage,
            declaration: self.declaration,
            return_type: self.return_type.unwrap_or(ReturnType::Void),
            parameters: self.parameters,
        })
    }
}

/// Result of running the extractor over a dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Signatures in dump order.
    pub signatures: Vec<FunctionSignature>,
    /// Names seen on subprograms that never produced a signature (inlined definitions).
    pub unresolved_pool: Vec<String>,
}

/// Walks entries and builds one signature per in-scope, named, non-inlined subprogram.
#[derive(Debug, Default)]
pub struct SignatureExtractor {
    current: Option<PendingFunction>,
    extraction: Extraction,
}

impl SignatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next entry in dump order.
    pub fn push(&mut self, entry: &DebugEntry, diagnostics: &mut Diagnostics) {
        if entry.depth <= 1 {
            self.close(diagnostics);
            if entry.depth == 1 && entry.tag == DieTag::Subprogram && entry.in_scope {
                self.current = Some(PendingFunction::new(entry.key));
            } else {
                return;
            }
        } else if let Some(pending) = self.current.as_mut() {
            pending.open_child(entry, diagnostics);
        } else {
            return;
        }

        if let Some(pending) = self.current.as_mut() {
            for attr in &entry.attributes {
                pending.attribute(attr, &mut self.extraction);
            }
        }
    }

    /// Close the last function and return everything extracted.
    pub fn finish(mut self, diagnostics: &mut Diagnostics) -> Extraction {
        self.close(diagnostics);
        self.extraction
    }

    fn close(&mut self, diagnostics: &mut Diagnostics) {
        if let Some(pending) = self.current.take() {
            if let Some(signature) = pending.finish(diagnostics) {
                self.extraction.signatures.push(signature);
            }
        }
    }
}

/// Run the extractor over a complete entry list.
pub fn extract_signatures(entries: &[DebugEntry], diagnostics: &mut Diagnostics) -> Extraction {
    let mut extractor = SignatureExtractor::new();
    for entry in entries {
        extractor.push(entry, diagnostics);
    }
    extractor.finish(diagnostics)
}
