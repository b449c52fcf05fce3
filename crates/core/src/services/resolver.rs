//! Type graph construction and resolution of type references to C declarations.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{trace, warn};

use crate::diagnostics::Diagnostics;
use crate::model::{DebugEntry, DieTag, EntryKey};

/// Where a type node leads next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// End of the chain.
    Terminal,
    /// End of the chain with an implicit `void` (untyped pointer/const/typedef).
    Void,
    /// Continue at another entry.
    Entry(EntryKey),
}

/// One node of the type graph: the text it contributes and where the chain continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub fragment: String,
    pub next: Link,
}

impl TypeNode {
    fn new(fragment: impl Into<String>, next: Link) -> Self {
        Self { fragment: fragment.into(), next }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("key {0} not found")]
    MissingKey(EntryKey),
    #[error("type chain cycles through {0}")]
    Cycle(EntryKey),
}

impl ResolutionError {
    pub fn key(&self) -> EntryKey {
        match self {
            ResolutionError::MissingKey(k) | ResolutionError::Cycle(k) => *k,
        }
    }
}

/// Typedef entries by address, mapped to their alias names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedefAliases {
    aliases: HashMap<EntryKey, String>,
}

impl TypedefAliases {
    pub fn get(&self, key: EntryKey) -> Option<&str> {
        self.aliases.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Mapping from entry key to type node. Keys are write-once: the first definition wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGraph {
    nodes: HashMap<EntryKey, TypeNode>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node unless the key already exists. Returns whether it was inserted.
    pub fn insert(&mut self, key: EntryKey, node: TypeNode) -> bool {
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.nodes.insert(key, node);
        true
    }

    pub fn get(&self, key: EntryKey) -> Option<&TypeNode> {
        self.nodes.get(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve `key` to a declaration string, logging any failure into `diagnostics`.
    pub fn resolve(
        &self,
        key: EntryKey,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, ResolutionError> {
        self.resolve_chain(key).map_err(|err| {
            diagnostics.push(err.key().to_string(), err.to_string());
            err
        })
    }

    fn resolve_chain(&self, key: EntryKey) -> Result<String, ResolutionError> {
        let mut fragments: Vec<&str> = Vec::new();
        let mut cursor = key;
        let mut hops = 0usize;
        loop {
            let node = self.nodes.get(&cursor).ok_or(ResolutionError::MissingKey(cursor))?;
            if !node.fragment.is_empty() {
                fragments.push(&node.fragment);
            }
            match node.next {
                Link::Terminal => break,
                Link::Void => {
                    fragments.push("void");
                    break;
                }
                Link::Entry(next) => cursor = next,
            }
            hops += 1;
            if hops > self.nodes.len() {
                return Err(ResolutionError::Cycle(cursor));
            }
        }
        Ok(normalize_pointers(fragments))
    }
}

/// Move pointer fragments to the back as `*` and join with spaces.
///
/// Chains are recorded outermost-first (`* * char`); C wants `char * *`. A
/// pointer behind a qualifier (`const * int`) is moved as well, and the
/// qualifiers it leaves adjacent collapse into one.
fn normalize_pointers(fragments: Vec<&str>) -> String {
    let stars = fragments.iter().filter(|f| f.contains('*')).count();
    let mut out: Vec<&str> = Vec::with_capacity(fragments.len());
    for fragment in fragments.into_iter().filter(|f| !f.contains('*')) {
        if fragment == "const" && out.last() == Some(&"const") {
            continue;
        }
        out.push(fragment);
    }
    out.extend(std::iter::repeat("*").take(stars));
    out.join(" ")
}

/// Build the type graph and typedef table from every entry in the dump.
pub fn build_type_graph(
    entries: &[DebugEntry],
    diagnostics: &mut Diagnostics,
) -> (TypeGraph, TypedefAliases) {
    let mut graph = TypeGraph::new();
    let mut aliases = TypedefAliases::default();

    for entry in entries {
        let next = || entry.type_ref().map(Link::Entry).unwrap_or(Link::Void);
        let node = match &entry.tag {
            DieTag::PointerType => TypeNode::new("*", next()),
            DieTag::BaseType => match entry.name() {
                Some(name) => TypeNode::new(name, Link::Terminal),
                None => TypeNode::new("void", Link::Terminal),
            },
            DieTag::StructureType => match entry.name() {
                Some(name) => TypeNode::new(format!("struct {name}"), Link::Terminal),
                None => {
                    trace!(key = %entry.key, "anonymous structure not recorded");
                    continue;
                }
            },
            DieTag::Typedef => {
                if let Some(alias) = entry.name() {
                    aliases.aliases.entry(entry.key).or_insert_with(|| alias.to_string());
                }
                TypeNode::new("", next())
            }
            DieTag::ConstType => TypeNode::new("const", next()),
            _ => continue,
        };
        if !graph.insert(entry.key, node) {
            warn!(key = %entry.key, line = entry.line, "duplicate type entry ignored");
            diagnostics.push(entry.key.to_string(), "duplicate entry; first definition kept");
        }
    }

    (graph, aliases)
}
