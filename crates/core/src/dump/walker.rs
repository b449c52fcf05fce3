use tracing::trace;

use crate::config::SourceScope;
use crate::dump::tokenizer::{DumpLine, DumpLineKind};
use crate::model::{AttrName, Attribute, DebugEntry};

/// Groups tokenized lines into debug entries and tracks which source files are ours.
///
/// An entry owns every attribute line up to the next header. The scope flag is
/// toggled by `DW_AT_name` values naming our sources or the generated bindings;
/// each entry records the flag in force when its block closes.
pub struct TreeWalker<'a> {
    scope: &'a SourceScope,
    in_scope: bool,
    current: Option<DebugEntry>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(scope: &'a SourceScope) -> Self {
        Self { scope, in_scope: true, current: None }
    }

    /// Feed one line; returns the entry it closed, if any.
    pub fn push(&mut self, line: DumpLine) -> Option<DebugEntry> {
        match line.kind {
            DumpLineKind::EntryHeader { depth, key, tag } => {
                let closed = self.finish();
                self.current = Some(DebugEntry::new(key, depth, tag, line.line));
                closed
            }
            DumpLineKind::Attribute { name, value } => {
                if name == AttrName::Name {
                    self.update_scope(&value);
                }
                match self.current.as_mut() {
                    Some(entry) => entry.attributes.push(Attribute { name, value }),
                    None => trace!(line = line.line, "attribute outside of any entry"),
                }
                None
            }
        }
    }

    /// Close the entry in progress, if any.
    pub fn finish(&mut self) -> Option<DebugEntry> {
        let mut entry = self.current.take()?;
        entry.in_scope = self.in_scope;
        Some(entry)
    }

    fn update_scope(&mut self, name: &str) {
        if self.scope.exclude.iter().any(|p| name.contains(p.as_str())) {
            self.in_scope = false;
        } else if self.scope.include.iter().any(|p| name.contains(p.as_str())) {
            self.in_scope = true;
        }
    }
}

/// Walk a whole line stream into entries, in dump order.
pub fn walk_entries(
    lines: impl IntoIterator<Item = DumpLine>,
    scope: &SourceScope,
) -> Vec<DebugEntry> {
    let mut walker = TreeWalker::new(scope);
    let mut entries = Vec::new();
    for line in lines {
        if let Some(entry) = walker.push(line) {
            entries.push(entry);
        }
    }
    entries.extend(walker.finish());
    entries
}
