//! Debug-information dump ingestion: line tokenizer and entry tree walker.

pub mod tokenizer;
pub mod walker;

pub use tokenizer::{classify_line, DumpLine, DumpLineKind, Tokenizer};
pub use walker::{walk_entries, TreeWalker};

use crate::config::SourceScope;
use crate::model::DebugEntry;

/// Tokenize and walk a dump in one go.
pub fn parse_dump(dump: &str, scope: &SourceScope) -> Vec<DebugEntry> {
    walk_entries(Tokenizer::new(dump), scope)
}
