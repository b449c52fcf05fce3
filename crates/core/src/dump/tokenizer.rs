//! Line classifier for `readelf --debug-dump=info` output.
//!
//! Two line shapes matter:
//!
//! ```text
//!  <1><2d>: Abbrev Number: 2 (DW_TAG_base_type)
//!     <31>   DW_AT_name        : (indirect string, offset: 0x5a): long int
//! ```
//!
//! Everything else (unit headers, banners, blank lines) is skipped.

use crate::model::{AttrName, DieTag, EntryKey};

/// A structurally significant line of the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLine {
    /// 1-based line number.
    pub line: usize,
    pub kind: DumpLineKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpLineKind {
    /// `<depth><offset>: Abbrev Number: N (DW_TAG_...)`.
    EntryHeader { depth: u32, key: EntryKey, tag: DieTag },
    /// `<offset>   DW_AT_... : value`.
    Attribute { name: AttrName, value: String },
}

/// Iterator over the significant lines of a dump.
pub struct Tokenizer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(dump: &'a str) -> Self {
        Self { lines: dump.lines().enumerate() }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = DumpLine;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, text) in self.lines.by_ref() {
            if let Some(kind) = classify_line(text) {
                return Some(DumpLine { line: idx + 1, kind });
            }
        }
        None
    }
}

/// Classify a single dump line; `None` for lines the pipeline ignores.
pub fn classify_line(text: &str) -> Option<DumpLineKind> {
    let text = text.trim_start();
    let (first, rest) = take_angle(text)?;

    // Entry header: a second `<...>` follows immediately.
    if let Some((second, after)) = take_angle(rest) {
        let depth = first.parse::<u32>().ok()?;
        let key = EntryKey::parse_hex(second)?;
        let after = after.strip_prefix(':')?.trim();
        if !after.starts_with("Abbrev Number:") {
            return None;
        }
        return Some(DumpLineKind::EntryHeader { depth, key, tag: header_tag(after) });
    }

    // Attribute: `<offset>` then a `DW_AT_` name.
    EntryKey::parse_hex(first)?;
    let rest = rest.trim_start();
    if !rest.starts_with("DW_AT_") {
        return None;
    }
    let name_end = rest.find(|c: char| c.is_whitespace() || c == ':').unwrap_or(rest.len());
    let name = &rest[..name_end];
    let value = match rest.rfind(':') {
        Some(pos) if pos >= name_end => rest[pos + 1..].trim(),
        _ => "",
    };
    Some(DumpLineKind::Attribute {
        name: AttrName::from_dwarf_name(name),
        value: value.to_string(),
    })
}

/// Split `<inner>rest` into `(inner, rest)`.
fn take_angle(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('<')?;
    let close = body.find('>')?;
    Some((&body[..close], &body[close + 1..]))
}

/// Tag named in the trailing `(DW_TAG_...)`, or `Null` for `Abbrev Number: 0`.
fn header_tag(header: &str) -> DieTag {
    let tag = header
        .rfind('(')
        .and_then(|open| header[open + 1..].split(')').next())
        .map(str::trim)
        .filter(|t| t.starts_with("DW_TAG_"));
    match tag {
        Some(t) => DieTag::from_dwarf_name(t),
        None => DieTag::Null,
    }
}
