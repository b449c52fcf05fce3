use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::{BindingConfig, OutputNames};
use crate::diagnostics::Diagnostics;
use crate::dump::parse_dump;
use crate::model::{DebugEntry, EntryKey, ResolvedFunction, ResolvedParameter};
use crate::services::codegen::GlueGenerator;
use crate::services::extractor::{extract_signatures, Extraction};
use crate::services::filter::{BindingFilter, FilterOutcome};
use crate::services::resolver::{build_type_graph, ResolutionError, TypeGraph, TypedefAliases};

/// State owned by the resolver stage and lent to the filter.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    pub graph: TypeGraph,
    pub aliases: TypedefAliases,
}

impl ResolutionContext {
    pub fn from_entries(entries: &[DebugEntry], diagnostics: &mut Diagnostics) -> Self {
        let (graph, aliases) = build_type_graph(entries, diagnostics);
        Self { graph, aliases }
    }

    pub fn resolve(
        &self,
        key: EntryKey,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, ResolutionError> {
        self.graph.resolve(key, diagnostics)
    }
}

/// Everything one run produced, before anything touches the filesystem.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// SHA-256 of the dump text, recorded in the generated unit.
    pub dump_digest: String,
    pub entry_count: usize,
    pub extraction: Extraction,
    pub outcome: FilterOutcome,
    pub diagnostics: Diagnostics,
    /// The generated C unit.
    pub source: String,
}

/// Paths of the files written by [`PipelineOutput::write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub excluded: PathBuf,
    pub listing: PathBuf,
    pub source: PathBuf,
    pub diagnostics: PathBuf,
}

impl PipelineOutput {
    pub fn bindable(&self) -> &[ResolvedFunction] {
        &self.outcome.bindable
    }

    /// Unresolved pool followed by excluded functions, deduplicated in first-seen order.
    pub fn excluded_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.extraction
            .unresolved_pool
            .iter()
            .chain(self.outcome.excluded.iter())
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn excluded_listing(&self) -> String {
        let mut out = String::new();
        for name in self.excluded_names() {
            out.push_str(&name);
            out.push('\n');
        }
        out
    }

    /// Human-readable audit listing of the bindable functions.
    pub fn resolved_listing(&self) -> String {
        let mut out = String::new();
        for function in &self.outcome.bindable {
            let params: Vec<String> = function
                .parameters
                .iter()
                .map(|p| match p {
                    ResolvedParameter::Named { name, ty, .. } => format!("{name}: {ty}"),
                    ResolvedParameter::Variadic => "...".to_string(),
                })
                .collect();
            let typedefs: Vec<String> = function
                .typedefs
                .iter()
                .map(|t| format!("{} -> {} = {}", t.parameter, t.alias, t.target))
                .collect();
            let _ = writeln!(
                out,
                "{}: returns {}; params ({}); typedefs {{{}}}",
                function.name,
                function.return_type,
                params.join(", "),
                typedefs.join(", ")
            );
        }
        out
    }

    /// Write every artifact into `dir`, creating it if needed.
    pub fn write_outputs(&self, dir: &Path, names: &OutputNames) -> Result<WrittenOutputs> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
        let written = WrittenOutputs {
            excluded: dir.join(&names.excluded),
            listing: dir.join(&names.listing),
            source: dir.join(&names.source),
            diagnostics: dir.join(&names.diagnostics),
        };
        write_file(&written.excluded, &self.excluded_listing())?;
        write_file(&written.listing, &self.resolved_listing())?;
        write_file(&written.source, &self.source)?;
        write_file(&written.diagnostics, &self.diagnostics.to_listing())?;
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Hex SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Tokenizer -> walker -> extractor/resolver -> filter -> generator, in one pass.
pub struct Pipeline {
    config: BindingConfig,
}

impl Pipeline {
    pub fn new(config: BindingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Build only the resolver state for a dump (used to inspect single keys).
    pub fn resolution_context(
        &self,
        dump: &str,
        diagnostics: &mut Diagnostics,
    ) -> ResolutionContext {
        let entries = parse_dump(dump, &self.config.scope);
        ResolutionContext::from_entries(&entries, diagnostics)
    }

    /// Run every stage over dump text already in memory.
    pub fn run(&self, dump: &str) -> PipelineOutput {
        let mut diagnostics = Diagnostics::new();
        let entries = parse_dump(dump, &self.config.scope);
        let context = ResolutionContext::from_entries(&entries, &mut diagnostics);
        let extraction = extract_signatures(&entries, &mut diagnostics);

        let filter = BindingFilter::new(&self.config, &context.graph, &context.aliases);
        let outcome = filter.filter(&extraction.signatures, &mut diagnostics);

        let dump_digest = sha256_hex(dump.as_bytes());
        let provenance = format!("source dump sha256: {dump_digest}");
        let source =
            GlueGenerator::new(&self.config.codegen).render(&outcome.bindable, Some(&provenance));

        info!(
            entries = entries.len(),
            types = context.graph.len(),
            signatures = extraction.signatures.len(),
            bindable = outcome.bindable.len(),
            excluded = outcome.excluded.len(),
            diagnostics = diagnostics.len(),
            "binding generation finished"
        );

        PipelineOutput {
            dump_digest,
            entry_count: entries.len(),
            extraction,
            outcome,
            diagnostics,
            source,
        }
    }

    /// Read a dump from disk and run every stage.
    pub fn run_file(&self, dump_path: &Path) -> Result<PipelineOutput> {
        let dump = read_dump(dump_path)?;
        Ok(self.run(&dump))
    }
}

/// Read a dump file; invalid UTF-8 is replaced rather than rejected.
pub fn read_dump(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read debug dump at {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
