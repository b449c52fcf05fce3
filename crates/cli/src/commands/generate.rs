use std::path::Path;

use anyhow::Result;
use dwarf_glue_core::services::Pipeline;
use tracing::info;

use crate::{canonicalize_or_current, load_config_or_default};

/// Run the full pipeline over a dump and write every artifact into `out_dir`.
pub fn generate_command(dump: &str, out_dir: &str, config: Option<&str>) -> Result<()> {
    let config = load_config_or_default(config)?;
    let out_dir = canonicalize_or_current(out_dir)?;
    let pipeline = Pipeline::new(config);

    info!(dump, out_dir = %out_dir.display(), "generating bindings");
    let output = pipeline.run_file(Path::new(dump))?;
    let written = output.write_outputs(&out_dir, &pipeline.config().outputs)?;

    println!("Generated Lua bindings:");
    println!("  Dump: {} (sha256 {})", dump, output.dump_digest);
    println!("  Debug entries: {}", output.entry_count);
    println!("  Functions found: {}", output.extraction.signatures.len());
    println!("  Bindable: {}", output.bindable().len());
    println!("  Excluded: {}", output.excluded_names().len());
    println!("  Diagnostics: {}", output.diagnostics.len());
    println!("  Source: {}", written.source.display());
    println!("  Listing: {}", written.listing.display());
    println!("  Excluded list: {}", written.excluded.display());
    println!("  Diagnostics log: {}", written.diagnostics.display());

    Ok(())
}
