use std::path::Path;

use anyhow::{anyhow, Context, Result};
use dwarf_glue_core::diagnostics::Diagnostics;
use dwarf_glue_core::model::EntryKey;
use dwarf_glue_core::services::{read_dump, Pipeline};

use crate::load_config_or_default;

/// Print the resolved (bindable) functions of a dump without writing any files.
pub fn functions_command(dump: &str, config: Option<&str>, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(load_config_or_default(config)?);
    let output = pipeline.run_file(Path::new(dump))?;

    if json {
        let serialized = serde_json::to_string_pretty(output.bindable())
            .context("Failed to serialize functions to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Bindable functions ({}):", output.bindable().len());
    if output.bindable().is_empty() {
        println!("  (none)");
        return Ok(());
    }
    print!("{}", output.resolved_listing());
    Ok(())
}

/// Resolve one type key and print its C declaration.
pub fn resolve_command(dump: &str, key: &str, config: Option<&str>) -> Result<()> {
    let key: EntryKey = key.parse().map_err(|e: String| anyhow!(e))?;
    let pipeline = Pipeline::new(load_config_or_default(config)?);
    let dump_text = read_dump(Path::new(dump))?;

    let mut diagnostics = Diagnostics::new();
    let context = pipeline.resolution_context(&dump_text, &mut diagnostics);
    let resolved = context
        .resolve(key, &mut diagnostics)
        .map_err(|e| anyhow!("Failed to resolve {key}: {e}"))?;

    println!("{key}: {resolved}");
    Ok(())
}
