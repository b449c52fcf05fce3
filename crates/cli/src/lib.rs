//! Library half of the `dwarf-glue` CLI.
//!
//! Command implementations live here (rather than in `main.rs`) so tests can
//! call them in-process.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dwarf_glue_core::config::{load_config, BindingConfig};

pub mod commands;
pub mod logging;

/// Canonicalize a path if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    if candidate == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        // The path may not exist yet (e.g. a fresh output dir).
        match candidate.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(candidate))
            }
        }
    }
}

/// Load the config file if one was given, otherwise use the defaults.
pub fn load_config_or_default(path: Option<&str>) -> Result<BindingConfig> {
    match path {
        Some(p) => load_config(Path::new(p)),
        None => Ok(BindingConfig::default()),
    }
}
