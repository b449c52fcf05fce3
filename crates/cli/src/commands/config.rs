use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use dwarf_glue_core::config::{render_config, BindingConfig};

/// Write the default configuration to `path` (JSON for `.json`, YAML otherwise).
pub fn init_config_command(path: &str, force: bool) -> Result<()> {
    let target = Path::new(path);
    if target.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {}; pass --force to overwrite",
            target.display()
        ));
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
    }

    let body = render_config(&BindingConfig::default(), target)?;
    fs::write(target, body)
        .with_context(|| format!("Failed to write config: {}", target.display()))?;

    println!("Wrote default config to {}", target.display());
    Ok(())
}
