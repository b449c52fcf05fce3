use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use dwarf_glue::commands::{
    functions_command, generate_command, init_config_command, resolve_command,
};
use dwarf_glue::logging::init_logging;

/// Lua binding generator for kernel C functions described by DWARF debug info.
///
/// This CLI is a thin wrapper around `dwarf-glue-core` (exposed in code as
/// `dwarf_glue_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "dwarf-glue",
    version,
    about = "Generate Lua call glue from a readelf debug-info dump",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the whole pipeline and write the generated artifacts.
    ///
    /// This writes, into the output directory:
    /// - the excluded-function list,
    /// - the resolved-function audit listing,
    /// - the generated C binding unit,
    /// - the diagnostics log.
    Generate {
        /// Path to the text produced by `readelf --debug-dump=info`.
        #[arg(long)]
        dump: String,

        /// Output directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        out_dir: String,

        /// Optional config file (YAML, or JSON with a `.json` extension).
        #[arg(long)]
        config: Option<String>,
    },

    /// List the functions that would be bound, without writing files.
    Functions {
        #[arg(long)]
        dump: String,

        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of a human-readable listing.
        #[arg(long)]
        json: bool,
    },

    /// Resolve a single type key (e.g. `0x2d`) to its C declaration.
    Resolve {
        #[arg(long)]
        dump: String,

        /// Entry key, hex with or without `0x`.
        #[arg(long)]
        key: String,

        #[arg(long)]
        config: Option<String>,
    },

    /// Write the default configuration to a file.
    InitConfig {
        #[arg(long, default_value = "dwarf-glue.yaml")]
        path: String,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Generate { dump, out_dir, config } => {
            generate_command(&dump, &out_dir, config.as_deref())?
        }
        Command::Functions { dump, config, json } => {
            functions_command(&dump, config.as_deref(), json)?
        }
        Command::Resolve { dump, key, config } => resolve_command(&dump, &key, config.as_deref())?,
        Command::InitConfig { path, force } => init_config_command(&path, force)?,
    }

    Ok(())
}
