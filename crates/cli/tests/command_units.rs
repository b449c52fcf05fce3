use std::fs;

use dwarf_glue::commands::{
    functions_command, generate_command, init_config_command, resolve_command,
};
use dwarf_glue::logging::{level_for_verbosity, LogFormat};
use dwarf_glue::{canonicalize_or_current, load_config_or_default};
use dwarf_glue_core::config::BindingConfig;
use tempfile::tempdir;
use tracing::Level;

const DUMP: &str = "
 <1><2d>: Abbrev Number: 2 (DW_TAG_base_type)
    <30>   DW_AT_name        : double
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : scale
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_low_pc      : 0x1000
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : x
    <57>   DW_AT_type        : <0x2d>
";

#[test]
fn canonicalize_or_current_joins_missing_paths_onto_cwd() {
    let result = canonicalize_or_current("not-created-yet").expect("path");
    assert!(result.is_absolute());
    assert!(result.ends_with("not-created-yet"));
}

#[test]
fn load_config_or_default_without_path_is_default() {
    assert_eq!(load_config_or_default(None).expect("config"), BindingConfig::default());
}

#[test]
fn load_config_or_default_surfaces_bad_files() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "ignore_types: 12\n").expect("write");
    assert!(load_config_or_default(Some(path.to_str().expect("utf8 path"))).is_err());
}

#[test]
fn generate_command_in_process() {
    let dir = tempdir().expect("tempdir");
    let dump = dir.path().join("dump.txt");
    fs::write(&dump, DUMP).expect("write dump");
    let out = dir.path().join("out");

    generate_command(
        dump.to_str().expect("utf8"),
        out.to_str().expect("utf8"),
        None,
    )
    .expect("generate");

    let source = fs::read_to_string(out.join("lnautlib.c")).expect("source");
    assert!(source.contains("\tdouble x = (double)luaL_checknumber(L, 1);\n"));
}

#[test]
fn inspect_commands_in_process() {
    let dir = tempdir().expect("tempdir");
    let dump = dir.path().join("dump.txt");
    fs::write(&dump, DUMP).expect("write dump");
    let dump = dump.to_str().expect("utf8");

    functions_command(dump, None, false).expect("functions");
    functions_command(dump, None, true).expect("functions json");
    resolve_command(dump, "0x2d", None).expect("resolve");
    assert!(resolve_command(dump, "zz", None).is_err());
    assert!(resolve_command(dump, "0x77", None).is_err());
}

#[test]
fn init_config_command_supports_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("glue.json");
    let path = path.to_str().expect("utf8");

    init_config_command(path, false).expect("init");
    let body = fs::read_to_string(path).expect("read");
    let parsed: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(parsed["codegen"]["library_name"], "naut");

    assert!(init_config_command(path, false).is_err());
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(level_for_verbosity(0), Level::WARN);
    assert_eq!(level_for_verbosity(1), Level::INFO);
    assert_eq!(level_for_verbosity(2), Level::DEBUG);
    assert_eq!(level_for_verbosity(9), Level::TRACE);
}

#[test]
fn log_format_parses_known_names() {
    assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
    assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
    assert!("xml".parse::<LogFormat>().is_err());
}
