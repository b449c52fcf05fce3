use std::fs;
use std::path::Path;

use dwarf_glue_core::config::{load_config, render_config, BindingConfig};
use tempfile::tempdir;

#[test]
fn defaults_match_the_kernel_layout() {
    let config = BindingConfig::default();
    assert!(config.ignores_type("struct __va_list_tag *"));
    assert!(!config.ignores_variadic());
    assert!(config.denies("panic"));
    assert_eq!(config.scope.include, vec!["src/nautilus/".to_string()]);
    assert_eq!(config.scope.exclude, vec!["src/lua_src/".to_string()]);
    assert_eq!(config.codegen.library_name, "naut");
    assert_eq!(config.outputs.source, "lnautlib.c");
    config.validate().expect("defaults are valid");
}

#[test]
fn empty_yaml_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("dwarf-glue.yaml");
    fs::write(&path, "").expect("write");
    assert_eq!(load_config(&path).expect("load"), BindingConfig::default());
}

#[test]
fn partial_yaml_overrides_only_named_fields() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("dwarf-glue.yaml");
    fs::write(&path, "deny_functions:\n  - panic\n  - reboot\ncodegen:\n  library_name: kernel\n")
        .expect("write");

    let config = load_config(&path).expect("load");
    assert!(config.denies("reboot"));
    assert_eq!(config.codegen.library_name, "kernel");
    assert_eq!(config.codegen.table_name, "nautlib");
    assert_eq!(config.ignore_types, BindingConfig::default().ignore_types);
}

#[test]
fn json_config_is_parsed_by_extension() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"ignore_types": ["..."]}"#).expect("write");

    let config = load_config(&path).expect("load");
    assert!(config.ignores_variadic());
    assert!(!config.ignores_type("struct __va_list_tag *"));
}

#[test]
fn invalid_identifiers_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "codegen:\n  wrapper_prefix: naut-\n").expect("write");

    let err = load_config(&path).expect_err("invalid prefix");
    assert!(err.to_string().contains("codegen.wrapper_prefix"));
}

#[test]
fn rendered_config_loads_back() {
    let dir = tempdir().expect("tempdir");
    for name in ["out.yaml", "out.json"] {
        let path = dir.path().join(name);
        let body = render_config(&BindingConfig::default(), &path).expect("render");
        fs::write(&path, body).expect("write");
        assert_eq!(load_config(&path).expect("load"), BindingConfig::default());
    }
}

#[test]
fn missing_config_file_is_an_error() {
    let err = load_config(Path::new("/definitely/not/here.yaml")).expect_err("missing");
    assert!(err.to_string().contains("Failed to read config"));
}
