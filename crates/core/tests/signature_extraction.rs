use dwarf_glue_core::config::SourceScope;
use dwarf_glue_core::diagnostics::Diagnostics;
use dwarf_glue_core::dump::parse_dump;
use dwarf_glue_core::model::{EntryKey, Linkage, Parameter, ReturnType};
use dwarf_glue_core::services::{extract_signatures, Extraction};

fn extract(dump: &str) -> (Extraction, Diagnostics) {
    let entries = parse_dump(dump, &SourceScope::default());
    let mut diagnostics = Diagnostics::new();
    let extraction = extract_signatures(&entries, &mut diagnostics);
    (extraction, diagnostics)
}

const EXTERNAL_WITH_PARAMS: &str = "
 <0><b>: Abbrev Number: 1 (DW_TAG_compile_unit)
    <10>   DW_AT_name        : src/nautilus/dev.c
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : dev_write
    <45>   DW_AT_decl_file   : 1
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_low_pc      : 0xffffffff81000000
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : dev
    <57>   DW_AT_type        : <0x60>
 <2><5b>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <5c>   DW_AT_type        : <0x2d>
    <60>   DW_AT_name        : len
 <2><64>: Abbrev Number: 0
";

#[test]
fn external_function_with_parameters() {
    let (extraction, diagnostics) = extract(EXTERNAL_WITH_PARAMS);
    assert!(diagnostics.is_empty());
    assert_eq!(extraction.signatures.len(), 1);

    let sig = &extraction.signatures[0];
    assert_eq!(sig.name, "dev_write");
    assert_eq!(sig.address, EntryKey(0x40));
    assert_eq!(sig.linkage, Linkage::External);
    assert_eq!(sig.return_type, ReturnType::Ref(EntryKey(0x2d)));
    assert_eq!(
        sig.parameters,
        vec![Parameter::named("dev", EntryKey(0x60)), Parameter::named("len", EntryKey(0x2d))]
    );
}

#[test]
fn missing_return_type_defaults_to_void() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : reset
    <4a>   DW_AT_low_pc      : 0x1000
 <1><50>: Abbrev Number: 3 (DW_TAG_subprogram)
    <51>   DW_AT_external    : 1
    <51>   DW_AT_name        : poke
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : v
    <57>   DW_AT_type        : <0x2d>
";
    let (extraction, _) = extract(dump);
    assert_eq!(extraction.signatures.len(), 2);
    assert!(extraction.signatures.iter().all(|s| s.return_type == ReturnType::Void));
}

#[test]
fn function_without_external_is_static() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_name        : helper
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_low_pc      : 0x1000
";
    let (extraction, diagnostics) = extract(dump);
    assert!(diagnostics.is_empty());
    assert_eq!(extraction.signatures.len(), 1);
    assert_eq!(extraction.signatures[0].linkage, Linkage::Static);
}

#[test]
fn inlined_function_goes_to_unresolved_pool() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : fast_path
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_inline      : 3\t(declared as inline and inlined)
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : x
    <57>   DW_AT_type        : <0x2d>
";
    let (extraction, _) = extract(dump);
    assert!(extraction.signatures.is_empty());
    assert_eq!(extraction.unresolved_pool, vec!["fast_path".to_string()]);
}

#[test]
fn unspecified_parameters_become_variadic() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : printk
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_low_pc      : 0x1000
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : fmt
    <57>   DW_AT_type        : <0x70>
 <2><5b>: Abbrev Number: 5 (DW_TAG_unspecified_parameters)
 <2><5c>: Abbrev Number: 0
";
    let (extraction, _) = extract(dump);
    let sig = &extraction.signatures[0];
    assert_eq!(sig.parameters.len(), 2);
    assert_eq!(sig.parameters[1], Parameter::Variadic);
}

#[test]
fn malformed_parameter_is_dropped_and_logged() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : broken
    <4a>   DW_AT_low_pc      : 0x1000
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <57>   DW_AT_type        : <0x2d>
 <2><5b>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <5c>   DW_AT_name        : ok
    <60>   DW_AT_type        : <0x2d>
";
    let (extraction, diagnostics) = extract(dump);
    let sig = &extraction.signatures[0];
    assert_eq!(sig.parameters, vec![Parameter::named("ok", EntryKey(0x2d))]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.entries()[0].subject, "broken(<unnamed>)");
}

#[test]
fn depth_one_entry_closes_a_truncated_parameter() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : first
    <4a>   DW_AT_low_pc      : 0x1000
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_name        : half
 <1><60>: Abbrev Number: 3 (DW_TAG_subprogram)
    <61>   DW_AT_external    : 1
    <61>   DW_AT_name        : second
    <6a>   DW_AT_low_pc      : 0x2000
 <2><72>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <77>   DW_AT_type        : <0x2d>
    <73>   DW_AT_name        : whole
";
    let (extraction, diagnostics) = extract(dump);
    assert_eq!(extraction.signatures.len(), 2);
    assert!(extraction.signatures[0].parameters.is_empty());
    assert_eq!(
        extraction.signatures[1].parameters,
        vec![Parameter::named("whole", EntryKey(0x2d))]
    );
    assert_eq!(diagnostics.about("first(half)").count(), 1);
}

#[test]
fn out_of_scope_functions_are_not_extracted() {
    let dump = "
 <0><b>: Abbrev Number: 1 (DW_TAG_compile_unit)
    <10>   DW_AT_name        : src/lua_src/lapi.c
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : lua_gettop
    <4a>   DW_AT_low_pc      : 0x1000
";
    let (extraction, _) = extract(dump);
    assert!(extraction.signatures.is_empty());
}

#[test]
fn nested_children_are_not_parameters() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : outer
    <4a>   DW_AT_low_pc      : 0x1000
 <2><50>: Abbrev Number: 6 (DW_TAG_lexical_block)
 <3><51>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <52>   DW_AT_name        : shadow
    <56>   DW_AT_type        : <0x2d>
";
    let (extraction, _) = extract(dump);
    assert!(extraction.signatures[0].parameters.is_empty());
}

#[test]
fn declarations_are_flagged_and_unnamed_parameters_are_quiet() {
    let dump = "
 <1><40>: Abbrev Number: 3 (DW_TAG_subprogram)
    <41>   DW_AT_external    : 1
    <41>   DW_AT_name        : dev_open
    <46>   DW_AT_type        : <0x2d>
    <4a>   DW_AT_declaration : 1
 <2><52>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <53>   DW_AT_type        : <0x2d>
 <2><57>: Abbrev Number: 0
 <1><60>: Abbrev Number: 3 (DW_TAG_subprogram)
    <61>   DW_AT_external    : 1
    <61>   DW_AT_name        : dev_open
    <66>   DW_AT_type        : <0x2d>
    <6a>   DW_AT_low_pc      : 0x1000
 <2><72>: Abbrev Number: 4 (DW_TAG_formal_parameter)
    <73>   DW_AT_name        : id
    <77>   DW_AT_type        : <0x2d>
";
    let (extraction, diagnostics) = extract(dump);
    assert!(diagnostics.is_empty());
    assert_eq!(extraction.signatures.len(), 2);
    assert!(extraction.signatures[0].declaration);
    assert!(extraction.signatures[0].parameters.is_empty());
    assert!(!extraction.signatures[1].declaration);
    assert_eq!(extraction.signatures[1].parameters, vec![Parameter::named("id", EntryKey(0x2d))]);
}
