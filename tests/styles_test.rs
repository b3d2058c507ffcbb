use termsum::{DEFAULT_STYLE, StyleCatalog, StyleEntry, TermsumError};

#[test]
fn known_styles_resolve_to_themselves() {
    let catalog = StyleCatalog::default();
    for id in ["curto", "detalhado", "el5", "riscos"] {
        assert_eq!(catalog.lookup(id).id, id);
    }
}

#[test]
fn unknown_style_falls_back_to_default() {
    let catalog = StyleCatalog::default();
    assert_eq!(catalog.lookup("poema").id, DEFAULT_STYLE);
    assert_eq!(catalog.lookup("").id, "curto");
    assert_eq!(catalog.lookup("RISCOS").id, "curto");
    assert!(!catalog.contains("poema"));
}

#[test]
fn builtin_entries_are_complete() {
    let catalog = StyleCatalog::default();
    for id in catalog.ids() {
        let entry = catalog.lookup(id);
        assert!(!entry.persona.is_empty(), "{id} persona");
        assert!(!entry.instruction.is_empty(), "{id} instruction");
        assert!(!entry.constraints.is_empty(), "{id} constraints");
    }
}

#[test]
fn custom_catalog_requires_defined_default() {
    let entries = vec![StyleEntry::new("breve", "p", "i", "c")];
    let err = StyleCatalog::new(entries.clone(), "longo").unwrap_err();
    assert!(matches!(err, TermsumError::Configuration(_)));

    let catalog = StyleCatalog::new(entries, "breve").unwrap();
    assert_eq!(catalog.lookup("anything").id, "breve");
    assert_eq!(catalog.lookup("breve").max_output_tokens, None);
}
