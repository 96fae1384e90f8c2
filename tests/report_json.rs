//! JSON shape of the report types an orchestrator persists or diffs.
//! Field names are part of the interface once serialized, so they are
//! pinned here.

use pretty_assertions::assert_eq;
use refsafe::testkit::FixtureSemantics;
use refsafe::{
    analyze_range, DiagnosticRecord, Severity, Symbol, SymbolKind, ValidationResult,
};
use serde_json::json;

fn statements(body: &str) -> Vec<syn::Stmt> {
    let file: syn::File = syn::parse_str(&format!("fn f() {{ {body} }}")).unwrap();
    match &file.items[0] {
        syn::Item::Fn(f) => f.block.stmts.clone(),
        _ => unreachable!(),
    }
}

#[test]
fn data_flow_facts_serialize_with_stable_field_names() {
    let stmts = statements("result = x + y;");
    let facts = FixtureSemantics::new()
        .with_live_in(Symbol::new("x", SymbolKind::Local).with_type("i32"))
        .with_live_in(Symbol::new("y", SymbolKind::Local).with_type("i32"))
        .with_always_assigned(Symbol::new("result", SymbolKind::Local).with_type("i32"));

    let contract = analyze_range(&stmts, &facts).unwrap();

    assert_eq!(
        serde_json::to_value(&contract).unwrap(),
        json!({
            "inputs": ["x", "y"],
            "outputs": [],
            "locals": ["result"],
            "captured": [],
            "declared_inside": [],
            "variable_types": { "result": "i32", "x": "i32", "y": "i32" },
        })
    );
}

#[test]
fn validation_result_survives_a_json_round_trip() {
    let result = ValidationResult {
        is_valid: false,
        errors: vec![DiagnosticRecord::new(
            Severity::Error,
            "E0425",
            "cannot find function `nope`",
            "a.rs",
            3,
            7,
        )],
        warnings: Vec::new(),
    };

    let encoded = serde_json::to_string(&result).unwrap();
    let decoded: ValidationResult = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, result);
    assert!(encoded.contains("\"is_valid\":false"));
}
