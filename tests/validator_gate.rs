//! Validation gate behavior against a live diagnostics provider.
//!
//! Uses a small callee-resolution diagnostics source over real snapshots,
//! so unit substitution and cross-file resolution are exercised for real
//! rather than scripted.

use pretty_assertions::assert_eq;
use refsafe::testkit::{snapshot_from_sources, unit_from_source};
use refsafe::{
    DiagnosticRecord, DiagnosticsSource, ProgramSnapshot, SemanticValidator, Severity,
};
use syn::spanned::Spanned;
use syn::visit::Visit;

/// Flags every call to a function not defined anywhere in the snapshot.
struct CalleeDiagnostics;

#[derive(Default)]
struct DefinedFunctions {
    names: Vec<String>,
}

impl<'ast> Visit<'ast> for DefinedFunctions {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.names.push(node.sig.ident.to_string());
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.names.push(node.sig.ident.to_string());
        syn::visit::visit_impl_item_fn(self, node);
    }
}

#[derive(Default)]
struct CallSites {
    calls: Vec<(String, usize, usize)>,
}

impl<'ast> Visit<'ast> for CallSites {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(path) = &*node.func {
            if path.qself.is_none() && path.path.segments.len() == 1 {
                let start = node.span().start();
                self.calls.push((
                    path.path.segments[0].ident.to_string(),
                    start.line,
                    start.column,
                ));
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}

impl DiagnosticsSource for CalleeDiagnostics {
    fn diagnostics(&self, snapshot: &ProgramSnapshot) -> anyhow::Result<Vec<DiagnosticRecord>> {
        let mut defined = DefinedFunctions::default();
        for unit in snapshot.units() {
            defined.visit_file(&unit.ast);
        }

        let mut records = Vec::new();
        for unit in snapshot.units() {
            let mut sites = CallSites::default();
            sites.visit_file(&unit.ast);
            for (callee, line, column) in sites.calls {
                if !defined.names.contains(&callee) {
                    records.push(DiagnosticRecord::new(
                        Severity::Error,
                        "E0425",
                        format!("cannot find function `{callee}`"),
                        unit.path.clone(),
                        line,
                        column,
                    ));
                }
            }
        }
        Ok(records)
    }
}

fn program() -> ProgramSnapshot {
    snapshot_from_sources(&[
        ("a.rs", "pub fn alpha() { beta(); }"),
        ("b.rs", "pub fn beta() {}"),
        // Pre-existing breakage, unrelated to anything we modify.
        ("broken.rs", "pub fn gamma() { missing(); }"),
    ])
}

#[test]
fn noop_transform_is_valid_despite_preexisting_errors() {
    let snapshot = program();
    let unchanged = unit_from_source("a.rs", "pub fn alpha() { beta(); }");

    let result = SemanticValidator::new(&CalleeDiagnostics).validate(&unchanged, &snapshot);

    assert!(result.is_valid);
    assert_eq!(result.errors, vec![]);
}

#[test]
fn one_new_undefined_reference_is_exactly_one_regression() {
    let snapshot = program();
    let modified = unit_from_source("a.rs", "pub fn alpha() { beta(); nope(); }");

    let result = SemanticValidator::new(&CalleeDiagnostics).validate(&modified, &snapshot);

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("`nope`"));
    // The baseline `missing()` error is tolerated, not duplicated.
    assert!(result
        .errors
        .iter()
        .all(|e| !e.message.contains("`missing`")));
}

#[test]
fn regression_in_another_file_is_caught_through_substitution() {
    let snapshot = program();
    // Renaming beta breaks a.rs, a file we did not touch. Cross-file
    // resolution over the substituted snapshot must see it.
    let modified = unit_from_source("b.rs", "pub fn beta_renamed() {}");

    let result = SemanticValidator::new(&CalleeDiagnostics).validate(&modified, &snapshot);

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("`beta`"));
    assert_eq!(result.errors[0].path, std::path::PathBuf::from("a.rs"));
}

#[test]
fn original_snapshot_is_untouched_by_validation() {
    let snapshot = program();
    let modified = unit_from_source("a.rs", "pub fn alpha() {}");

    let _ = SemanticValidator::new(&CalleeDiagnostics).validate(&modified, &snapshot);

    // The snapshot still holds the original unit; a no-op validation
    // against it stays green.
    let original = snapshot.unit(std::path::Path::new("a.rs")).unwrap();
    assert_eq!(
        original.ast,
        unit_from_source("a.rs", "pub fn alpha() { beta(); }").ast
    );
    let again = SemanticValidator::new(&CalleeDiagnostics)
        .validate(&unit_from_source("a.rs", "pub fn alpha() { beta(); }"), &snapshot);
    assert!(again.is_valid);
}
