//! Unused-member detection, in two strategies.
//!
//! With a whole-program snapshot available, a symbol-aware reference search
//! decides whether a non-public member is referenced anywhere beyond its
//! own declaration. With only a single file, a syntactic fallback counts
//! name occurrences instead. The fallback has no symbol binding: a name
//! that lexically collides with an unrelated identifier is counted as a
//! use, so shadowed or overloaded names can hide genuinely unused members.
//! That is a deliberate best-effort trade: a false "used" is cheap, a false
//! "unused" is a broken safe-delete.

use crate::core::errors::{Error, Result};
use crate::core::traits::ReferenceSearch;
use crate::core::types::{CompilationUnit, ProgramSnapshot, SourceLocation, Symbol, SymbolKind};
use crate::walkers::is_public;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use syn::visit::Visit;
use syn::{
    ExprCall, ExprField, ExprMethodCall, ExprPath, FieldValue, ImplItem, Item, Member,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Method,
    Field,
}

/// One member reported as unused, with its declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedMember {
    pub name: String,
    pub kind: MemberKind,
    pub path: PathBuf,
    pub line: usize,
}

/// Which detection strategy the available context supports.
///
/// Chosen explicitly by the caller: symbol-aware when a program-wide
/// semantic context exists, syntactic when a single file is all there is.
pub enum UnusedMemberStrategy<'a> {
    SymbolAware {
        snapshot: &'a ProgramSnapshot,
        search: &'a dyn ReferenceSearch,
    },
    Syntactic { unit: &'a CompilationUnit },
}

/// Run whichever strategy was supplied.
pub async fn detect_unused_members(
    strategy: UnusedMemberStrategy<'_>,
    cancel: &AtomicBool,
) -> Result<Vec<UnusedMember>> {
    match strategy {
        UnusedMemberStrategy::SymbolAware { snapshot, search } => {
            find_unused_members(snapshot, search, cancel).await
        }
        UnusedMemberStrategy::Syntactic { unit } => Ok(find_unused_members_syntactic(unit)),
    }
}

/// Symbol-aware detection: a non-public method/field is unused when every
/// reference the search finds coincides with its own declaration.
///
/// The per-candidate searches are cross-file queries and may be plentiful,
/// so the loop is asynchronous and honors a shared cancellation flag
/// between candidates. Cancellation yields [`Error::Cancelled`]; provider
/// failures come back as typed errors, never panics.
pub async fn find_unused_members(
    snapshot: &ProgramSnapshot,
    search: &dyn ReferenceSearch,
    cancel: &AtomicBool,
) -> Result<Vec<UnusedMember>> {
    let mut candidates: Vec<Candidate> = snapshot
        .units()
        .flat_map(|unit| collect_candidates(unit))
        .collect();
    candidates.sort_by(|a, b| {
        (&a.declaration.path, a.declaration.line, &a.symbol.name)
            .cmp(&(&b.declaration.path, b.declaration.line, &b.symbol.name))
    });
    debug!("unused-member scan over {} candidates", candidates.len());

    let mut unused = Vec::new();
    for candidate in candidates {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        let references = search.find_references(&candidate.symbol, snapshot)?;
        let only_declaration = references.iter().all(|loc| {
            loc.path == candidate.declaration.path && loc.line == candidate.declaration.line
        });
        if only_declaration {
            unused.push(UnusedMember {
                name: candidate.symbol.name,
                kind: candidate.kind,
                path: candidate.declaration.path,
                line: candidate.declaration.line,
            });
        }
        tokio::task::yield_now().await;
    }
    Ok(unused)
}

/// Syntactic fallback for a single file, no semantic context: count callee
/// and bare-identifier occurrences; zero occurrences beyond the declaration
/// means unused.
pub fn find_unused_members_syntactic(unit: &CompilationUnit) -> Vec<UnusedMember> {
    let candidates = collect_candidates(unit);
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut counter = OccurrenceCounter::default();
    counter.visit_file(&unit.ast);

    let mut unused: Vec<UnusedMember> = candidates
        .into_iter()
        .filter(|candidate| !counter.counts.contains_key(&candidate.symbol.name))
        .map(|candidate| UnusedMember {
            name: candidate.symbol.name,
            kind: candidate.kind,
            path: candidate.declaration.path,
            line: candidate.declaration.line,
        })
        .collect();
    unused.sort_by(|a, b| (a.line, &a.name).cmp(&(b.line, &b.name)));
    unused
}

struct Candidate {
    symbol: Symbol,
    kind: MemberKind,
    declaration: SourceLocation,
}

/// Every non-public method and field declared in the unit, including
/// inside nested `mod` blocks, with its declaration site. `main` and test
/// functions are implicitly referenced by the runtime/harness and never
/// candidates.
fn collect_candidates(unit: &CompilationUnit) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    collect_candidates_from_items(unit, &unit.ast.items, &mut candidates);
    candidates
}

fn collect_candidates_from_items(
    unit: &CompilationUnit,
    items: &[Item],
    candidates: &mut Vec<Candidate>,
) {
    let candidate = |name: String, kind: MemberKind, symbol_kind: SymbolKind, line: usize| {
        Candidate {
            symbol: Symbol::new(name, symbol_kind),
            kind,
            declaration: SourceLocation::new(unit.path.clone(), line, 0),
        }
    };

    for item in items {
        match item {
            Item::Fn(item_fn) if !is_public(&item_fn.vis) => {
                if item_fn.sig.ident == "main" || is_test_fn(&item_fn.attrs) {
                    continue;
                }
                candidates.push(candidate(
                    item_fn.sig.ident.to_string(),
                    MemberKind::Method,
                    SymbolKind::Method,
                    item_fn.sig.ident.span().start().line,
                ));
            }
            Item::Struct(item_struct) => {
                for field in &item_struct.fields {
                    let Some(ident) = &field.ident else { continue };
                    if is_public(&field.vis) {
                        continue;
                    }
                    candidates.push(candidate(
                        ident.to_string(),
                        MemberKind::Field,
                        SymbolKind::Field,
                        ident.span().start().line,
                    ));
                }
            }
            Item::Impl(item_impl) if item_impl.trait_.is_none() => {
                // Trait impl methods are called through the trait; only
                // inherent methods are candidates.
                for impl_item in &item_impl.items {
                    let ImplItem::Fn(method) = impl_item else {
                        continue;
                    };
                    if is_public(&method.vis) || is_test_fn(&method.attrs) {
                        continue;
                    }
                    candidates.push(candidate(
                        method.sig.ident.to_string(),
                        MemberKind::Method,
                        SymbolKind::Method,
                        method.sig.ident.span().start().line,
                    ));
                }
            }
            Item::Mod(item_mod) => {
                if let Some((_, inner)) = &item_mod.content {
                    collect_candidates_from_items(unit, inner, candidates);
                }
            }
            _ => {}
        }
    }
}

fn is_test_fn(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "test")
    })
}

/// Counts syntactic occurrences of names in reference position: invocation
/// callees, method names, bare identifiers, field accesses, and struct
/// literal fields. Declarations themselves are not expressions and are
/// never counted.
#[derive(Default)]
struct OccurrenceCounter {
    counts: HashMap<String, usize>,
}

impl OccurrenceCounter {
    fn bump(&mut self, name: String) {
        *self.counts.entry(name).or_insert(0) += 1;
    }
}

impl<'ast> Visit<'ast> for OccurrenceCounter {
    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if let syn::Expr::Path(ExprPath { path, .. }) = &*node.func {
            if let Some(seg) = path.segments.last() {
                self.bump(seg.ident.to_string());
            }
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.bump(node.method.to_string());
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        if node.qself.is_none() {
            if let Some(seg) = node.path.segments.last() {
                if seg.ident != "self" && seg.ident != "Self" {
                    self.bump(seg.ident.to_string());
                }
            }
        }
        syn::visit::visit_expr_path(self, node);
    }

    fn visit_expr_field(&mut self, node: &'ast ExprField) {
        if let Member::Named(ident) = &node.member {
            self.bump(ident.to_string());
        }
        syn::visit::visit_expr_field(self, node);
    }

    fn visit_field_value(&mut self, node: &'ast FieldValue) {
        if let Member::Named(ident) = &node.member {
            self.bump(ident.to_string());
        }
        syn::visit::visit_field_value(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::unit_from_source;
    use indoc::indoc;

    #[test]
    fn unreferenced_private_method_is_reported() {
        let unit = unit_from_source(
            "lib.rs",
            indoc! {"
                pub fn entry() { used(); }
                fn used() {}
                fn never_called() {}
            "},
        );
        let unused = find_unused_members_syntactic(&unit);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].name, "never_called");
        assert_eq!(unused[0].kind, MemberKind::Method);
        assert_eq!(unused[0].line, 3);
    }

    #[test]
    fn one_reference_anywhere_suppresses_the_report() {
        let unit = unit_from_source(
            "lib.rs",
            indoc! {"
                fn helper() {}
                fn other() { helper(); }
                pub fn entry() { other(); }
            "},
        );
        let unused = find_unused_members_syntactic(&unit);
        assert!(unused.is_empty());
    }

    #[test]
    fn unreferenced_private_field_is_reported() {
        let unit = unit_from_source(
            "lib.rs",
            indoc! {"
                pub struct State {
                    used: u32,
                    orphan: u32,
                    pub visible: u32,
                }
                impl State {
                    pub fn get(&self) -> u32 { self.used }
                }
            "},
        );
        let unused = find_unused_members_syntactic(&unit);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].name, "orphan");
        assert_eq!(unused[0].kind, MemberKind::Field);
    }

    #[test]
    fn public_members_are_never_candidates() {
        let unit = unit_from_source("lib.rs", "pub fn api() {} pub struct S { pub x: u8 }");
        assert!(find_unused_members_syntactic(&unit).is_empty());
    }

    #[test]
    fn lexical_collision_hides_an_unused_member() {
        // `value` the field is never touched, but a local named `value`
        // is; the fallback cannot tell them apart. Known limitation.
        let unit = unit_from_source(
            "lib.rs",
            indoc! {"
                pub struct S { value: u32 }
                pub fn f() -> u32 { let value = 1; value }
            "},
        );
        assert!(find_unused_members_syntactic(&unit).is_empty());
    }

    #[test]
    fn members_inside_nested_modules_are_candidates() {
        let unit = unit_from_source(
            "lib.rs",
            indoc! {"
                mod inner {
                    pub fn entry() { used(); }
                    fn used() {}
                    fn hidden_orphan() {}
                    struct Secret {
                        stale: u32,
                    }
                }
            "},
        );
        let unused = find_unused_members_syntactic(&unit);
        let names: Vec<_> = unused.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["hidden_orphan", "stale"]);
        assert_eq!(unused[0].line, 4);
    }

    #[test]
    fn main_and_test_functions_are_exempt() {
        let unit = unit_from_source(
            "main.rs",
            indoc! {"
                fn main() {}
                #[test]
                fn exercises_nothing() {}
            "},
        );
        assert!(find_unused_members_syntactic(&unit).is_empty());
    }
}
