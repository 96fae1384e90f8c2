//! Per-method usage analysis.
//!
//! One traversal over a method body answers three questions the
//! convert-to-static and move-method refactorings depend on: does the body
//! touch instance state, does it call sibling methods, and does it call
//! itself. Convert-to-static is safe only when the body uses no instance
//! members (or an explicit instance parameter is threaded through);
//! move-method uses the same facts to compute the dependency set that must
//! travel with the method.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use syn::visit::Visit;
use syn::{Block, Expr, ExprField, ExprMethodCall, ExprPath, Member};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUsageFacts {
    /// The body references per-instance state, including through an
    /// explicit `self.` qualification used purely to disambiguate.
    pub uses_instance_members: bool,
    /// The body invokes a sibling method other than itself.
    pub calls_other_methods: bool,
    /// The body invokes itself. A self-call never also counts as a call
    /// to another method.
    pub is_recursive: bool,
}

/// Analyze `body` of the method named `method_name`, given the instance
/// member inventory and the names of its sibling methods.
///
/// References are evaluated individually: one body can be recursive and
/// still call other methods through distinct references.
pub fn analyze_member(
    instance_members: &BTreeSet<String>,
    sibling_methods: &BTreeSet<String>,
    method_name: &str,
    body: &Block,
) -> MemberUsageFacts {
    let mut walker = MemberUsageWalker {
        instance_members,
        sibling_methods,
        method_name,
        facts: MemberUsageFacts::default(),
    };
    walker.visit_block(body);
    walker.facts
}

struct MemberUsageWalker<'a> {
    instance_members: &'a BTreeSet<String>,
    sibling_methods: &'a BTreeSet<String>,
    method_name: &'a str,
    facts: MemberUsageFacts,
}

impl<'a> MemberUsageWalker<'a> {
    fn classify_callable(&mut self, name: &str) {
        if name == self.method_name {
            self.facts.is_recursive = true;
        } else if self.sibling_methods.contains(name) {
            self.facts.calls_other_methods = true;
        }
    }
}

fn is_self_path(expr: &Expr) -> bool {
    matches!(expr, Expr::Path(ExprPath { qself: None, path, .. }) if path.is_ident("self"))
}

impl<'a, 'ast> Visit<'ast> for MemberUsageWalker<'a> {
    fn visit_expr_field(&mut self, node: &'ast ExprField) {
        if is_self_path(&node.base) {
            if let Member::Named(ident) = &node.member {
                if self.instance_members.contains(&ident.to_string()) {
                    self.facts.uses_instance_members = true;
                }
            }
        }
        syn::visit::visit_expr_field(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if is_self_path(&node.receiver) {
            let name = node.method.to_string();
            self.classify_callable(&name);
            // Getter-style accessors are instance state behind a call.
            if name != self.method_name && self.instance_members.contains(&name) {
                self.facts.uses_instance_members = true;
            }
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        if node.qself.is_none() {
            let segments = &node.path.segments;
            // `helper` or `Self::helper` used as a value or callee.
            let name = match segments.len() {
                1 if !node.path.is_ident("self") => Some(segments[0].ident.to_string()),
                2 if segments[0].ident == "Self" => Some(segments[1].ident.to_string()),
                _ => None,
            };
            if let Some(name) = name {
                self.classify_callable(&name);
                if self.instance_members.contains(&name) {
                    self.facts.uses_instance_members = true;
                }
            }
        }
        syn::visit::visit_expr_path(self, node);
    }
}
