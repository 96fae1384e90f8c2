//! Edge case detection for extraction candidates.
//!
//! One traversal over the selected region flags constructs that force the
//! synthesized method signature to change (await, `?`, resource guards,
//! returns, closures, nested functions) or that invalidate extraction
//! outright (a `break`/`continue` whose loop stays behind).
//!
//! All flags except the loop-control exit are advisory: the orchestrator
//! keeps the extracted function async, threads a return value, or keeps the
//! caller inside the guard scope. A dangling `break`/`continue` is the one
//! construct that always escalates to a warning, because the loop target no
//! longer exists in the extracted scope.

use crate::core::errors::Error;
use crate::core::types::Region;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use syn::visit::Visit;
use syn::{
    Expr, ExprAwait, ExprBreak, ExprClosure, ExprContinue, ExprForLoop, ExprLoop, ExprPath,
    ExprReturn, ExprTry, ExprWhile, ItemFn, Local,
};

/// Method names whose return value is conventionally a RAII guard. A `let`
/// binding acquiring one of these marks the region as a resource scope.
static GUARD_METHODS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "lock",
        "try_lock",
        "read",
        "write",
        "borrow",
        "borrow_mut",
        "lock_arc",
        "enter",
    ]
    .into_iter()
    .collect()
});

/// Safety advisory for a region: machine-readable flags, an ordered
/// human-readable label list, and blocking warnings.
///
/// Flags and labels are kept independent so callers can assert on either
/// representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCaseReport {
    pub has_await: bool,
    pub has_resource_scope: bool,
    pub has_error_propagation: bool,
    pub has_return: bool,
    pub has_loop_exit: bool,
    pub has_closure: bool,
    pub has_nested_fn: bool,
    /// Labels in first-encounter order, one per distinct construct kind.
    pub labels: Vec<String>,
    pub warnings: Vec<String>,
}

impl EdgeCaseReport {
    pub fn any(&self) -> bool {
        self.has_await
            || self.has_resource_scope
            || self.has_error_propagation
            || self.has_return
            || self.has_loop_exit
            || self.has_closure
            || self.has_nested_fn
    }

    /// The structural rejection this report demands, if any warning is
    /// blocking. Advisory flags never produce one.
    pub fn rejection(&self) -> Option<Error> {
        self.warnings.first().map(|warning| Error::StructuralRejection {
            reason: warning.clone(),
        })
    }
}

/// Single-pass edge case detection over a region.
pub fn detect_edge_cases(region: &Region) -> EdgeCaseReport {
    let mut detector = EdgeCaseDetector::default();
    for stmt in region.statements() {
        detector.visit_stmt(stmt);
    }
    detector.report
}

#[derive(Default)]
struct EdgeCaseDetector {
    report: EdgeCaseReport,
    /// Loops wholly inside the region; `break`/`continue` under one of
    /// these targets a loop that travels with the extraction.
    loop_depth: usize,
}

impl EdgeCaseDetector {
    fn label(&mut self, already_flagged: bool, label: &str) {
        if !already_flagged {
            self.report.labels.push(label.to_string());
        }
    }

    fn flag_loop_exit(&mut self, statement: &str) {
        self.label(self.report.has_loop_exit, "loop control exit");
        self.report.has_loop_exit = true;
        self.report.warnings.push(format!(
            "`{statement}` may be invalid if block is part of a loop"
        ));
    }
}

impl<'ast> Visit<'ast> for EdgeCaseDetector {
    fn visit_expr_await(&mut self, node: &'ast ExprAwait) {
        self.label(self.report.has_await, "await expression");
        self.report.has_await = true;
        syn::visit::visit_expr_await(self, node);
    }

    fn visit_expr_try(&mut self, node: &'ast ExprTry) {
        self.label(self.report.has_error_propagation, "error propagation");
        self.report.has_error_propagation = true;
        syn::visit::visit_expr_try(self, node);
    }

    fn visit_local(&mut self, node: &'ast Local) {
        if let Some(init) = &node.init {
            if acquires_guard(&init.expr) {
                self.label(self.report.has_resource_scope, "scoped resource guard");
                self.report.has_resource_scope = true;
            }
        }
        syn::visit::visit_local(self, node);
    }

    fn visit_expr_return(&mut self, node: &'ast ExprReturn) {
        self.label(self.report.has_return, "return statement");
        self.report.has_return = true;
        syn::visit::visit_expr_return(self, node);
    }

    fn visit_expr_break(&mut self, node: &'ast ExprBreak) {
        // A labeled break can target a loop outside the region even from
        // inside a nested loop, so it is flagged regardless of depth.
        if self.loop_depth == 0 || node.label.is_some() {
            self.flag_loop_exit("break");
        }
        syn::visit::visit_expr_break(self, node);
    }

    fn visit_expr_continue(&mut self, node: &'ast ExprContinue) {
        if self.loop_depth == 0 || node.label.is_some() {
            self.flag_loop_exit("continue");
        }
        syn::visit::visit_expr_continue(self, node);
    }

    fn visit_expr_loop(&mut self, node: &'ast ExprLoop) {
        self.loop_depth += 1;
        syn::visit::visit_expr_loop(self, node);
        self.loop_depth -= 1;
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        self.loop_depth += 1;
        syn::visit::visit_expr_while(self, node);
        self.loop_depth -= 1;
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.loop_depth += 1;
        syn::visit::visit_expr_for_loop(self, node);
        self.loop_depth -= 1;
    }

    fn visit_expr_closure(&mut self, _node: &'ast ExprClosure) {
        self.label(self.report.has_closure, "closure");
        self.report.has_closure = true;
        // A closure body travels with the region; its control flow targets
        // the closure, not the extraction site. No descent.
    }

    fn visit_item_fn(&mut self, _node: &'ast ItemFn) {
        self.label(self.report.has_nested_fn, "nested function");
        self.report.has_nested_fn = true;
        // Same reasoning as closures: the nested body moves wholesale.
    }
}

/// Does this initializer expression acquire a RAII guard?
fn acquires_guard(expr: &Expr) -> bool {
    match expr {
        Expr::MethodCall(call) => GUARD_METHODS.contains(call.method.to_string().as_str()),
        Expr::Try(inner) => acquires_guard(&inner.expr),
        Expr::Call(call) => {
            // File::open-style constructors returning a handle.
            matches!(&*call.func, Expr::Path(ExprPath { path, .. })
                if path.segments.last().is_some_and(|seg| seg.ident == "open"))
        }
        Expr::Reference(inner) => acquires_guard(&inner.expr),
        _ => false,
    }
}
