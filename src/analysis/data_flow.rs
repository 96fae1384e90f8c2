//! Region data flow analysis.
//!
//! Computes the variable contract of a selected region: which values enter
//! it, which leave it, which stay local, and which are captured by closures
//! inside it. The classification is what an extract-method transform needs
//! to synthesize a signature, so it must be exact and deterministic.
//!
//! The analyzer consumes flow facts from a [`SemanticFacts`] provider and
//! then runs a defensive syntactic sweep of its own: any local or parameter
//! identifier the region references that the flow facts failed to classify
//! is treated as an input. Fail-open: an ambiguous dependency becomes an
//! extra parameter, never a silently dropped one.

use crate::core::errors::Result;
use crate::core::traits::SemanticFacts;
use crate::core::types::{Region, SymbolKind, VariableTypes};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use syn::visit::Visit;
use syn::{ExprPath, Stmt};

/// Variable classification for a region.
///
/// Every set is deduplicated and lexicographically sorted, and
/// `locals` and `outputs` are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowFacts {
    /// Locals/parameters whose value is live on entry to the region.
    pub inputs: Vec<String>,
    /// Locals/parameters read after the region ends.
    pub outputs: Vec<String>,
    /// Symbols always assigned inside the region and not live afterwards.
    pub locals: Vec<String>,
    /// Symbols referenced from closures defined within the region.
    pub captured: Vec<String>,
    /// Locals declared inside the region, independent of flow direction.
    pub declared_inside: Vec<String>,
    /// Resolved type text for every classified name the model knows.
    pub variable_types: VariableTypes,
}

impl DataFlowFacts {
    fn normalize(&mut self) {
        let outputs: BTreeSet<String> = self.outputs.drain(..).collect();
        self.locals.retain(|name| !outputs.contains(name));
        self.outputs = outputs.into_iter().collect();
        for set in [
            &mut self.inputs,
            &mut self.locals,
            &mut self.captured,
            &mut self.declared_inside,
        ] {
            set.sort_unstable();
            set.dedup();
        }
    }

    fn is_classified(&self, name: &str) -> bool {
        self.inputs.iter().any(|n| n == name)
            || self.outputs.iter().any(|n| n == name)
            || self.locals.iter().any(|n| n == name)
    }
}

/// Analyze a single selected statement.
pub fn analyze_node(stmt: &Stmt, facts: &dyn SemanticFacts) -> Result<DataFlowFacts> {
    analyze_region(&Region::Statement(stmt), facts)
}

/// Analyze an explicit first..last statement run. Usage from every
/// statement in the run is aggregated into one contract.
pub fn analyze_range(stmts: &[Stmt], facts: &dyn SemanticFacts) -> Result<DataFlowFacts> {
    analyze_region(&Region::Statements(stmts), facts)
}

/// Analyze an arbitrary region.
pub fn analyze_region(region: &Region, facts: &dyn SemanticFacts) -> Result<DataFlowFacts> {
    if region.is_empty() {
        return Ok(DataFlowFacts::default());
    }

    let flow = facts.region_flow(region)?;
    let mut result = DataFlowFacts::default();

    let record_type = |result: &mut DataFlowFacts, name: &str, ty: &Option<String>| {
        if let Some(ty) = ty {
            result
                .variable_types
                .entry(name.to_string())
                .or_insert_with(|| ty.clone());
        }
    };

    for symbol in &flow.live_in {
        if !symbol.is_receiver() && matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter)
        {
            result.inputs.push(symbol.name.clone());
            record_type(&mut result, &symbol.name, &symbol.ty);
        }
    }
    for symbol in &flow.live_out {
        if !symbol.is_receiver() && matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter)
        {
            result.outputs.push(symbol.name.clone());
            record_type(&mut result, &symbol.name, &symbol.ty);
        }
    }
    for symbol in &flow.always_assigned {
        if !flow.live_out.iter().any(|s| s.name == symbol.name) {
            result.locals.push(symbol.name.clone());
            record_type(&mut result, &symbol.name, &symbol.ty);
        }
    }
    for symbol in &flow.captured {
        result.captured.push(symbol.name.clone());
        record_type(&mut result, &symbol.name, &symbol.ty);
    }
    for symbol in &flow.declared_inside {
        result.declared_inside.push(symbol.name.clone());
        record_type(&mut result, &symbol.name, &symbol.ty);
    }

    // Defensive sweep: flow facts can under-report on partial information.
    // Every referenced local/parameter that ended up unclassified is
    // promoted to an input with its resolved type.
    for name in referenced_identifiers(region.statements()) {
        if name == "self" || result.is_classified(&name) {
            continue;
        }
        let Some(symbol) = facts.resolve(&name) else {
            continue;
        };
        if matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter) {
            debug!("promoting unclassified reference `{name}` to input");
            result.inputs.push(symbol.name.clone());
            record_type(&mut result, &symbol.name, &symbol.ty);
        }
    }

    result.normalize();
    debug_assert!(result.locals.iter().all(|l| !result.outputs.contains(l)));
    Ok(result)
}

/// Every bare identifier the region references, in encounter order,
/// aggregated per statement across the run.
fn referenced_identifiers(stmts: &[Stmt]) -> Vec<String> {
    let mut collector = IdentifierCollector::default();
    for stmt in stmts {
        collector.visit_stmt(stmt);
    }
    collector.names
}

#[derive(Default)]
struct IdentifierCollector {
    names: Vec<String>,
}

impl<'ast> Visit<'ast> for IdentifierCollector {
    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        if node.qself.is_none() && node.path.segments.len() == 1 {
            self.names.push(node.path.segments[0].ident.to_string());
        }
        syn::visit::visit_expr_path(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Symbol;
    use crate::testkit::FixtureSemantics;

    fn body(src: &str) -> Vec<Stmt> {
        let file: syn::File = syn::parse_str(&format!("fn f() {{ {src} }}")).unwrap();
        match &file.items[0] {
            syn::Item::Fn(f) => f.block.stmts.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_region_yields_empty_facts_without_provider_call() {
        let facts = FixtureSemantics::new().with_provider_panic();
        let result = analyze_region(&Region::Empty, &facts).unwrap();
        assert_eq!(result, DataFlowFacts::default());
    }

    #[test]
    fn always_assigned_minus_live_out_becomes_local() {
        let stmts = body("result = x + y; print(result);");
        let facts = FixtureSemantics::new()
            .with_live_in(Symbol::new("x", SymbolKind::Local).with_type("i32"))
            .with_live_in(Symbol::new("y", SymbolKind::Local).with_type("i32"))
            .with_always_assigned(Symbol::new("result", SymbolKind::Local).with_type("i32"));

        let result = analyze_range(&stmts, &facts).unwrap();
        assert_eq!(result.inputs, vec!["x", "y"]);
        assert_eq!(result.locals, vec!["result"]);
        assert!(result.outputs.is_empty());
        assert_eq!(result.variable_types["result"], "i32");
    }

    #[test]
    fn live_out_wins_over_local_classification() {
        let stmts = body("total = a; ");
        let total = Symbol::new("total", SymbolKind::Local).with_type("u64");
        let facts = FixtureSemantics::new()
            .with_live_in(Symbol::new("a", SymbolKind::Local))
            .with_live_out(total.clone())
            .with_always_assigned(total);

        let result = analyze_range(&stmts, &facts).unwrap();
        assert_eq!(result.outputs, vec!["total"]);
        assert!(result.locals.is_empty());
    }

    #[test]
    fn defensive_sweep_promotes_unreported_reference_to_input() {
        // The provider reports nothing for `scale`, but the region reads it.
        let stmts = body("result = value * scale;");
        let facts = FixtureSemantics::new()
            .with_live_in(Symbol::new("value", SymbolKind::Local).with_type("f64"))
            .with_always_assigned(Symbol::new("result", SymbolKind::Local))
            .with_symbol(Symbol::new("scale", SymbolKind::Parameter).with_type("f64"));

        let result = analyze_range(&stmts, &facts).unwrap();
        assert_eq!(result.inputs, vec!["scale", "value"]);
        assert_eq!(result.variable_types["scale"], "f64");
    }

    #[test]
    fn receiver_is_never_an_input() {
        let stmts = body("self.count += n;");
        let facts = FixtureSemantics::new()
            .with_live_in(Symbol::new("self", SymbolKind::Parameter))
            .with_live_in(Symbol::new("n", SymbolKind::Parameter).with_type("usize"));

        let result = analyze_range(&stmts, &facts).unwrap();
        assert_eq!(result.inputs, vec!["n"]);
    }

    #[test]
    fn sets_are_sorted_and_deduplicated() {
        let stmts = body("b = a; c = a;");
        let facts = FixtureSemantics::new()
            .with_live_in(Symbol::new("z", SymbolKind::Local))
            .with_live_in(Symbol::new("a", SymbolKind::Local))
            .with_live_in(Symbol::new("a", SymbolKind::Local))
            .with_always_assigned(Symbol::new("c", SymbolKind::Local))
            .with_always_assigned(Symbol::new("b", SymbolKind::Local));

        let result = analyze_range(&stmts, &facts).unwrap();
        assert_eq!(result.inputs, vec!["a", "z"]);
        assert_eq!(result.locals, vec!["b", "c"]);
    }
}
