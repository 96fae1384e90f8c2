//! In-memory fixtures for testing the analysis core without any I/O.
//!
//! Tests supply scripted semantic facts, diagnostics, and reference search
//! results through the same traits real providers implement, so every test
//! runs against the production code paths with fully deterministic inputs.

use crate::core::traits::{DiagnosticsSource, ReferenceSearch, RegionFlowFacts, SemanticFacts};
use crate::core::types::{
    CompilationUnit, DiagnosticRecord, ProgramSnapshot, Region, SourceLocation, Symbol,
};
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Mutex;

/// Parse fixture source into a compilation unit. Panics on bad fixtures;
/// only for tests.
pub fn unit_from_source(path: &str, source: &str) -> CompilationUnit {
    let ast = syn::parse_str::<syn::File>(source)
        .unwrap_or_else(|err| panic!("fixture {path} does not parse: {err}"));
    CompilationUnit::new(path, ast)
}

/// Build a snapshot from `(path, source)` fixture pairs.
pub fn snapshot_from_sources(sources: &[(&str, &str)]) -> ProgramSnapshot {
    ProgramSnapshot::from_units(sources.iter().map(|(path, src)| unit_from_source(path, src)))
}

/// Scripted [`SemanticFacts`]: returns fixed flow facts for any region and
/// resolves identifiers from a fixed symbol table.
#[derive(Default)]
pub struct FixtureSemantics {
    flow: RegionFlowFacts,
    symbols: HashMap<String, Symbol>,
    panic_on_flow: bool,
}

impl FixtureSemantics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live_in(mut self, symbol: Symbol) -> Self {
        self.flow.live_in.push(symbol);
        self
    }

    pub fn with_live_out(mut self, symbol: Symbol) -> Self {
        self.flow.live_out.push(symbol);
        self
    }

    pub fn with_always_assigned(mut self, symbol: Symbol) -> Self {
        self.flow.always_assigned.push(symbol);
        self
    }

    pub fn with_captured(mut self, symbol: Symbol) -> Self {
        self.flow.captured.push(symbol);
        self
    }

    pub fn with_declared_inside(mut self, symbol: Symbol) -> Self {
        self.flow.declared_inside.push(symbol);
        self
    }

    /// Make the identifier resolvable without reporting it in flow facts.
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbols.insert(symbol.name.clone(), symbol);
        self
    }

    /// Panic if the flow computation is invoked at all. Used to prove the
    /// empty-region short circuit.
    pub fn with_provider_panic(mut self) -> Self {
        self.panic_on_flow = true;
        self
    }
}

impl SemanticFacts for FixtureSemantics {
    fn region_flow(&self, _region: &Region) -> anyhow::Result<RegionFlowFacts> {
        assert!(
            !self.panic_on_flow,
            "region_flow must not be called for this fixture"
        );
        Ok(self.flow.clone())
    }

    fn resolve(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).cloned()
    }
}

/// Scripted [`DiagnosticsSource`]: hands out one pre-baked diagnostic list
/// per call, in order. Runs out of script, or constructed failing, and
/// every call errors.
pub struct ScriptedDiagnostics {
    script: Mutex<Vec<Vec<DiagnosticRecord>>>,
    failure: Option<String>,
}

impl ScriptedDiagnostics {
    pub fn new(mut responses: Vec<Vec<DiagnosticRecord>>) -> Self {
        responses.reverse();
        Self {
            script: Mutex::new(responses),
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }
}

impl DiagnosticsSource for ScriptedDiagnostics {
    fn diagnostics(&self, _snapshot: &ProgramSnapshot) -> anyhow::Result<Vec<DiagnosticRecord>> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{message}"));
        }
        self.script
            .lock()
            .expect("diagnostics script lock poisoned")
            .pop()
            .ok_or_else(|| anyhow!("diagnostics requested more times than scripted"))
    }
}

/// Scripted [`ReferenceSearch`]: reference lists keyed by symbol name.
/// Unknown symbols get an empty list, which reads as "unreferenced".
#[derive(Default)]
pub struct FixtureReferences {
    references: HashMap<String, Vec<SourceLocation>>,
    failure: Option<String>,
}

impl FixtureReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_references(
        mut self,
        name: &str,
        locations: impl IntoIterator<Item = SourceLocation>,
    ) -> Self {
        self.references
            .entry(name.to_string())
            .or_default()
            .extend(locations);
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            references: HashMap::new(),
            failure: Some(message.to_string()),
        }
    }
}

impl ReferenceSearch for FixtureReferences {
    fn find_references(
        &self,
        symbol: &Symbol,
        _snapshot: &ProgramSnapshot,
    ) -> anyhow::Result<Vec<SourceLocation>> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{message}"));
        }
        Ok(self.references.get(&symbol.name).cloned().unwrap_or_default())
    }
}
