//! Collaborator boundaries.
//!
//! The core does not parse source text or resolve symbols itself; it
//! consumes an already-parsed tree plus semantic facts supplied through
//! these traits. Providers may fail arbitrarily, so every fallible query
//! returns `anyhow::Result` and the core converts failures into typed
//! outcomes at its own boundary.

use crate::core::types::{DiagnosticRecord, ProgramSnapshot, Region, SourceLocation, Symbol};

/// Raw flow classification for a region, as computed by the semantic model.
#[derive(Debug, Clone, Default)]
pub struct RegionFlowFacts {
    /// Values live on entry to the region.
    pub live_in: Vec<Symbol>,
    /// Values read after the region ends.
    pub live_out: Vec<Symbol>,
    /// Symbols assigned on every path through the region.
    pub always_assigned: Vec<Symbol>,
    /// Symbols referenced from closures defined within the region.
    pub captured: Vec<Symbol>,
    /// Locals whose declaration lies inside the region.
    pub declared_inside: Vec<Symbol>,
}

/// Semantic model for a single function body: region flow facts plus
/// identifier resolution.
pub trait SemanticFacts {
    /// Flow classification of every symbol the region touches.
    fn region_flow(&self, region: &Region) -> anyhow::Result<RegionFlowFacts>;

    /// Resolve an identifier to its declaration, if the model knows it.
    /// `None` means the name does not bind to a local declaration; the
    /// analyzers treat that as "not ours to classify".
    fn resolve(&self, name: &str) -> Option<Symbol>;
}

/// Whole-program reference search for a resolved symbol.
pub trait ReferenceSearch {
    /// Every source location referencing `symbol`, including its own
    /// declaration.
    fn find_references(
        &self,
        symbol: &Symbol,
        snapshot: &ProgramSnapshot,
    ) -> anyhow::Result<Vec<SourceLocation>>;
}

/// Full-program diagnostics for a snapshot.
pub trait DiagnosticsSource {
    fn diagnostics(&self, snapshot: &ProgramSnapshot) -> anyhow::Result<Vec<DiagnosticRecord>>;
}
