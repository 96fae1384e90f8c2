//! Safety analysis core for automated, semantics-preserving refactorings.
//!
//! Everything a refactoring orchestrator needs before it dares to edit
//! source: the variable contract of a selected region, the edge cases that
//! make extraction unsafe, a validation gate that distinguishes new
//! breakage from pre-existing problems, and member walkers for
//! move/static/delete eligibility. The core consumes already-parsed trees
//! and semantic facts from collaborators; it never parses, resolves, or
//! mutates anything itself.

pub mod analysis;
pub mod core;
pub mod testkit;
pub mod validation;
pub mod walkers;

pub use crate::core::{
    CompilationUnit, DiagnosticKey, DiagnosticRecord, DiagnosticsSource, Error, ProgramSnapshot,
    ReferenceSearch, Region, RegionFlowFacts, Result, SemanticFacts, Severity, SourceLocation,
    Symbol, SymbolKind, VariableTypes,
};

pub use crate::analysis::{
    analyze_node, analyze_range, analyze_region, detect_edge_cases, DataFlowFacts, EdgeCaseReport,
};

pub use crate::validation::{SemanticValidator, ValidationResult};

pub use crate::walkers::{
    analyze_member, collect_instance_member_names, collect_private_fields, detect_unused_members,
    find_unused_members, find_unused_members_syntactic, generate_access_member_name, MemberKind,
    MemberUsageFacts, UnusedMember, UnusedMemberStrategy,
};
