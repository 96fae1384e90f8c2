pub mod errors;
pub mod traits;
pub mod types;

pub use errors::{Error, Result};
pub use traits::{DiagnosticsSource, ReferenceSearch, RegionFlowFacts, SemanticFacts};
pub use types::{
    CompilationUnit, DiagnosticKey, DiagnosticRecord, ProgramSnapshot, Region, Severity,
    SourceLocation, Symbol, SymbolKind, VariableTypes,
};
