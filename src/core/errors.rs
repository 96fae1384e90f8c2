//! Shared error types for refactoring safety analysis.

use thiserror::Error;

/// Main error type for refsafe operations.
///
/// The semantic validator and the unused-member detector never let a failure
/// escape as a panic: provider errors are converted into typed results so
/// the orchestrator can decline a refactoring with an explanation.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge case blocks the transformation outright.
    #[error("refactoring blocked: {reason}")]
    StructuralRejection { reason: String },

    /// Re-validation found errors not present in the baseline.
    #[error("transformation introduces {count} new error(s)")]
    SemanticRegression { count: usize },

    /// Internal failure during lookup or diffing, converted to a result.
    #[error("analysis failure: {0}")]
    AnalysisFailure(String),

    /// Region, symbol, or compilation unit absent from the given snapshot.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The shared cancellation signal was observed.
    #[error("operation cancelled")]
    Cancelled,

    /// Wrapped collaborator errors.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::AnalysisFailure(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
