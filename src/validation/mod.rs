//! Semantic validation of a proposed transformation.
//!
//! The validator is the authoritative gate before a transformation is
//! persisted: it re-evaluates the program with the modified unit substituted
//! and diffs the diagnostics against a baseline. Pre-existing errors are
//! tolerated by design; only regressions reject the transform. The
//! orchestrator must discard any transformation with `is_valid == false`.

use crate::core::errors::Error;
use crate::core::traits::DiagnosticsSource;
use crate::core::types::{
    CompilationUnit, DiagnosticKey, DiagnosticRecord, ProgramSnapshot, Severity,
};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Diagnostic id used for failures of the validation machinery itself
/// (missing unit, provider failure, cancellation).
const VALIDATOR_DIAGNOSTIC_ID: &str = "refsafe::validator";

/// Outcome of re-validating a transform. `is_valid` is false exactly when
/// `errors` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<DiagnosticRecord>,
    pub warnings: Vec<DiagnosticRecord>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// The regression error this result represents, if the gate rejected.
    pub fn regression(&self) -> Option<Error> {
        if self.is_valid {
            None
        } else {
            Some(Error::SemanticRegression {
                count: self.errors.len(),
            })
        }
    }

    fn failure(unit: &CompilationUnit, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![DiagnosticRecord::new(
                Severity::Error,
                VALIDATOR_DIAGNOSTIC_ID,
                message,
                unit.path.clone(),
                0,
                0,
            )],
            warnings: Vec::new(),
        }
    }
}

/// Re-validates modified compilation units against a baseline snapshot.
///
/// Never panics across the provider boundary and never returns `Err`:
/// every failure mode becomes a `ValidationResult` with `is_valid == false`.
pub struct SemanticValidator<'a> {
    diagnostics: &'a dyn DiagnosticsSource,
}

impl<'a> SemanticValidator<'a> {
    pub fn new(diagnostics: &'a dyn DiagnosticsSource) -> Self {
        Self { diagnostics }
    }

    /// Validate `modified` against `original`. The modified unit must
    /// correspond (by path) to a unit already present in the snapshot.
    pub fn validate(
        &self,
        modified: &CompilationUnit,
        original: &ProgramSnapshot,
    ) -> ValidationResult {
        static NEVER_CANCELLED: AtomicBool = AtomicBool::new(false);
        self.validate_with_cancel(modified, original, &NEVER_CANCELLED)
    }

    /// As [`validate`](Self::validate), but abortable: diagnostic
    /// computation on large programs is CPU-bound, and a cancelled run
    /// must not be mistaken for an approved one.
    pub fn validate_with_cancel(
        &self,
        modified: &CompilationUnit,
        original: &ProgramSnapshot,
        cancel: &AtomicBool,
    ) -> ValidationResult {
        match self.run(modified, original, cancel) {
            Ok(result) => result,
            Err(err) => {
                warn!("validation of {} failed: {err:#}", modified.path.display());
                ValidationResult::failure(modified, format!("semantic validation failed: {err:#}"))
            }
        }
    }

    fn run(
        &self,
        modified: &CompilationUnit,
        original: &ProgramSnapshot,
        cancel: &AtomicBool,
    ) -> anyhow::Result<ValidationResult> {
        if !original.contains(&modified.path) {
            return Ok(ValidationResult::failure(
                modified,
                format!(
                    "no compilation unit named {} in the original snapshot",
                    modified.path.display()
                ),
            ));
        }

        // Only error-severity records form the baseline: a pre-existing
        // warning with the same key must not excuse a fresh error.
        // Baselines on large programs can run to tens of thousands of
        // records; key extraction clones strings, so build the set in
        // parallel.
        let baseline = self.diagnostics.diagnostics(original)?;
        let baseline_keys: HashSet<DiagnosticKey> = baseline
            .par_iter()
            .filter(|record| record.is_error())
            .map(DiagnosticRecord::key)
            .collect();
        debug!(
            "baseline for {}: {} diagnostics, {} errors",
            modified.path.display(),
            baseline.len(),
            baseline_keys.len()
        );

        if cancel.load(Ordering::Relaxed) {
            return Ok(ValidationResult::failure(modified, "validation cancelled"));
        }

        // Substitute only the modified unit so cross-file resolution stays
        // accurate for everything else.
        let patched = original.with_unit(modified.clone());
        let fresh = self.diagnostics.diagnostics(&patched)?;

        if cancel.load(Ordering::Relaxed) {
            return Ok(ValidationResult::failure(modified, "validation cancelled"));
        }

        // Errors are diffed against the baseline; warnings are reported on
        // every run, whether or not the baseline had them.
        let mut result = ValidationResult::valid();
        for record in fresh {
            match record.severity {
                Severity::Error => {
                    if !baseline_keys.contains(&record.key()) {
                        result.errors.push(record);
                    }
                }
                Severity::Warning => result.warnings.push(record),
            }
        }
        result.is_valid = result.errors.is_empty();
        Ok(result)
    }
}
