//! Core data model: program snapshots, regions, symbols, and diagnostics.
//!
//! A [`ProgramSnapshot`] is an immutable whole-program view. Deriving a
//! modified program never mutates an existing snapshot; [`ProgramSnapshot::with_unit`]
//! substitutes exactly one compilation unit and structurally shares the rest.

use im::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use syn::Stmt;

/// One parsed source file. Identity is the path.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub ast: syn::File,
}

impl CompilationUnit {
    pub fn new(path: impl Into<PathBuf>, ast: syn::File) -> Self {
        Self {
            path: path.into(),
            ast,
        }
    }
}

/// Immutable whole-program view: every compilation unit, keyed by path.
///
/// Backed by a persistent map so that substituting one unit is cheap and the
/// original snapshot remains untouched.
#[derive(Debug, Clone, Default)]
pub struct ProgramSnapshot {
    units: HashMap<PathBuf, Arc<CompilationUnit>>,
}

impl ProgramSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units(units: impl IntoIterator<Item = CompilationUnit>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|u| (u.path.clone(), Arc::new(u)))
                .collect(),
        }
    }

    /// Derive a new snapshot with exactly one unit substituted (or added).
    /// All other units are shared with `self`.
    pub fn with_unit(&self, unit: CompilationUnit) -> Self {
        Self {
            units: self.units.update(unit.path.clone(), Arc::new(unit)),
        }
    }

    pub fn unit(&self, path: &Path) -> Option<&Arc<CompilationUnit>> {
        self.units.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.units.contains_key(path)
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<CompilationUnit>> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// A contiguous selected span: a single statement, or a first..last run.
///
/// An empty region is valid input everywhere; analysis yields empty facts
/// rather than an error.
#[derive(Debug, Clone, Copy)]
pub enum Region<'a> {
    Empty,
    Statement(&'a Stmt),
    Statements(&'a [Stmt]),
}

impl<'a> Region<'a> {
    pub fn is_empty(&self) -> bool {
        match self {
            Region::Empty => true,
            Region::Statement(_) => false,
            Region::Statements(stmts) => stmts.is_empty(),
        }
    }

    /// The statements covered by the region, in source order.
    pub fn statements(&self) -> &'a [Stmt] {
        match self {
            Region::Empty => &[],
            Region::Statement(stmt) => std::slice::from_ref(stmt),
            Region::Statements(stmts) => stmts,
        }
    }
}

/// What kind of declaration a resolved symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Local,
    Parameter,
    Field,
    Property,
    Method,
}

/// Resolved identity of a named declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type, rendered as source text, when the resolver knows it.
    pub ty: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// The implicit receiver never participates in input classification.
    pub fn is_receiver(&self) -> bool {
        self.kind == SymbolKind::Parameter && self.name == "self"
    }
}

/// A concrete source position referencing a symbol or diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(path: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// One compiler diagnostic. Identity is `(id, message, path, line, column)`;
/// severity is display metadata and not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub id: String,
    pub message: String,
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

/// Identity key used when diffing diagnostic sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticKey(pub String, pub String, pub PathBuf, pub usize, pub usize);

impl DiagnosticRecord {
    pub fn new(
        severity: Severity,
        id: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            severity,
            id: id.into(),
            message: message.into(),
            path: path.into(),
            line,
            column,
        }
    }

    pub fn key(&self) -> DiagnosticKey {
        DiagnosticKey(
            self.id.clone(),
            self.message.clone(),
            self.path.clone(),
            self.line,
            self.column,
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Name -> rendered type, shared by several report types.
pub type VariableTypes = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(path: &str, src: &str) -> CompilationUnit {
        CompilationUnit::new(path, syn::parse_str::<syn::File>(src).unwrap())
    }

    #[test]
    fn with_unit_substitutes_exactly_one_unit() {
        let snapshot =
            ProgramSnapshot::from_units([unit("a.rs", "fn a() {}"), unit("b.rs", "fn b() {}")]);

        let patched = snapshot.with_unit(unit("a.rs", "fn a() { b(); }"));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(patched.len(), 2);
        // The untouched unit is shared, not copied.
        assert!(Arc::ptr_eq(
            snapshot.unit(Path::new("b.rs")).unwrap(),
            patched.unit(Path::new("b.rs")).unwrap()
        ));
        assert!(!Arc::ptr_eq(
            snapshot.unit(Path::new("a.rs")).unwrap(),
            patched.unit(Path::new("a.rs")).unwrap()
        ));
    }

    #[test]
    fn empty_region_has_no_statements() {
        assert!(Region::Empty.is_empty());
        assert!(Region::Statements(&[]).is_empty());
        assert!(Region::Empty.statements().is_empty());
    }

    #[test]
    fn diagnostic_key_ignores_severity() {
        let error = DiagnosticRecord::new(Severity::Error, "E0425", "not found", "a.rs", 3, 5);
        let warning = DiagnosticRecord::new(Severity::Warning, "E0425", "not found", "a.rs", 3, 5);
        assert_eq!(error.key(), warning.key());
    }
}
