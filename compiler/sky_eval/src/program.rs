//! Compiled programs.

use std::sync::Arc;

use sky_ir::{FileKind, Label, LoadStmt, Location, SourceInfo, Stmt, StmtKind};

/// A parsed and validated file, bound to its label.
///
/// Programs are immutable and shared: the loader caches one per path and
/// hands out clones of the `Arc`.
#[derive(Debug)]
pub struct Program {
    label: Label,
    kind: FileKind,
    source: SourceInfo,
    stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(label: Label, kind: FileKind, source: SourceInfo, stmts: Vec<Stmt>) -> Arc<Self> {
        Arc::new(Program {
            label,
            kind,
            source,
            stmts,
        })
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Top-level `load` statements with the location of their module string.
    pub fn loads(&self) -> impl Iterator<Item = (&LoadStmt, Location)> + '_ {
        self.stmts.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::Load(load) => Some((load, self.source.location(load.module_span))),
            _ => None,
        })
    }
}
