//! Destinations for diagnostics.
//!
//! - [`TracingSink`]: forwards to `tracing` (default for the CLI)
//! - [`BufferSink`]: captures for assertions in tests and for tools that
//!   render diagnostics themselves
//! - [`NullSink`]: discards everything

use parking_lot::Mutex;

use crate::{Diagnostic, Severity};

/// Receives diagnostics produced while loading files.
///
/// Implementations must be shareable across threads: one loader can be
/// driven from several threads as long as each request runs to completion on
/// its own.
pub trait DiagnosticSink: Send + Sync {
    fn handle(&self, diagnostic: Diagnostic);
}

/// Replay a batch of diagnostics onto `sink`, in order.
pub fn replay(sink: &dyn DiagnosticSink, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        sink.handle(diagnostic.clone());
    }
}

/// Forwards diagnostics to `tracing` at a level matching their severity.
#[derive(Default, Debug, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn handle(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::error!("{diagnostic}"),
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Note => tracing::info!("{diagnostic}"),
        }
    }
}

/// Captures diagnostics in memory.
#[derive(Default, Debug)]
pub struct BufferSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain everything received so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.lock().iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticSink for BufferSink {
    fn handle(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Discards all diagnostics.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn handle(&self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests;
