//! Diagnostic events for parse, compile and evaluation problems.
//!
//! The loader does not render or transport diagnostics. It produces
//! [`Diagnostic`] values and hands them to a [`DiagnosticSink`] supplied by
//! the embedding tool, which decides where they go (terminal, IDE, logs).
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Source location (where it went wrong)

mod diagnostic;
mod error_code;
mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use sink::{replay, BufferSink, DiagnosticSink, NullSink, TracingSink};
