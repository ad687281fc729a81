//! Human-readable source locations.
//!
//! Spans are byte offsets; diagnostics and load stacks want `file:line:col`.
//! [`SourceInfo`] pairs a file name with a [`LineIndex`] so any span in that
//! file can be rendered without keeping the source text around.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// A position in a named file.
///
/// `line == 0` means "the file as a whole" (used for top-level requests that
/// do not originate from a `load` statement).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    file: Arc<str>,
    line: u32,
    column: u32,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Location {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location referring to a whole file.
    pub fn from_file(file: impl Into<Arc<str>>) -> Self {
        Location::new(file, 0, 0)
    }

    /// Location of loads the loader synthesizes itself (implicit includes).
    pub fn builtin() -> Self {
        Location::new("<builtin>", 0, 0)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Byte offsets of line starts, for offset → (line, column) conversion.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(offset + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { line_starts }
    }

    /// 1-based line and column of `offset`.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let line = u32::try_from(line).unwrap_or(u32::MAX);
        (line.saturating_add(1), offset.saturating_sub(line_start).saturating_add(1))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A file name plus its line index.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourceInfo {
    file: Arc<str>,
    lines: LineIndex,
}

impl SourceInfo {
    pub fn new(file: impl Into<Arc<str>>, source: &str) -> Self {
        SourceInfo {
            file: file.into(),
            lines: LineIndex::new(source),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Render the start of `span` as a [`Location`].
    pub fn location(&self, span: Span) -> Location {
        let (line, column) = self.lines.line_col(span.start);
        Location {
            file: Arc::clone(&self.file),
            line,
            column,
        }
    }
}
