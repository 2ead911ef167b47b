//! First-class diagnostics data model.
//!
//! Diagnostics are produced fresh on every validation pass and replace the previous overlay
//! wholesale. Renderers can use them for:
//! - gutter markers / squiggly underlines
//! - hover tooltips / a problems list

use serde::Serialize;
use std::fmt;

/// A zero-based logical position in the document.
///
/// `column` counts Unicode scalar values (`char`), not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in characters.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The document start (`0:0`).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans read 1-based coordinates.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open `start..end` range of positions in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct DiagnosticRange {
    /// Range start (inclusive).
    pub start: Position,
    /// Range end (exclusive).
    pub end: Position,
}

impl DiagnosticRange {
    /// Create a new diagnostic range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty range at `position`.
    pub fn point(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Returns `true` if this range covers a strict superset of the lines covered by `other`.
    pub fn strictly_contains_lines(&self, other: &DiagnosticRange) -> bool {
        let covers = self.start.line <= other.start.line && self.end.line >= other.end.line;
        let same = self.start.line == other.start.line && self.end.line == other.end.line;
        covers && !same
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

/// Which checker produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSource {
    /// The JSON syntax checker.
    Syntax,
    /// The JSON schema validator.
    Schema,
    /// An error reported from outside the editor (e.g. a rendering failure).
    External,
}

/// A single diagnostic item for the current document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Diagnostic range.
    pub range: DiagnosticRange,
    /// Optional diagnostic severity.
    pub severity: Option<DiagnosticSeverity>,
    /// Producer of this diagnostic.
    pub source: DiagnosticSource,
    /// Diagnostic message.
    pub message: String,
    /// Schema keyword location (JSON pointer into the schema) for schema diagnostics.
    pub schema_path: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(
        source: DiagnosticSource,
        range: DiagnosticRange,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity: Some(DiagnosticSeverity::Error),
            source,
            message: message.into(),
            schema_path: None,
        }
    }

    /// Attach the schema keyword location that produced this diagnostic.
    pub fn with_schema_path(mut self, schema_path: impl Into<String>) -> Self {
        self.schema_path = Some(schema_path.into());
        self
    }

    /// An externally reported error, positioned at the document start.
    pub fn external(message: impl Into<String>) -> Self {
        Self::error(
            DiagnosticSource::External,
            DiagnosticRange::point(Position::origin()),
            message,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range.start, self.message)
    }
}
