//! JSON syntax checking.
//!
//! The syntax checker is the first stage of every validation pass. It either yields the parsed
//! document or the syntax diagnostics that block every later stage.

use crate::diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSource, Position};
use crate::line_index::LineIndex;
use serde_json::Value;

/// A checker that parses document text.
pub trait SyntaxChecker {
    /// Parse `text`, or report why it cannot be parsed.
    ///
    /// `index` is a line index over the same `text`, used to place diagnostics.
    fn check(&self, text: &str, index: &LineIndex) -> Result<Value, Vec<Diagnostic>>;
}

/// Strict JSON syntax checker backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSyntaxChecker;

impl SyntaxChecker for JsonSyntaxChecker {
    fn check(&self, text: &str, index: &LineIndex) -> Result<Value, Vec<Diagnostic>> {
        serde_json::from_str::<Value>(text).map_err(|err| vec![syntax_diagnostic(&err, index)])
    }
}

/// Convert a `serde_json` error into a one-character diagnostic at the offending token.
pub fn syntax_diagnostic(err: &serde_json::Error, index: &LineIndex) -> Diagnostic {
    // serde_json reports 1-based lines and 1-based byte columns (0 before the first byte).
    let line = err.line().saturating_sub(1);
    let (start, end) = if err.column() == 0 && line > 0 {
        // The parser already consumed the newline; the token ended on the previous line.
        let previous = line - 1;
        let len = index.line_len_chars(previous);
        (
            Position::new(previous, len.saturating_sub(1)),
            Position::new(previous, len),
        )
    } else {
        let column = index.byte_column_to_char_column(line, err.column().saturating_sub(1));
        let end_column = (column + 1).min(index.line_len_chars(line)).max(column);
        (Position::new(line, column), Position::new(line, end_column))
    };

    Diagnostic::error(
        DiagnosticSource::Syntax,
        DiagnosticRange::new(start, end),
        syntax_message(err),
    )
}

fn syntax_message(err: &serde_json::Error) -> String {
    let full = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    match full.strip_suffix(&suffix) {
        Some(message) => message.to_string(),
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Result<Value, Vec<Diagnostic>> {
        JsonSyntaxChecker.check(text, &LineIndex::from_text(text))
    }

    #[test]
    fn test_valid_json_parses() {
        let value = check("{\"a\": [1, 2]}").unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn test_invalid_key_position() {
        let diags = check("{invalid").unwrap_err();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].source, DiagnosticSource::Syntax);
        assert_eq!(diags[0].range.start, Position::new(0, 1));
        assert_eq!(diags[0].range.end, Position::new(0, 2));
        assert!(!diags[0].message.contains("at line"));
    }

    #[test]
    fn test_error_on_later_line_with_wide_chars() {
        let text = "{\n  \"名前\": tru\n}";
        let diags = check(text).unwrap_err();
        assert_eq!(diags[0].range.start.line, 1);
        // The column is measured in characters, so it must lie within the line.
        assert!(diags[0].range.start.column <= "  \"名前\": tru".chars().count());
    }

    #[test]
    fn test_truncated_token_before_newline_stays_on_its_line() {
        let diags = check("{\n  \"a\": tru\n}").unwrap_err();
        assert_eq!(diags[0].range.start, Position::new(1, 9));
        assert_eq!(diags[0].range.end, Position::new(1, 10));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let diags = check("").unwrap_err();
        assert_eq!(diags[0].range.start, Position::origin());
    }
}
