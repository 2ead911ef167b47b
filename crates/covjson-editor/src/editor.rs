//! The editor state machine.
//!
//! [`JsonEditor`] owns the document text, the active schema and the single pending external
//! error. Every mutation runs one synchronous validation pass:
//!
//! ```text
//! text ──► syntax check ──✗──► overlay = syntax errors            (no `change`)
//!               │
//!               ✓ parsed value
//!               ▼
//!          schema check (if a schema is active)
//!               ▼
//!          prune + append pending error ──► overlay               (`change` on user edits)
//! ```
//!
//! Passes are strictly sequential and each one replaces the overlay wholesale.
//!
//! # Example
//!
//! ```rust
//! use covjson_editor::{EditorEvent, JsonEditor};
//!
//! let mut editor = JsonEditor::new();
//! editor.subscribe(|event| {
//!     if let EditorEvent::Change { text } = event {
//!         println!("document changed: {} bytes", text.len());
//!     }
//! });
//!
//! let report = editor.replace_text("{invalid");
//! assert!(!report.change_emitted);
//! assert_eq!(report.diagnostics.len(), 1);
//!
//! let report = editor.replace_text(r#"{"type": "Coverage"}"#);
//! assert!(report.change_emitted);
//! assert!(report.diagnostics.is_empty());
//! ```

use crate::diagnostics::Diagnostic;
use crate::error::{EditError, SchemaError};
use crate::format::FormatOptions;
use crate::line_index::LineIndex;
use crate::pruning::DiagnosticPruner;
use crate::schema::{Schema, SchemaValidator, violations_to_diagnostics};
use crate::source_map::SourceMap;
use crate::syntax::{JsonSyntaxChecker, SyntaxChecker};
use serde_json::Value;
use std::ops::Range;
use tracing::debug;

/// Notifications emitted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A user edit produced syntactically valid text.
    Change {
        /// The full document text.
        text: String,
    },
    /// The editor asks the surrounding layout to recompute sizes.
    Resize,
    /// A validation pass replaced the overlay.
    DiagnosticsChanged {
        /// The complete overlay.
        diagnostics: Vec<Diagnostic>,
    },
    /// An alert-class message for the user (failed loads).
    Notice {
        /// Message text.
        message: String,
    },
}

/// Editor event callback function type
pub type EditorEventCallback = Box<dyn FnMut(&EditorEvent) + Send>;

/// Where a mutation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// Typing, pasting or another user action: emits `change` when the text parses.
    User,
    /// Programmatic load or revalidation: never emits `change`.
    Silent,
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// The overlay shown after this pass.
    pub diagnostics: Vec<Diagnostic>,
    /// The parsed document, if the text was syntactically valid.
    pub value: Option<Value>,
    /// Whether a `change` notification was emitted.
    pub change_emitted: bool,
}

impl ValidationReport {
    /// Returns `true` if the text parsed.
    pub fn is_parseable(&self) -> bool {
        self.value.is_some()
    }
}

/// Editor configuration.
#[derive(Debug, Clone, Default)]
pub struct EditorOptions {
    /// Technical-message filtering used by every validation pass.
    pub pruner: DiagnosticPruner,
    /// Reformatting applied to documents loaded from a URL.
    pub format: FormatOptions,
}

/// Headless JSON editor with live validation.
pub struct JsonEditor {
    text: String,
    active_schema: Option<Box<dyn SchemaValidator + Send>>,
    pending_error: Option<String>,
    diagnostics: Vec<Diagnostic>,
    syntax: Box<dyn SyntaxChecker + Send>,
    options: EditorOptions,
    fullscreen: bool,
    version: u64,
    callbacks: Vec<EditorEventCallback>,
}

impl JsonEditor {
    /// Create an empty editor with default options.
    pub fn new() -> Self {
        Self::with_options(EditorOptions::default())
    }

    /// Create an empty editor.
    pub fn with_options(options: EditorOptions) -> Self {
        Self {
            text: String::new(),
            active_schema: None,
            pending_error: None,
            diagnostics: Vec::new(),
            syntax: Box::new(JsonSyntaxChecker),
            options,
            fullscreen: false,
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Replace the syntax checker.
    pub fn with_syntax_checker(mut self, checker: impl SyntaxChecker + Send + 'static) -> Self {
        self.syntax = Box::new(checker);
        self
    }

    /// Current document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The overlay produced by the last validation pass.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of validation passes run so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Editor options.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Returns `true` if a schema is active.
    pub fn has_schema(&self) -> bool {
        self.active_schema.is_some()
    }

    /// The externally reported error waiting for the next pass.
    pub fn pending_error(&self) -> Option<&str> {
        self.pending_error.as_deref()
    }

    /// Whether the editor pane is collapsed to give the map the full window.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Subscribe to editor events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Replace the document without emitting `change` (programmatic load).
    pub fn set_text(&mut self, text: impl Into<String>) -> ValidationReport {
        self.text = text.into();
        self.validate(EditOrigin::Silent)
    }

    /// Replace the whole document as a user edit (paste, select-all + type).
    pub fn replace_text(&mut self, text: impl Into<String>) -> ValidationReport {
        self.text = text.into();
        self.validate(EditOrigin::User)
    }

    /// Replace the characters in `range` (char offsets) as a user edit.
    pub fn apply_edit(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<ValidationReport, EditError> {
        let len = self.text.chars().count();
        if range.start > range.end || range.end > len {
            return Err(EditError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let start = char_to_byte(&self.text, range.start);
        let end = char_to_byte(&self.text, range.end);
        self.text.replace_range(start..end, text);
        Ok(self.validate(EditOrigin::User))
    }

    /// Run a validation pass over the current text without emitting `change`.
    pub fn revalidate(&mut self) -> ValidationReport {
        self.validate(EditOrigin::Silent)
    }

    /// Queue an externally reported error for the next validation pass.
    ///
    /// Only one error is kept: a later call replaces an unconsumed earlier one.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.pending_error = Some(message.into());
    }

    /// Drop the pending external error.
    pub fn clear_error(&mut self) {
        self.pending_error = None;
    }

    /// Install a schema validator, replacing the previous one wholesale.
    pub fn set_schema(&mut self, schema: impl SchemaValidator + Send + 'static) {
        self.active_schema = Some(Box::new(schema));
    }

    /// Compile and install a schema document.
    ///
    /// On failure the previous schema stays active.
    pub fn set_schema_document(&mut self, document: Value) -> Result<(), SchemaError> {
        let schema = Schema::compile(document)?;
        self.set_schema(schema);
        Ok(())
    }

    /// Remove the active schema.
    pub fn clear_schema(&mut self) {
        self.active_schema = None;
    }

    /// Collapse or expand the editor pane and ask the layout to resize.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.emit(&EditorEvent::Resize);
    }

    /// Surface an alert-class message to the user.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.emit(&EditorEvent::Notice {
            message: message.into(),
        });
    }

    /// Run one validation pass.
    pub fn validate(&mut self, origin: EditOrigin) -> ValidationReport {
        let index = LineIndex::from_text(&self.text);
        let pruner = &self.options.pruner;

        let (diagnostics, value) = match self.syntax.check(&self.text, &index) {
            Err(syntax) => (
                pruner.merge(syntax, Vec::new(), &mut self.pending_error),
                None,
            ),
            Ok(value) => {
                let schema = match &self.active_schema {
                    Some(validator) => {
                        let source_map = SourceMap::build(&self.text);
                        violations_to_diagnostics(validator.validate(&value), &source_map, &index)
                    }
                    None => Vec::new(),
                };
                (
                    pruner.merge(Vec::new(), schema, &mut self.pending_error),
                    Some(value),
                )
            }
        };

        self.version += 1;
        debug!(
            version = self.version,
            parseable = value.is_some(),
            diagnostics = diagnostics.len(),
            "validation pass"
        );

        self.diagnostics = diagnostics.clone();
        self.emit(&EditorEvent::DiagnosticsChanged {
            diagnostics: diagnostics.clone(),
        });

        let change_emitted = value.is_some() && origin == EditOrigin::User;
        if change_emitted {
            self.emit(&EditorEvent::Change {
                text: self.text.clone(),
            });
        }

        ValidationReport {
            diagnostics,
            value,
            change_emitted,
        }
    }

    fn emit(&mut self, event: &EditorEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}

impl Default for JsonEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(editor: &mut JsonEditor) -> Arc<Mutex<Vec<EditorEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        editor.subscribe(move |event| seen_clone.lock().unwrap().push(event.clone()));
        seen
    }

    #[test]
    fn test_set_text_is_silent() {
        let mut editor = JsonEditor::new();
        let seen = recording(&mut editor);

        let report = editor.set_text("{}");
        assert!(report.is_parseable());
        assert!(!report.change_emitted);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EditorEvent::DiagnosticsChanged {
                diagnostics: Vec::new()
            }]
        );
    }

    #[test]
    fn test_apply_edit_replaces_chars() {
        let mut editor = JsonEditor::new();
        editor.set_text("{\"名\": 1}");
        let report = editor.apply_edit(6..7, "2").unwrap();
        assert_eq!(editor.text(), "{\"名\": 2}");
        assert!(report.change_emitted);
    }

    #[test]
    fn test_apply_edit_rejects_bad_range() {
        let mut editor = JsonEditor::new();
        editor.set_text("{}");
        assert_eq!(
            editor.apply_edit(1..5, "x"),
            Err(EditError::InvalidRange {
                start: 1,
                end: 5,
                len: 2
            })
        );
        assert_eq!(editor.version(), 1);
    }

    #[test]
    fn test_toggle_fullscreen_requests_resize() {
        let mut editor = JsonEditor::new();
        let seen = recording(&mut editor);
        editor.toggle_fullscreen();
        assert!(editor.is_fullscreen());
        assert_eq!(*seen.lock().unwrap(), vec![EditorEvent::Resize]);
    }

    #[test]
    fn test_failed_schema_keeps_previous() {
        let mut editor = JsonEditor::new();
        editor
            .set_schema_document(serde_json::json!({ "required": ["domain"] }))
            .unwrap();
        assert!(editor.set_schema_document(serde_json::json!({ "type": 12 })).is_err());
        assert!(editor.has_schema());

        let report = editor.set_text("{}");
        assert_eq!(report.diagnostics.len(), 1);
    }
}
