#![warn(missing_docs)]
//! CovJSON Editor - Headless JSON Editing and Validation Core
//!
//! # Overview
//!
//! `covjson-editor` is the text side of the CoverageJSON playground. It owns the raw document
//! text, validates it on every change and tells the surrounding application when the text is
//! worth rendering. It does not render anything itself.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Loaders (document / schema over Fetcher)   │  ← async, notices on failure
//! ├─────────────────────────────────────────────┤
//! │  JsonEditor state machine + events          │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Diagnostic pruning / merging               │  ← pure function
//! ├─────────────────────────────────────────────┤
//! │  Syntax check │ Schema check + SourceMap    │  ← diagnostic sources
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← offset ↔ position
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use covjson_editor::JsonEditor;
//! use serde_json::json;
//!
//! let mut editor = JsonEditor::new();
//! editor
//!     .set_schema_document(json!({ "type": "object", "required": ["domain"] }))
//!     .unwrap();
//!
//! let report = editor.replace_text(r#"{"type": "Coverage", "parameters": {}}"#);
//!
//! // Schema violations are shown, but the document still parses, so `change` fires.
//! assert!(report.change_emitted);
//! assert!(report.diagnostics[0].message.contains("domain"));
//! ```
//!
//! # Module Description
//!
//! - [`diagnostics`] - Diagnostic data model
//! - [`pruning`] - Merging of syntax, schema and external diagnostics
//! - [`line_index`] - Rope based line index
//! - [`syntax`] - JSON syntax checker
//! - [`source_map`] - JSON pointer to text span mapping
//! - [`schema`] - JSON schema validation
//! - [`format`] - Single-line reformatting heuristic
//! - [`editor`] - Editor state machine
//! - [`loader`] - Document and schema loading

pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod format;
pub mod line_index;
pub mod loader;
pub mod pruning;
pub mod schema;
pub mod source_map;
pub mod syntax;

pub use diagnostics::{
    Diagnostic, DiagnosticRange, DiagnosticSeverity, DiagnosticSource, Position,
};
pub use editor::{
    EditOrigin, EditorEvent, EditorEventCallback, EditorOptions, JsonEditor, ValidationReport,
};
pub use error::{EditError, FetchError, LoadError, SchemaError};
pub use format::{FormatOptions, prettify_json, prettify_json_with};
pub use line_index::LineIndex;
pub use loader::{FetchResponse, Fetcher, fetch_document, fetch_schema};
pub use pruning::{DiagnosticPruner, TechnicalPattern, merge_diagnostics, prune_containing};
pub use schema::{Schema, SchemaValidator, SchemaViolation};
pub use source_map::{SourceMap, ValueSpan};
pub use syntax::{JsonSyntaxChecker, SyntaxChecker};
