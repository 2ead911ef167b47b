//! End-to-end tests of the validation pass: syntax, schema, pruning and the pending error.

use covjson_editor::{
    DiagnosticSource, EditorEvent, JsonEditor, Position, Schema, merge_diagnostics,
};
use std::sync::{Arc, Mutex};

const SCHEMA: &str = include_str!("fixtures/coverage.schema.json");

fn editor_with_schema() -> JsonEditor {
    let mut editor = JsonEditor::new();
    editor.set_schema(Schema::from_json_str(SCHEMA).unwrap());
    editor
}

fn changes(editor: &mut JsonEditor) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    editor.subscribe(move |event| {
        if let EditorEvent::Change { text } = event {
            seen_clone.lock().unwrap().push(text.clone());
        }
    });
    seen
}

#[test]
fn test_syntax_error_blocks_change() {
    let mut editor = editor_with_schema();
    let seen = changes(&mut editor);

    let report = editor.replace_text("{invalid");

    assert!(!report.change_emitted);
    assert!(report.value.is_none());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].source, DiagnosticSource::Syntax);
    assert_eq!(report.diagnostics[0].range.start, Position::new(0, 1));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_schema_violation_still_emits_change() {
    let mut editor = editor_with_schema();
    let seen = changes(&mut editor);
    let text = r#"{"type": "Coverage", "parameters": {}}"#;

    let report = editor.replace_text(text);

    assert!(report.change_emitted);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].message.contains("domain"));
    assert_eq!(report.diagnostics[0].source, DiagnosticSource::Schema);
    assert_eq!(*seen.lock().unwrap(), vec![text.to_string()]);
    assert_eq!(editor.diagnostics(), report.diagnostics.as_slice());
}

#[test]
fn test_without_schema_only_pending_error_is_shown() {
    let mut editor = JsonEditor::new();
    let seen = changes(&mut editor);

    let report = editor.replace_text(r#"{"anything": [1, 2, 3]}"#);
    assert!(report.diagnostics.is_empty());

    editor.set_error("Playground: unsupported or missing domain type");
    let report = editor.revalidate();
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].source, DiagnosticSource::External);
    assert_eq!(report.diagnostics[0].range.start, Position::origin());

    // Revalidation is silent: only the first user edit produced a change.
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_pending_error_consumed_exactly_once() {
    let mut editor = JsonEditor::new();
    editor.set_text("{}");
    editor.set_error("render failed");

    assert_eq!(editor.revalidate().diagnostics.len(), 1);
    assert!(editor.pending_error().is_none());
    assert!(editor.revalidate().diagnostics.is_empty());
}

#[test]
fn test_pending_error_survives_syntax_errors() {
    let mut editor = JsonEditor::new();
    editor.set_error("render failed");

    let report = editor.replace_text("[1,");
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].source, DiagnosticSource::Syntax);
    assert_eq!(editor.pending_error(), Some("render failed"));

    let report = editor.replace_text("[1]");
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].message, "render failed");
}

#[test]
fn test_pending_error_appended_after_schema_errors() {
    let mut editor = editor_with_schema();
    editor.set_error("render failed");

    let report = editor.replace_text(r#"{"type": "Coverage"}"#);
    let last = report.diagnostics.last().unwrap();
    assert_eq!(last.source, DiagnosticSource::External);
    assert!(report.diagnostics.len() >= 2);
}

#[test]
fn test_clear_error_drops_pending() {
    let mut editor = JsonEditor::new();
    editor.set_error("render failed");
    editor.clear_error();
    assert!(editor.replace_text("{}").diagnostics.is_empty());
}

#[test]
fn test_broad_errors_pruned_in_favour_of_nested_ones() {
    let mut editor = editor_with_schema();
    let text = r#"{
  "type": "Coverage",
  "parameters": 5
}"#;

    let report = editor.replace_text(text);

    // The root-level "domain is required" error spans lines 0..3 and contains the
    // `parameters` error on line 2.
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].range.start.line, 2);
    assert!(report.diagnostics[0].message.contains("object"));
}

#[test]
fn test_alternative_branch_messages_are_dropped() {
    let mut editor = editor_with_schema();
    let text = r#"{
  "type": "Coverage",
  "domain": { "domainType": "Grid", "axes": {} },
  "ranges": {
    "SST": {
      "type": "NdArray",
      "values": 5
    }
  }
}"#;

    let report = editor.replace_text(text);

    // The `TiledNdArray` branch also fails, but the `NdArray` branch explains the problem.
    assert_eq!(report.diagnostics.len(), 1, "{:?}", report.diagnostics);
    assert_eq!(report.diagnostics[0].range.start.line, 6);
    assert!(report.diagnostics[0].message.contains("array"));
}

#[test]
fn test_failed_alternatives_survive_unrelated_errors() {
    let mut editor = editor_with_schema();
    let text = r#"{
  "type": "Coverage",
  "domain": { "domainType": "Gird", "axes": {} },
  "parameters": 5
}"#;

    let report = editor.replace_text(text);

    assert!(
        report.diagnostics.iter().any(|d| d.range.start.line == 2),
        "domainType failure missing: {:?}",
        report.diagnostics
    );
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.range.start.line == 3 && d.message.contains("object"))
    );
}

#[test]
fn test_only_alternative_failures_are_still_reported() {
    let mut editor = editor_with_schema();
    let text = r#"{
  "type": "Coverage",
  "domain": { "domainType": "Gird", "axes": {} }
}"#;

    let report = editor.replace_text(text);
    assert!(!report.diagnostics.is_empty());
    assert!(report.diagnostics.iter().all(|d| d.range.start.line == 2));
}

#[test]
fn test_valid_document_has_no_diagnostics() {
    let mut editor = editor_with_schema();
    let report = editor.replace_text(
        r#"{"type": "Coverage", "domain": {"domainType": "Grid", "axes": {"x": {"values": [1, 2]}}}}"#,
    );
    assert!(report.diagnostics.is_empty());
    assert!(report.change_emitted);
}

#[test]
fn test_merge_is_pure_over_inputs() {
    let mut pending = None;
    assert!(merge_diagnostics(Vec::new(), Vec::new(), &mut pending).is_empty());
}
