//! Live validation example
//!
//! Demonstrates the validation pass: syntax errors, schema errors after pruning and an
//! externally reported error.

use covjson_editor::{EditorEvent, JsonEditor, prettify_json};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn main() {
    println!("=== Live validation ===\n");

    let mut editor = JsonEditor::new();
    editor
        .set_schema_document(json!({
            "type": "object",
            "required": ["type", "domain"],
            "properties": {
                "type": { "enum": ["Coverage", "CoverageCollection", "Domain"] },
                "parameters": { "type": "object" }
            }
        }))
        .unwrap();

    let changes = Arc::new(Mutex::new(0));
    let changes_clone = changes.clone();
    editor.subscribe(move |event| {
        if let EditorEvent::Change { text } = event {
            *changes_clone.lock().unwrap() += 1;
            println!("  change: {} bytes", text.len());
        }
    });

    println!("1. Syntax error:");
    let report = editor.replace_text("{\"type\": \"Coverage\",");
    print_diagnostics(&editor);
    println!("  change emitted: {}", report.change_emitted);

    println!("\n2. Schema errors (broad errors pruned):");
    let text = prettify_json(r#"{"type":"Coverage","parameters":5}"#).into_owned();
    editor.replace_text(text);
    print_diagnostics(&editor);

    println!("\n3. Error reported by the renderer:");
    editor.set_error("Playground: unsupported or missing domain type");
    editor.revalidate();
    print_diagnostics(&editor);

    println!("\n4. Next pass, error consumed:");
    editor.revalidate();
    print_diagnostics(&editor);

    println!("\nchanges emitted: {}", changes.lock().unwrap());
}

fn print_diagnostics(editor: &JsonEditor) {
    if editor.diagnostics().is_empty() {
        println!("  (no diagnostics)");
    }
    for diagnostic in editor.diagnostics() {
        println!("  {diagnostic}");
    }
}
