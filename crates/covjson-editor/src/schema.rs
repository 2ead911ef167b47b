//! JSON schema validation.
//!
//! The active schema is an external collaborator behind [`SchemaValidator`]: it reports
//! structural violations by JSON pointer, and [`violations_to_diagnostics`] places them in the
//! text through a [`SourceMap`].

use crate::diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSource, Position};
use crate::error::SchemaError;
use crate::line_index::LineIndex;
use crate::source_map::SourceMap;
use jsonschema::JSONSchema;
use jsonschema::output::BasicOutput;
use serde_json::Value;
use std::fmt;

/// One structural violation reported by a schema validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value in the document.
    pub instance_path: String,
    /// JSON pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human readable message.
    pub message: String,
}

/// A validator that checks parsed documents against a schema.
pub trait SchemaValidator {
    /// Validate `instance`, returning every violation found (empty if valid).
    fn validate(&self, instance: &Value) -> Vec<SchemaViolation>;
}

/// A compiled JSON schema document.
pub struct Schema {
    document: Value,
    compiled: JSONSchema,
}

impl Schema {
    /// Compile a schema document.
    pub fn compile(document: Value) -> Result<Self, SchemaError> {
        let compiled =
            JSONSchema::compile(&document).map_err(|err| SchemaError::Compile(err.to_string()))?;
        Ok(Self { document, compiled })
    }

    /// Parse and compile a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(text)?;
        Self::compile(document)
    }

    /// The schema document this validator was compiled from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The schema's `$id`, if present.
    pub fn id(&self) -> Option<&str> {
        self.document.get("$id").and_then(Value::as_str)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("id", &self.id()).finish()
    }
}

impl SchemaValidator for Schema {
    fn validate(&self, instance: &Value) -> Vec<SchemaViolation> {
        // The basic output format keeps the errors of every failed `anyOf`/`oneOf` branch,
        // which pruning relies on to pick the precise ones.
        match self.compiled.apply(instance).basic() {
            BasicOutput::Valid(_) => Vec::new(),
            BasicOutput::Invalid(errors) => errors
                .iter()
                .map(|unit| SchemaViolation {
                    instance_path: unit.instance_location().to_string(),
                    schema_path: unit.keyword_location().to_string(),
                    message: unit.error_description().to_string(),
                })
                .collect(),
        }
    }
}

/// Place schema violations in the text.
///
/// Each diagnostic spans the offending value (or its nearest recorded ancestor). Violations
/// that cannot be located at all are reported at the document start.
pub fn violations_to_diagnostics(
    violations: Vec<SchemaViolation>,
    source_map: &SourceMap,
    index: &LineIndex,
) -> Vec<Diagnostic> {
    violations
        .into_iter()
        .map(|violation| {
            let range = source_map
                .range(&violation.instance_path, index)
                .unwrap_or_else(|| DiagnosticRange::point(Position::origin()));
            Diagnostic::error(DiagnosticSource::Schema, range, violation.message)
                .with_schema_path(violation.schema_path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coverage_schema() -> Schema {
        Schema::compile(json!({
            "type": "object",
            "required": ["type", "domain"],
            "properties": {
                "type": { "type": "string" },
                "parameters": { "type": "object" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_document_has_no_violations() {
        let schema = coverage_schema();
        let doc = json!({ "type": "Coverage", "domain": {} });
        assert!(schema.validate(&doc).is_empty());
    }

    #[test]
    fn test_missing_required_property() {
        let schema = coverage_schema();
        let violations = schema.validate(&json!({ "type": "Coverage", "parameters": {} }));
        assert!(
            violations
                .iter()
                .any(|v| v.message.contains("domain") && v.instance_path.is_empty())
        );
    }

    #[test]
    fn test_violation_is_placed_on_value() {
        let text = "{\n  \"type\": 5,\n  \"domain\": {}\n}";
        let schema = coverage_schema();
        let value: Value = serde_json::from_str(text).unwrap();
        let index = LineIndex::from_text(text);
        let map = SourceMap::build(text);

        let diags = violations_to_diagnostics(schema.validate(&value), &map, &index);
        let diag = diags
            .iter()
            .find(|d| d.range.start.line == 1)
            .expect("type violation on line 2");
        assert_eq!(diag.range.start, Position::new(1, 10));
        assert_eq!(diag.range.end, Position::new(1, 11));
        assert_eq!(diag.source, DiagnosticSource::Schema);
        assert!(diag.schema_path.as_deref().unwrap().ends_with("/type"));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let err = Schema::compile(json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, SchemaError::Compile(_)));
        assert!(matches!(
            Schema::from_json_str("{nope").unwrap_err(),
            SchemaError::Json(_)
        ));
    }
}
