//! Reformatting of minified JSON.
//!
//! Upstream servers often return CoverageJSON as a single line, which is unreadable in an
//! editor. [`prettify_json`] re-indents such documents once when they are loaded, and leaves
//! everything else alone: already formatted text, oversized documents and text that does not
//! parse.

use serde_json::Value;
use std::borrow::Cow;

/// Thresholds and layout for [`prettify_json_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Documents larger than this (in bytes) are never reformatted.
    pub max_bytes: usize,
    /// Documents spanning more lines than this are assumed to be formatted already.
    pub max_lines: usize,
    /// Indentation width in spaces.
    pub indent: usize,
    /// Containers whose single-line form is at most this many characters stay on one line.
    pub inline_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024,
            max_lines: 2,
            indent: 2,
            inline_width: 60,
        }
    }
}

/// Reformat `text` with the default options.
pub fn prettify_json(text: &str) -> Cow<'_, str> {
    prettify_json_with(text, &FormatOptions::default())
}

/// Reformat `text` if it is a small, single-line (or two-line) valid JSON document.
pub fn prettify_json_with<'a>(text: &'a str, options: &FormatOptions) -> Cow<'a, str> {
    if text.len() > options.max_bytes || line_count(text) > options.max_lines {
        return Cow::Borrowed(text);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Cow::Owned(to_compact_pretty(&value, options)),
        Err(_) => Cow::Borrowed(text),
    }
}

/// Number of lines in `text`, treating `\r\n`, `\r` and `\n` as line breaks.
pub fn line_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut lines = 1;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines += 1;
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => lines += 1,
            _ => {}
        }
        i += 1;
    }
    lines
}

/// Serialize `value` with indentation, keeping short containers on one line.
pub fn to_compact_pretty(value: &Value, options: &FormatOptions) -> String {
    let mut out = String::new();
    write_block(&mut out, value, 0, options);
    out
}

fn write_block(out: &mut String, value: &Value, depth: usize, options: &FormatOptions) {
    if let Some(inline) = inline_within(value, options.inline_width) {
        out.push_str(&inline);
        return;
    }

    let inner = " ".repeat((depth + 1) * options.indent);
    let outer = " ".repeat(depth * options.indent);
    match value {
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                out.push_str(&inner);
                out.push_str(&scalar(&Value::String(key.clone())));
                out.push_str(": ");
                write_block(out, child, depth + 1, options);
            }
            out.push('\n');
            out.push_str(&outer);
            out.push('}');
        }
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                out.push_str(&inner);
                write_block(out, child, depth + 1, options);
            }
            out.push('\n');
            out.push_str(&outer);
            out.push(']');
        }
        // Long strings cannot be broken up.
        _ => out.push_str(&scalar(value)),
    }
}

/// Single-line form of `value`, or `None` as soon as it exceeds `limit` characters.
fn inline_within(value: &Value, limit: usize) -> Option<String> {
    let mut out = String::new();
    if !push_inline(&mut out, value, limit) {
        return None;
    }
    Some(out)
}

fn push_inline(out: &mut String, value: &Value, limit: usize) -> bool {
    match value {
        Value::Object(map) => {
            out.push('{');
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&scalar(&Value::String(key.clone())));
                out.push_str(": ");
                if !push_inline(out, child, limit) {
                    return false;
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if !push_inline(out, child, limit) {
                    return false;
                }
            }
            out.push(']');
        }
        _ => out.push_str(&scalar(value)),
    }
    out.chars().count() <= limit
}

fn scalar(value: &Value) -> String {
    // Serializing a `Value` cannot fail: keys are strings and numbers are finite.
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_document_stays_inline() {
        assert_eq!(prettify_json(r#"{"a":1,"b":[1,2]}"#), r#"{"a": 1, "b": [1, 2]}"#);
    }

    #[test]
    fn test_long_document_is_indented() {
        let text = r#"{"type":"Coverage","domain":{"type":"Domain","domainType":"Grid","axes":{"x":{"values":[1,2,3]},"y":{"values":[4,5,6]}}},"parameters":{}}"#;
        let expected = r#"{
  "type": "Coverage",
  "domain": {
    "type": "Domain",
    "domainType": "Grid",
    "axes": {"x": {"values": [1, 2, 3]}, "y": {"values": [4, 5, 6]}}
  },
  "parameters": {}
}"#;
        assert_eq!(prettify_json(text), expected);
    }

    #[test]
    fn test_multiline_text_untouched() {
        let text = "{\"a\":\n1\n,\"b\":2}";
        assert!(matches!(prettify_json(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_two_line_text_is_reformatted() {
        let text = "{\"a\":1,\n\"b\":2}";
        assert_eq!(prettify_json(text), r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    fn test_syntax_error_untouched() {
        let text = r#"{"a":1,"#;
        assert_eq!(prettify_json(text), text);
    }

    #[test]
    fn test_oversized_text_untouched() {
        let options = FormatOptions {
            max_bytes: 8,
            ..FormatOptions::default()
        };
        let text = r#"{"abc":[1,2,3]}"#;
        assert_eq!(prettify_json_with(text, &options), text);
    }

    #[test]
    fn test_round_trip_preserves_value() {
        let text = r#"{"values":[0.1,1e300,-5,"x\"y",null,true,{"nested":["é",[]]}],"long":"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}"#;
        let pretty = prettify_json(text);
        let a: Value = serde_json::from_str(text).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_line_count_variants() {
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\r\nb"), 2);
        assert_eq!(line_count("a\rb\nc"), 3);
        assert_eq!(line_count("a\n"), 2);
    }
}
