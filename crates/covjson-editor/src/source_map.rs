//! Source positions of JSON values.
//!
//! Schema validators report problems by JSON pointer (`/domain/axes/x`). A [`SourceMap`]
//! records, for every value of a well-formed document, the text span it occupies so that those
//! pointers can be turned into diagnostic ranges.
//!
//! Spans are byte ranges into the original text. Scanning works on bytes because every JSON
//! structural character is ASCII and UTF-8 continuation bytes never collide with `"` or `\`.

use crate::diagnostics::DiagnosticRange;
use crate::line_index::LineIndex;
use std::collections::HashMap;
use std::ops::Range;

/// Text span of one JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpan {
    /// Span of the member key (including quotes) when the value is an object member.
    pub key: Option<Range<usize>>,
    /// Span of the value itself.
    pub value: Range<usize>,
}

/// Map from JSON pointer to source span.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    entries: HashMap<String, ValueSpan>,
}

impl SourceMap {
    /// Scan `text` and record the span of every value.
    ///
    /// Scanning stops at the first malformed construct; values seen up to that point stay
    /// recorded.
    pub fn build(text: &str) -> Self {
        let mut scanner = Scanner {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            entries: HashMap::new(),
        };
        let _ = scanner.value(String::new(), None);
        Self {
            entries: scanner.entries,
        }
    }

    /// Number of recorded values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The span recorded for exactly `pointer`.
    pub fn get(&self, pointer: &str) -> Option<&ValueSpan> {
        self.entries.get(pointer)
    }

    /// The span for `pointer`, or for its nearest recorded ancestor.
    pub fn resolve(&self, pointer: &str) -> Option<&ValueSpan> {
        let mut current = pointer;
        loop {
            if let Some(span) = self.entries.get(current) {
                return Some(span);
            }
            match current.rfind('/') {
                Some(idx) => current = &current[..idx],
                None => return None,
            }
        }
    }

    /// The diagnostic range for `pointer`, falling back to ancestors.
    pub fn range(&self, pointer: &str, index: &LineIndex) -> Option<DiagnosticRange> {
        self.resolve(pointer).map(|span| {
            DiagnosticRange::new(
                index.byte_offset_to_position(span.value.start),
                index.byte_offset_to_position(span.value.end),
            )
        })
    }
}

/// Escape a member name as a JSON pointer reference token.
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    entries: HashMap<String, ValueSpan>,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_whitespace();
        if self.peek()? != byte {
            return None;
        }
        self.pos += 1;
        Some(())
    }

    fn value(&mut self, pointer: String, key: Option<Range<usize>>) -> Option<()> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek()? {
            b'{' => self.object(&pointer)?,
            b'[' => self.array(&pointer)?,
            b'"' => self.string()?,
            _ => self.scalar()?,
        }
        self.entries.insert(
            pointer,
            ValueSpan {
                key,
                value: start..self.pos,
            },
        );
        Some(())
    }

    fn object(&mut self, pointer: &str) -> Option<()> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek()? == b'}' {
            self.pos += 1;
            return Some(());
        }
        loop {
            self.skip_whitespace();
            let key_start = self.pos;
            self.string()?;
            let key_span = key_start..self.pos;
            let name: String = serde_json::from_str(&self.text[key_span.clone()]).ok()?;
            self.expect(b':')?;

            let child = format!("{pointer}/{}", escape_pointer_token(&name));
            self.value(child, Some(key_span))?;

            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    fn array(&mut self, pointer: &str) -> Option<()> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek()? == b']' {
            self.pos += 1;
            return Some(());
        }
        let mut idx = 0usize;
        loop {
            self.value(format!("{pointer}/{idx}"), None)?;
            idx += 1;

            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<()> {
        if self.peek()? != b'"' {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => self.pos += 1,
            }
        }
    }

    fn scalar(&mut self) -> Option<()> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then_some(())
    }
}
