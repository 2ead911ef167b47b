//! Logical line index.
//!
//! Maps between character/byte offsets and `(line, column)` positions using a Rope, with
//! O(log N) lookups. Validation passes build one index per pass over the current text.

use crate::diagnostics::Position;
use ropey::Rope;

/// Logical line index - implemented using Rope data structure
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create a new, empty line index
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total byte count
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Character count of `line`, excluding its line terminator.
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        len
    }

    /// Get the position of a character offset (clamped to the document end)
    pub fn char_offset_to_position(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());

        let line_idx = self.rope.char_to_line(char_offset);
        let line_start_char = self.rope.line_to_char(line_idx);

        Position::new(line_idx, char_offset - line_start_char)
    }

    /// Get the position of a byte offset (clamped to the document end).
    ///
    /// Offsets inside a multi-byte character resolve to that character.
    pub fn byte_offset_to_position(&self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.rope.len_bytes());
        self.char_offset_to_position(self.rope.byte_to_char(byte_offset))
    }

    /// Convert a byte column on `line` (as reported by byte-oriented parsers) into a character
    /// column.
    pub fn byte_column_to_char_column(&self, line: usize, byte_column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let byte_column = byte_column.min(slice.len_bytes());
        slice.byte_to_char(byte_column).min(self.line_len_chars(line))
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
