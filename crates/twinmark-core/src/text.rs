//! Rope-backed source buffer.
//!
//! Keystrokes arrive as char-offset inserts and deletes; the coordinator reads
//! and replaces the whole text. Every write bumps a revision counter.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::platform::{PlatformError, SourceEditor};

/// Ropey-backed source text.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
#[derive(Clone, Debug, Default)]
pub struct RopeBuffer {
    rope: ropey::Rope,
    revision: u64,
}

impl RopeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
            revision: 0,
        }
    }

    /// Bumped by every write, including ones that leave the text unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Insert at a char offset. Offsets past the end append.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let at = char_offset.min(self.rope.len_chars());
        self.rope.insert(at, text);
        self.revision += 1;
    }

    /// Delete a char range, clamped to the buffer.
    pub fn delete(&mut self, char_range: Range<usize>) {
        let len = self.rope.len_chars();
        let range = char_range.start.min(len)..char_range.end.min(len);
        if range.is_empty() {
            return;
        }
        self.rope.remove(range);
        self.revision += 1;
    }

    pub fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let start = char_range.start;
        self.delete(char_range);
        self.insert(start, text);
    }

    /// A slice as SmolStr. None if the range is out of bounds.
    pub fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.rope.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl SourceEditor for RopeBuffer {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        self.rope = ropey::Rope::from_str(text);
        self.revision += 1;
        Ok(())
    }
}

impl From<&str> for RopeBuffer {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for RopeBuffer {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
