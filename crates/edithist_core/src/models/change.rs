//! Positions, ranges, and single text replacements.

use serde::{Deserialize, Serialize};

/// Zero-based line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open line/column interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns `true` when `other` starts where this range ends.
    ///
    /// Ranges carry no line lengths, so a range ending anywhere on line `n`
    /// is treated as adjacent to one starting at column 0 of line `n + 1`.
    pub fn immediately_before(&self, other: &Range) -> bool {
        if self.end.line == other.start.line {
            return self.end.character == other.start.character;
        }
        if self.end.line + 1 == other.start.line {
            return other.start.character == 0;
        }
        false
    }
}

/// Replacement of `range_length` characters at `range_offset` with `text`.
///
/// Offsets are authoritative; `range` is the same interval in line/column
/// form and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    pub range: Range,
    pub text: String,
    pub range_offset: usize,
    pub range_length: usize,
}

impl ContentChange {
    /// Pure insertion of `text` at `offset`.
    pub fn insert(at: Position, offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: Range::new(at, at),
            text: text.into(),
            range_offset: offset,
            range_length: 0,
        }
    }

    /// Exclusive end offset of the replaced interval.
    pub fn end_offset(&self) -> usize {
        self.range_offset.saturating_add(self.range_length)
    }
}
