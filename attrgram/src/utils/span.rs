//! Source location tracking for semantic rule text
//!
//! Rules are short expressions, but a grammar may carry hundreds of them, so
//! rule syntax errors point at the exact offending column.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in rule text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of rule text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Get the start position of this span
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the end position of this span
    pub fn end(&self) -> Position {
        self.end
    }

    /// Create a single-character span
    pub fn single(pos: Position) -> Self {
        let end = Position {
            offset: pos.offset + 1,
            line: pos.line,
            column: pos.column + 1,
        };
        Self { start: pos, end }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Check if this span is empty
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Render the rule text with a caret underline beneath this span
    pub fn render(&self, source: &str, message: &str) -> String {
        let line = source
            .lines()
            .nth(self.start.line.saturating_sub(1) as usize)
            .unwrap_or("");
        let width = if self.start.line == self.end.line {
            (self.end.column.saturating_sub(self.start.column) as usize).max(1)
        } else {
            1
        };

        format!(
            "error: {}\n  --> rule {}\n   | {}\n   | {}{}\n",
            message,
            self.start,
            line,
            " ".repeat(self.start.column.saturating_sub(1) as usize),
            "^".repeat(width)
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// The source span
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a').advance('\n').advance('b');
        assert_eq!(pos, Position::new(3, 2, 2));
    }

    #[test]
    fn test_span_len() {
        let span = Span::new(Position::new(2, 1, 3), Position::new(9, 1, 10));
        assert_eq!(span.len(), 7);
        assert!(!span.is_empty());
        assert!(Span::new(Position::start(), Position::start()).is_empty());
    }

    #[test]
    fn test_render_underlines_span() {
        let source = "ok := true and";
        let span = Span::new(Position::new(11, 1, 12), Position::new(14, 1, 15));
        let rendered = span.render(source, "expected operand");

        assert!(rendered.starts_with("error: expected operand"));
        assert!(rendered.contains("--> rule 1:12"));
        assert!(rendered.contains(&format!("   | {}^^^", " ".repeat(11))));
    }
}
