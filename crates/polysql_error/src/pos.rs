use std::fmt;

use serde::{Deserialize, Serialize};

/// A span in the source SQL text.
///
/// Lines and columns are 1-based. A zero position means the node was
/// synthesized and has no corresponding source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ParserPos {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl ParserPos {
    pub const ZERO: Self = ParserPos {
        line: 0,
        column: 0,
        end_line: 0,
        end_column: 0,
    };

    /// Create a position covering a single point.
    pub const fn new(line: u32, column: u32) -> Self {
        ParserPos {
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    pub const fn with_end(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        ParserPos {
            line,
            column,
            end_line,
            end_column,
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.line == 0 && self.column == 0
    }

    /// Returns a span covering both this position and `other`.
    ///
    /// Zero positions are ignored.
    pub fn plus(self, other: ParserPos) -> ParserPos {
        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return self;
        }

        let (line, column) = (self.line, self.column).min((other.line, other.column));
        let (end_line, end_column) =
            (self.end_line, self.end_column).max((other.end_line, other.end_column));

        ParserPos {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Returns a span covering every position in `positions`.
    pub fn sum(positions: impl IntoIterator<Item = ParserPos>) -> ParserPos {
        positions
            .into_iter()
            .fold(ParserPos::ZERO, |acc, pos| acc.plus(pos))
    }
}

impl fmt::Display for ParserPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == self.end_line && self.column == self.end_column {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            write!(
                f,
                "line {}, column {} to line {}, column {}",
                self.line, self.column, self.end_line, self.end_column
            )
        }
    }
}
