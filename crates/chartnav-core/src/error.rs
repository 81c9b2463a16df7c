#![forbid(unsafe_code)]

//! Error types for statistics helpers and topology construction.
//!
//! Boundary hits are not errors: movement returns `false` and the caller
//! emits a notice. Only programmer errors surface here.

use std::fmt;

use crate::direction::Position;

/// A statistic was asked about data it cannot summarise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesError {
    /// The series has no numeric values.
    EmptySeries,
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySeries => f.write_str("series contains no numeric values"),
        }
    }
}

impl std::error::Error for SeriesError {}

/// A topology could not be built from the supplied shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// No rows, no nodes or no points at all.
    Empty,
    /// A grid row has no cells.
    EmptyRow { row: usize },
    /// A graph edge points at a cell that holds no node.
    DanglingEdge { from: Position, to: Position },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("topology has no reachable positions"),
            Self::EmptyRow { row } => write!(f, "grid row {row} has no cells"),
            Self::DanglingEdge { from, to } => write!(
                f,
                "edge from ({}, {}) targets empty cell ({}, {})",
                from.row, from.col, to.row, to.col
            ),
        }
    }
}

impl std::error::Error for TopologyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            SeriesError::EmptySeries.to_string(),
            "series contains no numeric values"
        );
        assert_eq!(
            TopologyError::EmptyRow { row: 2 }.to_string(),
            "grid row 2 has no cells"
        );
        let e = TopologyError::DanglingEdge {
            from: Position::new(0, 0),
            to: Position::new(3, 1),
        };
        assert_eq!(e.to_string(), "edge from (0, 0) targets empty cell (3, 1)");
    }
}
