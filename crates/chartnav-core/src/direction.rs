#![forbid(unsafe_code)]

//! Directional vocabulary shared by every topology.
//!
//! Rows grow upward: [`NavDirection::Up`] increments the row index and
//! [`NavDirection::Down`] decrements it. Columns grow to the right. This
//! matches the way charts are read (the first series row is the bottom one).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single directional step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// The axis a direction travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Up / Down.
    Row,
    /// Left / Right.
    Col,
}

impl NavDirection {
    /// All four directions, in a stable order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The direction that undoes this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Row,
            Self::Left | Self::Right => Axis::Col,
        }
    }

    /// Apply this direction to `pos`, returning `None` on underflow.
    ///
    /// Upper bounds are the caller's concern.
    #[must_use]
    pub fn step(self, pos: Position) -> Option<Position> {
        match self {
            Self::Up => pos.row.checked_add(1).map(|row| Position { row, ..pos }),
            Self::Down => pos.row.checked_sub(1).map(|row| Position { row, ..pos }),
            Self::Right => pos.col.checked_add(1).map(|col| Position { col, ..pos }),
            Self::Left => pos.col.checked_sub(1).map(|col| Position { col, ..pos }),
        }
    }

    /// Lowercase label used in notices ("left", "up", ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Where a step in this direction leads, as read in announcements.
    #[must_use]
    pub const fn side(self) -> &'static str {
        match self {
            Self::Up => "above",
            Self::Down => "below",
            Self::Left => "to the left",
            Self::Right => "to the right",
        }
    }
}

/// A cursor location inside a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// What a movement predicate is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Direction(NavDirection),
    Index(Position),
}

impl From<NavDirection> for MoveTarget {
    fn from(dir: NavDirection) -> Self {
        Self::Direction(dir)
    }
}

impl From<Position> for MoveTarget {
    fn from(pos: Position) -> Self {
        Self::Index(pos)
    }
}
