#![forbid(unsafe_code)]

//! Movable topologies: the shapes a cursor can walk.
//!
//! Three shapes cover every supported chart:
//!
//! | Shape | Used by | Movement |
//! |-------|---------|----------|
//! | [`Grid`] | bar, line, heatmap, box | ±row / ±col with bounds checks |
//! | [`Graph`] | candlestick, irregular layouts | explicit per-node neighbours |
//! | [`Plane`] | scatter | row- or column-oriented, toggled by orthogonal moves |
//!
//! # Invariants
//!
//! 1. [`Movable::is_movable`] never mutates.
//! 2. The first `move_once` / `move_to_extreme` after construction or
//!    [`Movable::reset`] resolves to a valid in-bounds position and
//!    `move_once` reports `true`.
//! 3. A move past a boundary returns `false` and leaves the position
//!    unchanged. There is no wraparound.
//! 4. [`Movable::move_to_index`] validates first and never clamps.

mod graph;
mod grid;
mod plane;

pub use graph::{Graph, GraphNode};
pub use grid::Grid;
pub use plane::{Plane, PlaneColumn, PlaneMode, PlaneRow};

use crate::direction::{MoveTarget, NavDirection, Position};

/// Seed for a topology's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovableOptions {
    /// Requested start; clamped on initial entry.
    pub start: Position,
    /// Whether the first move should perform entry instead of stepping.
    pub initial_entry: bool,
}

impl Default for MovableOptions {
    fn default() -> Self {
        Self {
            start: Position::default(),
            initial_entry: true,
        }
    }
}

impl MovableOptions {
    #[must_use]
    pub fn starting_at(row: usize, col: usize) -> Self {
        Self {
            start: Position::new(row, col),
            ..Self::default()
        }
    }
}

/// Directional movement over a finite set of positions.
pub trait Movable {
    /// Current cursor. Meaningful once initial entry has happened.
    fn position(&self) -> Position;

    /// `true` until the first move resolves entry.
    fn is_initial_entry(&self) -> bool;

    /// Single step. Returns whether the cursor changed.
    fn move_once(&mut self, dir: NavDirection) -> bool;

    /// Jump to the boundary in `dir`.
    fn move_to_extreme(&mut self, dir: NavDirection) -> bool;

    /// Validate `pos`, then move there.
    fn move_to_index(&mut self, pos: Position) -> bool;

    /// Pure predicate: would a move towards `target` succeed?
    fn is_movable(&self, target: MoveTarget) -> bool;

    /// Return to the seeded start and re-arm initial entry.
    fn reset(&mut self);
}

/// Shared cursor bookkeeping for every topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) pos: Position,
    pub(crate) initial_entry: bool,
    seed: MovableOptions,
}

impl Cursor {
    pub(crate) fn new(seed: MovableOptions) -> Self {
        Self {
            pos: seed.start,
            initial_entry: seed.initial_entry,
            seed,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.seed);
    }

    pub(crate) fn place(&mut self, pos: Position) {
        self.pos = pos;
        self.initial_entry = false;
    }
}

/// Discriminant of a [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    Grid,
    Graph,
    Plane,
}

/// A topology of any shape, each variant owning its full state.
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    Grid(Grid),
    Graph(Graph),
    Plane(Plane),
}

impl Topology {
    #[must_use]
    pub fn kind(&self) -> TopologyKind {
        match self {
            Self::Grid(_) => TopologyKind::Grid,
            Self::Graph(_) => TopologyKind::Graph,
            Self::Plane(_) => TopologyKind::Plane,
        }
    }

    fn as_movable(&self) -> &dyn Movable {
        match self {
            Self::Grid(g) => g,
            Self::Graph(g) => g,
            Self::Plane(p) => p,
        }
    }

    fn as_movable_mut(&mut self) -> &mut dyn Movable {
        match self {
            Self::Grid(g) => g,
            Self::Graph(g) => g,
            Self::Plane(p) => p,
        }
    }

    /// The plane, if this is one.
    #[must_use]
    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Self::Plane(p) => Some(p),
            _ => None,
        }
    }
}

impl Movable for Topology {
    fn position(&self) -> Position {
        self.as_movable().position()
    }

    fn is_initial_entry(&self) -> bool {
        self.as_movable().is_initial_entry()
    }

    fn move_once(&mut self, dir: NavDirection) -> bool {
        let moved = self.as_movable_mut().move_once(dir);
        tracing::trace!(kind = ?self.kind(), ?dir, moved, pos = ?self.position(), "move_once");
        moved
    }

    fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        self.as_movable_mut().move_to_extreme(dir)
    }

    fn move_to_index(&mut self, pos: Position) -> bool {
        self.as_movable_mut().move_to_index(pos)
    }

    fn is_movable(&self, target: MoveTarget) -> bool {
        self.as_movable().is_movable(target)
    }

    fn reset(&mut self) {
        self.as_movable_mut().reset();
    }
}

impl From<Grid> for Topology {
    fn from(g: Grid) -> Self {
        Self::Grid(g)
    }
}

impl From<Graph> for Topology {
    fn from(g: Graph) -> Self {
        Self::Graph(g)
    }
}

impl From<Plane> for Topology {
    fn from(p: Plane) -> Self {
        Self::Plane(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_delegates_to_variant() {
        let grid = Grid::new(vec![3, 3], MovableOptions::default()).unwrap();
        let mut topo = Topology::from(grid);
        assert_eq!(topo.kind(), TopologyKind::Grid);
        assert!(topo.is_initial_entry());
        assert!(topo.move_once(NavDirection::Right));
        assert_eq!(topo.position(), Position::new(0, 0));
        assert!(topo.move_once(NavDirection::Right));
        assert_eq!(topo.position(), Position::new(0, 1));
        topo.reset();
        assert!(topo.is_initial_entry());
    }

    #[test]
    fn as_plane_only_for_planes() {
        let grid = Grid::new(vec![1], MovableOptions::default()).unwrap();
        assert!(Topology::from(grid).as_plane().is_none());
        let plane = Plane::from_points(&[(1.0, 2.0)]).unwrap();
        assert!(Topology::from(plane).as_plane().is_some());
    }
}
