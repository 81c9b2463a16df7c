#![forbid(unsafe_code)]

//! Explicit adjacency graph laid out on a sparse grid.
//!
//! Each occupied cell holds a [`GraphNode`] naming its neighbours in the four
//! directions plus the extreme target for each direction. A missing
//! neighbour blocks the move.
//!
//! # Invariants
//!
//! - Every edge targets an occupied cell (checked at construction).
//! - A blocked move returns `false` and leaves the cursor untouched.

use super::{Cursor, Movable, MovableOptions};
use crate::direction::{MoveTarget, NavDirection, Position};
use crate::error::TopologyError;

/// Adjacency for one occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphNode {
    pub up: Option<Position>,
    pub down: Option<Position>,
    pub left: Option<Position>,
    pub right: Option<Position>,
    pub top: Option<Position>,
    pub bottom: Option<Position>,
    pub start: Option<Position>,
    pub end: Option<Position>,
}

impl GraphNode {
    #[must_use]
    pub fn neighbour(&self, dir: NavDirection) -> Option<Position> {
        match dir {
            NavDirection::Up => self.up,
            NavDirection::Down => self.down,
            NavDirection::Left => self.left,
            NavDirection::Right => self.right,
        }
    }

    #[must_use]
    pub fn extreme(&self, dir: NavDirection) -> Option<Position> {
        match dir {
            NavDirection::Up => self.top,
            NavDirection::Down => self.bottom,
            NavDirection::Left => self.start,
            NavDirection::Right => self.end,
        }
    }

    fn edges(&self) -> impl Iterator<Item = Position> + '_ {
        [
            self.up,
            self.down,
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.start,
            self.end,
        ]
        .into_iter()
        .flatten()
    }
}

/// Graph topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    cells: Vec<Vec<Option<GraphNode>>>,
    cursor: Cursor,
}

impl Graph {
    /// Build a graph from a sparse cell layout.
    ///
    /// # Errors
    ///
    /// [`TopologyError::Empty`] when no cell is occupied and
    /// [`TopologyError::DanglingEdge`] when an edge targets an empty cell.
    pub fn new(cells: Vec<Vec<Option<GraphNode>>>, options: MovableOptions) -> Result<Self, TopologyError> {
        let mut occupied = 0usize;
        for (row, line) in cells.iter().enumerate() {
            for (col, node) in line.iter().enumerate() {
                let Some(node) = node else { continue };
                occupied += 1;
                for to in node.edges() {
                    if !Self::occupied(&cells, to) {
                        return Err(TopologyError::DanglingEdge {
                            from: Position::new(row, col),
                            to,
                        });
                    }
                }
            }
        }
        if occupied == 0 {
            return Err(TopologyError::Empty);
        }
        Ok(Self {
            cells,
            cursor: Cursor::new(options),
        })
    }

    /// Build the graph of a dense grid with straight-line neighbours and
    /// row/column extremes. Useful as a base for irregular edits.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::new`].
    pub fn dense(rows: usize, cols: usize, options: MovableOptions) -> Result<Self, TopologyError> {
        if rows == 0 || cols == 0 {
            return Err(TopologyError::Empty);
        }
        let cells = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        Some(GraphNode {
                            up: (row + 1 < rows).then(|| Position::new(row + 1, col)),
                            down: row.checked_sub(1).map(|r| Position::new(r, col)),
                            left: col.checked_sub(1).map(|c| Position::new(row, c)),
                            right: (col + 1 < cols).then(|| Position::new(row, col + 1)),
                            top: Some(Position::new(rows - 1, col)),
                            bottom: Some(Position::new(0, col)),
                            start: Some(Position::new(row, 0)),
                            end: Some(Position::new(row, cols - 1)),
                        })
                    })
                    .collect()
            })
            .collect();
        Self::new(cells, options)
    }

    fn occupied(cells: &[Vec<Option<GraphNode>>], pos: Position) -> bool {
        cells
            .get(pos.row)
            .and_then(|line| line.get(pos.col))
            .is_some_and(Option::is_some)
    }

    #[must_use]
    pub fn node(&self, pos: Position) -> Option<&GraphNode> {
        self.cells.get(pos.row)?.get(pos.col)?.as_ref()
    }

    fn current(&self) -> Option<&GraphNode> {
        self.node(self.cursor.pos)
    }

    fn enter(&mut self) {
        let origin = Position::new(0, 0);
        if Self::occupied(&self.cells, origin) {
            self.cursor.place(origin);
            return;
        }
        let first = self.cells.iter().enumerate().find_map(|(row, line)| {
            line.iter()
                .position(Option::is_some)
                .map(|col| Position::new(row, col))
        });
        // Construction guarantees at least one occupied cell.
        if let Some(pos) = first {
            self.cursor.place(pos);
        }
    }
}

impl Movable for Graph {
    fn position(&self) -> Position {
        self.cursor.pos
    }

    fn is_initial_entry(&self) -> bool {
        self.cursor.initial_entry
    }

    fn move_once(&mut self, dir: NavDirection) -> bool {
        if self.cursor.initial_entry {
            self.enter();
            return true;
        }
        match self.current().and_then(|n| n.neighbour(dir)) {
            Some(next) => {
                self.cursor.place(next);
                true
            }
            None => false,
        }
    }

    fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        if self.cursor.initial_entry {
            self.enter();
        }
        match self.current().and_then(|n| n.extreme(dir)) {
            Some(next) => {
                self.cursor.place(next);
                true
            }
            None => false,
        }
    }

    fn move_to_index(&mut self, pos: Position) -> bool {
        if !Self::occupied(&self.cells, pos) {
            return false;
        }
        self.cursor.place(pos);
        true
    }

    fn is_movable(&self, target: MoveTarget) -> bool {
        match target {
            MoveTarget::Index(pos) => Self::occupied(&self.cells, pos),
            MoveTarget::Direction(_) if self.cursor.initial_entry => true,
            MoveTarget::Direction(dir) => self.current().is_some_and(|n| n.neighbour(dir).is_some()),
        }
    }

    fn reset(&mut self) {
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two nodes joined left-right, with a hole at (0, 1).
    fn sparse() -> Graph {
        let a = Position::new(0, 0);
        let b = Position::new(1, 1);
        let cells = vec![
            vec![
                Some(GraphNode {
                    up: Some(b),
                    end: Some(b),
                    ..GraphNode::default()
                }),
                None,
            ],
            vec![
                None,
                Some(GraphNode {
                    down: Some(a),
                    start: Some(a),
                    ..GraphNode::default()
                }),
            ],
        ];
        Graph::new(cells, MovableOptions::default()).unwrap()
    }

    #[test]
    fn rejects_dangling_edges() {
        let cells = vec![vec![Some(GraphNode {
            right: Some(Position::new(0, 1)),
            ..GraphNode::default()
        })]];
        assert!(matches!(
            Graph::new(cells, MovableOptions::default()),
            Err(TopologyError::DanglingEdge { .. })
        ));
        assert_eq!(
            Graph::new(vec![vec![None]], MovableOptions::default()),
            Err(TopologyError::Empty)
        );
    }

    #[test]
    fn entry_prefers_origin_then_first_node() {
        let mut g = sparse();
        assert!(g.move_once(NavDirection::Left));
        assert_eq!(g.position(), Position::new(0, 0));

        let cells = vec![vec![None, Some(GraphNode::default())]];
        let mut g = Graph::new(cells, MovableOptions::default()).unwrap();
        assert!(g.move_once(NavDirection::Up));
        assert_eq!(g.position(), Position::new(0, 1));
    }

    #[test]
    fn missing_neighbour_blocks() {
        let mut g = sparse();
        g.move_once(NavDirection::Up);
        assert!(!g.is_movable(MoveTarget::Direction(NavDirection::Right)));
        assert!(!g.move_once(NavDirection::Right));
        assert_eq!(g.position(), Position::new(0, 0));
        assert!(g.move_once(NavDirection::Up));
        assert_eq!(g.position(), Position::new(1, 1));
    }

    #[test]
    fn extremes_follow_pointers() {
        let mut g = sparse();
        g.move_once(NavDirection::Up);
        assert!(g.move_to_extreme(NavDirection::Right));
        assert_eq!(g.position(), Position::new(1, 1));
        assert!(!g.move_to_extreme(NavDirection::Right));
        assert!(g.move_to_extreme(NavDirection::Left));
        assert_eq!(g.position(), Position::new(0, 0));
    }

    #[test]
    fn index_requires_node() {
        let mut g = sparse();
        assert!(!g.move_to_index(Position::new(0, 1)));
        assert!(g.move_to_index(Position::new(1, 1)));
    }

    #[test]
    fn dense_matches_grid_semantics() {
        let mut g = Graph::dense(2, 3, MovableOptions::default()).unwrap();
        g.move_once(NavDirection::Right);
        g.move_to_extreme(NavDirection::Right);
        assert_eq!(g.position(), Position::new(0, 2));
        assert!(g.move_once(NavDirection::Up));
        assert_eq!(g.position(), Position::new(1, 2));
        assert!(!g.move_once(NavDirection::Up));
    }
}
