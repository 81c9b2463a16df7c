#![forbid(unsafe_code)]

//! Rectangular or jagged grid.
//!
//! Rows may differ in length. Moving between rows keeps the column when the
//! target row is long enough and clamps it to the row's last cell otherwise,
//! so the cursor always rests on a real cell.

use super::{Cursor, Movable, MovableOptions};
use crate::direction::{MoveTarget, NavDirection, Position};
use crate::error::TopologyError;

/// Grid topology described by its row lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    row_lengths: Vec<usize>,
    cursor: Cursor,
}

impl Grid {
    /// Build a grid from per-row cell counts.
    ///
    /// # Errors
    ///
    /// [`TopologyError::Empty`] without rows and [`TopologyError::EmptyRow`]
    /// when a row has no cells.
    pub fn new(row_lengths: Vec<usize>, options: MovableOptions) -> Result<Self, TopologyError> {
        if row_lengths.is_empty() {
            return Err(TopologyError::Empty);
        }
        if let Some(row) = row_lengths.iter().position(|&len| len == 0) {
            return Err(TopologyError::EmptyRow { row });
        }
        Ok(Self {
            row_lengths,
            cursor: Cursor::new(options),
        })
    }

    /// Convenience constructor for `rows × cols`.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::new`].
    pub fn rectangular(rows: usize, cols: usize, options: MovableOptions) -> Result<Self, TopologyError> {
        Self::new(vec![cols; rows], options)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.row_lengths.len()
    }

    #[must_use]
    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.row_lengths.get(row).copied()
    }

    fn last_row(&self) -> usize {
        self.row_lengths.len() - 1
    }

    fn last_col(&self, row: usize) -> usize {
        self.row_lengths.get(row).map_or(0, |len| len.saturating_sub(1))
    }

    fn enter(&mut self) {
        let row = self.cursor.pos.row.min(self.last_row());
        let col = self.cursor.pos.col.min(self.last_col(row));
        self.cursor.place(Position::new(row, col));
    }

    fn contains(&self, pos: Position) -> bool {
        self.row_lengths.get(pos.row).is_some_and(|&len| pos.col < len)
    }
}

impl Movable for Grid {
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
        if !self.is_movable(MoveTarget::Direction(dir)) {
            return false;
        }
        let Some(mut next) = dir.step(self.cursor.pos) else {
            return false;
        };
        next.col = next.col.min(self.last_col(next.row));
        self.cursor.place(next);
        true
    }

    fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        if self.cursor.initial_entry {
            self.enter();
        }
        let Position { row, col } = self.cursor.pos;
        let next = match dir {
            NavDirection::Up => {
                let row = self.last_row();
                Position::new(row, col.min(self.last_col(row)))
            }
            NavDirection::Down => Position::new(0, col.min(self.last_col(0))),
            NavDirection::Right => Position::new(row, self.last_col(row)),
            NavDirection::Left => Position::new(row, 0),
        };
        self.cursor.place(next);
        true
    }

    fn move_to_index(&mut self, pos: Position) -> bool {
        if !self.contains(pos) {
            return false;
        }
        self.cursor.place(pos);
        true
    }

    fn is_movable(&self, target: MoveTarget) -> bool {
        match target {
            MoveTarget::Index(pos) => self.contains(pos),
            MoveTarget::Direction(_) if self.cursor.initial_entry => true,
            MoveTarget::Direction(dir) => {
                let Position { row, col } = self.cursor.pos;
                match dir {
                    NavDirection::Up => row < self.last_row(),
                    NavDirection::Down => row > 0,
                    NavDirection::Right => col < self.last_col(row),
                    NavDirection::Left => col > 0,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entered(rows: Vec<usize>) -> Grid {
        let mut g = Grid::new(rows, MovableOptions::default()).unwrap();
        assert!(g.move_once(NavDirection::Right));
        g
    }

    #[test]
    fn rejects_empty_shapes() {
        assert_eq!(
            Grid::new(vec![], MovableOptions::default()),
            Err(TopologyError::Empty)
        );
        assert_eq!(
            Grid::new(vec![2, 0], MovableOptions::default()),
            Err(TopologyError::EmptyRow { row: 1 })
        );
    }

    #[test]
    fn initial_entry_clamps_seed() {
        let mut g = Grid::new(vec![3, 2], MovableOptions::starting_at(9, 9)).unwrap();
        assert!(g.move_once(NavDirection::Left));
        assert_eq!(g.position(), Position::new(1, 1));
        assert!(!g.is_initial_entry());
    }

    #[test]
    fn boundary_is_noop() {
        let mut g = entered(vec![3]);
        assert!(!g.move_once(NavDirection::Left));
        assert!(!g.move_once(NavDirection::Down));
        assert!(!g.move_once(NavDirection::Up));
        assert_eq!(g.position(), Position::new(0, 0));
    }

    #[test]
    fn up_increments_row_and_clamps_col() {
        let mut g = entered(vec![4, 2]);
        assert!(g.move_to_extreme(NavDirection::Right));
        assert_eq!(g.position(), Position::new(0, 3));
        assert!(g.move_once(NavDirection::Up));
        assert_eq!(g.position(), Position::new(1, 1));
    }

    #[test]
    fn extremes() {
        let mut g = entered(vec![3, 3, 3]);
        g.move_to_extreme(NavDirection::Up);
        g.move_to_extreme(NavDirection::Right);
        assert_eq!(g.position(), Position::new(2, 2));
        g.move_to_extreme(NavDirection::Down);
        g.move_to_extreme(NavDirection::Left);
        assert_eq!(g.position(), Position::new(0, 0));
    }

    #[test]
    fn index_validation_uses_target_row() {
        let mut g = entered(vec![1, 5]);
        assert!(g.is_movable(MoveTarget::Index(Position::new(1, 4))));
        assert!(!g.is_movable(MoveTarget::Index(Position::new(0, 4))));
        assert!(!g.move_to_index(Position::new(2, 0)));
        assert_eq!(g.position(), Position::new(0, 0));
        assert!(g.move_to_index(Position::new(1, 4)));
        assert_eq!(g.position(), Position::new(1, 4));
    }

    #[test]
    fn move_to_index_ends_entry() {
        let mut g = Grid::rectangular(2, 2, MovableOptions::default()).unwrap();
        assert!(g.move_to_index(Position::new(1, 1)));
        assert!(!g.is_initial_entry());
        assert!(g.move_once(NavDirection::Left));
        assert_eq!(g.position(), Position::new(1, 0));
    }
}
