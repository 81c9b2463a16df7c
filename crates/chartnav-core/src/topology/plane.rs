#![forbid(unsafe_code)]

//! Dual-mode x/y plane for scatter data.
//!
//! The plane keeps two views of the same points: columns (one per distinct
//! x, listing its y values) and rows (one per distinct y, listing its x
//! values). In [`PlaneMode::Col`] left/right walk the columns; in
//! [`PlaneMode::Row`] up/down walk the rows. Stepping onto a new column or
//! row keeps the cursor's cross value when the new list holds it and
//! otherwise anchors on the median of that list. A move orthogonal to the
//! mode toggles the mode and keeps the point under the cursor, which lies in
//! both views, so two toggles return to the start.
//!
//! `row` and `col` are always global indices into the row and column views,
//! and the pair always names an existing point.

use super::{Cursor, Movable, MovableOptions};
use crate::direction::{MoveTarget, NavDirection, Position};
use crate::error::TopologyError;

/// Which view directional input walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaneMode {
    /// Rows (distinct y values); up/down step.
    Row,
    /// Columns (distinct x values); left/right step.
    #[default]
    Col,
}

/// All y values observed at one x.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneColumn {
    pub x: f64,
    pub ys: Vec<f64>,
}

/// All x values observed at one y.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneRow {
    pub y: f64,
    pub xs: Vec<f64>,
}

/// Plane topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    mode: PlaneMode,
    columns: Vec<PlaneColumn>,
    rows: Vec<PlaneRow>,
    x_values: Vec<f64>,
    y_values: Vec<f64>,
    cursor: Cursor,
}

impl Plane {
    /// Build a plane from prepared column and row views.
    ///
    /// # Errors
    ///
    /// [`TopologyError::Empty`] when either view is empty or a column/row
    /// lists no cross values.
    pub fn new(
        columns: Vec<PlaneColumn>,
        rows: Vec<PlaneRow>,
        options: MovableOptions,
    ) -> Result<Self, TopologyError> {
        if columns.is_empty()
            || rows.is_empty()
            || columns.iter().any(|c| c.ys.is_empty())
            || rows.iter().any(|r| r.xs.is_empty())
        {
            return Err(TopologyError::Empty);
        }
        let x_values = columns.iter().map(|c| c.x).collect();
        let y_values = rows.iter().map(|r| r.y).collect();
        Ok(Self {
            mode: PlaneMode::Col,
            columns,
            rows,
            x_values,
            y_values,
            cursor: Cursor::new(options),
        })
    }

    /// Build both views from raw `(x, y)` pairs. Non-finite pairs are skipped.
    ///
    /// # Errors
    ///
    /// [`TopologyError::Empty`] when no finite pair remains.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, TopologyError> {
        let mut by_x: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        by_x.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        by_x.dedup();

        let mut by_y: Vec<(f64, f64)> = by_x.iter().map(|&(x, y)| (y, x)).collect();
        by_y.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let columns = group(&by_x)
            .into_iter()
            .map(|(x, ys)| PlaneColumn { x, ys })
            .collect();
        let rows = group(&by_y)
            .into_iter()
            .map(|(y, xs)| PlaneRow { y, xs })
            .collect();
        Self::new(columns, rows, MovableOptions::default())
    }

    #[must_use]
    pub fn mode(&self) -> PlaneMode {
        self.mode
    }

    #[must_use]
    pub fn columns(&self) -> &[PlaneColumn] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[PlaneRow] {
        &self.rows
    }

    /// Column under the cursor.
    #[must_use]
    pub fn current_column(&self) -> Option<&PlaneColumn> {
        self.columns.get(self.cursor.pos.col)
    }

    /// Row under the cursor.
    #[must_use]
    pub fn current_row(&self) -> Option<&PlaneRow> {
        self.rows.get(self.cursor.pos.row)
    }

    /// Whether `(y_values[row], x_values[col])` is one of the points.
    fn holds(&self, pos: Position) -> bool {
        match (self.columns.get(pos.col), self.y_values.get(pos.row)) {
            (Some(column), Some(y)) => column.ys.binary_search_by(|v| v.total_cmp(y)).is_ok(),
            _ => false,
        }
    }

    /// Cursor on column `col`: the current y if the column holds it, the
    /// median of its ys otherwise.
    fn column_anchor(&self, col: usize) -> Position {
        let kept = Position::new(self.cursor.pos.row, col);
        if self.holds(kept) {
            return kept;
        }
        let mid = median_of(&self.columns[col].ys);
        Position::new(index_of(&self.y_values, mid), col)
    }

    /// Cursor on row `row`: the current x if the row holds it, the median
    /// of its xs otherwise.
    fn row_anchor(&self, row: usize) -> Position {
        let kept = Position::new(row, self.cursor.pos.col);
        if self.holds(kept) {
            return kept;
        }
        let mid = median_of(&self.rows[row].xs);
        Position::new(row, index_of(&self.x_values, mid))
    }

    fn toggle(&mut self) {
        let pos = self.cursor.pos;
        self.mode = match self.mode {
            PlaneMode::Col => PlaneMode::Row,
            PlaneMode::Row => PlaneMode::Col,
        };
        if !self.holds(pos) {
            let anchored = match self.mode {
                PlaneMode::Row => self.column_anchor(pos.col.min(self.columns.len() - 1)),
                PlaneMode::Col => self.row_anchor(pos.row.min(self.rows.len() - 1)),
            };
            self.cursor.place(anchored);
        }
        tracing::trace!(mode = ?self.mode, pos = ?self.cursor.pos, "plane mode toggled");
    }

    /// Index of the cursor's point within the current column (col mode) or
    /// row (row mode).
    #[must_use]
    pub fn member_index(&self) -> Option<usize> {
        let Position { row, col } = self.cursor.pos;
        match self.mode {
            PlaneMode::Col => {
                let y = self.y_values.get(row)?;
                self.columns.get(col)?.ys.binary_search_by(|v| v.total_cmp(y)).ok()
            }
            PlaneMode::Row => {
                let x = self.x_values.get(col)?;
                self.rows.get(row)?.xs.binary_search_by(|v| v.total_cmp(x)).ok()
            }
        }
    }

    fn enter(&mut self) {
        let seed = self.cursor.pos;
        match self.mode {
            PlaneMode::Col => {
                let col = seed.col.min(self.columns.len() - 1);
                let ys = &self.columns[col].ys;
                let local = seed.row.min(ys.len() - 1);
                let row = index_of(&self.y_values, ys[local]);
                self.cursor.place(Position::new(row, col));
            }
            PlaneMode::Row => {
                let row = seed.row.min(self.rows.len() - 1);
                let xs = &self.rows[row].xs;
                let local = seed.col.min(xs.len() - 1);
                let col = index_of(&self.x_values, xs[local]);
                self.cursor.place(Position::new(row, col));
            }
        }
    }
}

impl Movable for Plane {
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
        let Position { row, col } = self.cursor.pos;
        let next = match (self.mode, dir) {
            (PlaneMode::Col, NavDirection::Right) => self.column_anchor(col + 1),
            (PlaneMode::Col, NavDirection::Left) => self.column_anchor(col - 1),
            (PlaneMode::Row, NavDirection::Up) => self.row_anchor(row + 1),
            (PlaneMode::Row, NavDirection::Down) => self.row_anchor(row - 1),
            _ => {
                self.toggle();
                return true;
            }
        };
        self.cursor.place(next);
        true
    }

    fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        if self.cursor.initial_entry {
            self.enter();
        }
        let orthogonal = matches!(
            (self.mode, dir),
            (PlaneMode::Col, NavDirection::Up | NavDirection::Down)
                | (PlaneMode::Row, NavDirection::Left | NavDirection::Right)
        );
        if orthogonal {
            self.toggle();
        }
        let next = match dir {
            NavDirection::Up => self.row_anchor(self.rows.len() - 1),
            NavDirection::Down => self.row_anchor(0),
            NavDirection::Right => self.column_anchor(self.columns.len() - 1),
            NavDirection::Left => self.column_anchor(0),
        };
        self.cursor.place(next);
        true
    }

    fn move_to_index(&mut self, pos: Position) -> bool {
        if !self.is_movable(MoveTarget::Index(pos)) {
            return false;
        }
        self.cursor.place(pos);
        true
    }

    fn is_movable(&self, target: MoveTarget) -> bool {
        match target {
            MoveTarget::Index(pos) => self.holds(pos),
            MoveTarget::Direction(_) if self.cursor.initial_entry => true,
            MoveTarget::Direction(dir) => {
                let Position { row, col } = self.cursor.pos;
                match (self.mode, dir) {
                    (PlaneMode::Col, NavDirection::Right) => col + 1 < self.columns.len(),
                    (PlaneMode::Col, NavDirection::Left) => col > 0,
                    (PlaneMode::Row, NavDirection::Up) => row + 1 < self.rows.len(),
                    (PlaneMode::Row, NavDirection::Down) => row > 0,
                    _ => true,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.mode = PlaneMode::Col;
        self.cursor.reset();
    }
}

/// Group sorted `(key, value)` pairs by key.
fn group(sorted: &[(f64, f64)]) -> Vec<(f64, Vec<f64>)> {
    let mut out: Vec<(f64, Vec<f64>)> = Vec::new();
    for &(key, value) in sorted {
        match out.last_mut() {
            Some((last, values)) if *last == key => values.push(value),
            _ => out.push((key, vec![value])),
        }
    }
    out
}

/// `list[len / 2]`: upper median for even lengths.
fn median_of(list: &[f64]) -> f64 {
    list.get(list.len() / 2).copied().unwrap_or(f64::NAN)
}

/// Exact index of `value`, falling back to the nearest entry.
fn index_of(values: &[f64], value: f64) -> usize {
    if let Some(i) = values.iter().position(|&v| v == value) {
        return i;
    }
    values
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - value).abs().total_cmp(&(b.1 - value).abs()))
        .map_or(0, |(i, _)| i)
}
