#![forbid(unsafe_code)]

//! Figures and subplots.
//!
//! A [`Figure`] is a grid of [`Subplot`]s walked by its own cursor at the
//! subplot level; each subplot stacks one or more layers ([`Trace`]s) of
//! which exactly one is active. Row 0 of the subplot grid is the bottom row,
//! matching trace rows.

use chartnav_core::{
    Grid, Movable, MovableOptions, NavDirection, Panning, Position, SubplotState, TraceKind,
};

use crate::error::{EngineError, Result};
use crate::trace::Trace;

/// One or more overlaid layers.
#[derive(Debug)]
pub struct Subplot {
    layers: Vec<Trace>,
    active: usize,
}

impl Subplot {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without layers.
    pub fn new(layers: Vec<Trace>) -> Result<Self> {
        if layers.is_empty() {
            return Err(EngineError::InvalidData("subplot has no layers".into()));
        }
        Ok(Self { layers, active: 0 })
    }

    #[must_use]
    pub fn single(trace: Trace) -> Self {
        Self {
            layers: vec![trace],
            active: 0,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &[Trace] {
        &self.layers
    }

    /// 0-based index of the active layer.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn active(&self) -> &Trace {
        &self.layers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Trace {
        &mut self.layers[self.active]
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<TraceKind> {
        self.layers.iter().map(Trace::kind).collect()
    }

    /// Activate the next (`Up`) or previous (`Down`) layer.
    pub fn step_layer(&mut self, dir: NavDirection) -> bool {
        let next = match dir {
            NavDirection::Up if self.active + 1 < self.layers.len() => self.active + 1,
            NavDirection::Down if self.active > 0 => self.active - 1,
            _ => return false,
        };
        self.active = next;
        true
    }

    fn focus(&mut self, layer: usize) -> bool {
        if layer < self.layers.len() {
            self.active = layer;
            true
        } else {
            false
        }
    }
}

/// Where a trace lives inside a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLocation {
    pub subplot: Position,
    pub layer: usize,
}

/// A grid of subplots.
#[derive(Debug)]
pub struct Figure {
    id: String,
    title: Option<String>,
    subplots: Vec<Vec<Subplot>>,
    grid: Grid,
}

impl Figure {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] when the layout is empty, a row is empty,
    /// or two traces share an id.
    pub fn new(id: impl Into<String>, subplots: Vec<Vec<Subplot>>) -> Result<Self> {
        let lengths: Vec<usize> = subplots.iter().map(Vec::len).collect();
        let grid = Grid::new(
            lengths,
            MovableOptions {
                start: Position::default(),
                initial_entry: false,
            },
        )?;
        let mut seen = ahash::AHashSet::new();
        for trace in subplots.iter().flatten().flat_map(|s| s.layers.iter()) {
            if !seen.insert(trace.id().to_owned()) {
                return Err(EngineError::InvalidData(format!("duplicate trace id {:?}", trace.id())));
            }
        }
        Ok(Self {
            id: id.into(),
            title: None,
            subplots,
            grid,
        })
    }

    /// A figure of one single-layer subplot.
    ///
    /// # Errors
    ///
    /// As [`Figure::new`].
    pub fn single(id: impl Into<String>, trace: Trace) -> Result<Self> {
        Self::new(id, vec![vec![Subplot::single(trace)]])
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn subplot_count(&self) -> usize {
        self.subplots.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn subplot_position(&self) -> Position {
        self.grid.position()
    }

    #[must_use]
    pub fn subplot(&self) -> &Subplot {
        let Position { row, col } = self.grid.position();
        &self.subplots[row][col]
    }

    pub fn subplot_mut(&mut self) -> &mut Subplot {
        let Position { row, col } = self.grid.position();
        &mut self.subplots[row][col]
    }

    #[must_use]
    pub fn active_trace(&self) -> &Trace {
        self.subplot().active()
    }

    pub fn active_trace_mut(&mut self) -> &mut Trace {
        self.subplot_mut().active_mut()
    }

    #[must_use]
    pub fn is_subplot_movable(&self, dir: NavDirection) -> bool {
        self.grid.is_movable(dir.into())
    }

    pub fn move_subplot(&mut self, dir: NavDirection) -> bool {
        let moved = self.grid.move_once(dir);
        tracing::debug!(figure = %self.id, ?dir, moved, pos = ?self.grid.position(), "subplot move");
        moved
    }

    /// Row-major 1-based index of the active subplot.
    #[must_use]
    pub fn subplot_index(&self) -> usize {
        let Position { row, col } = self.grid.position();
        self.subplots[..row].iter().map(Vec::len).sum::<usize>() + col + 1
    }

    #[must_use]
    pub fn subplot_state(&self) -> SubplotState {
        let Position { row, col } = self.grid.position();
        SubplotState {
            index: self.subplot_index(),
            size: self.subplot_count(),
            kinds: self.subplot().kinds(),
            panning: Panning::new(col, self.subplots[row].len()),
        }
    }

    /// Find a trace by id.
    #[must_use]
    pub fn locate(&self, trace_id: &str) -> Option<TraceLocation> {
        self.subplots.iter().enumerate().find_map(|(row, line)| {
            line.iter().enumerate().find_map(|(col, subplot)| {
                subplot
                    .layers
                    .iter()
                    .position(|t| t.id() == trace_id)
                    .map(|layer| TraceLocation {
                        subplot: Position::new(row, col),
                        layer,
                    })
            })
        })
    }

    #[must_use]
    pub fn trace(&self, trace_id: &str) -> Option<&Trace> {
        let loc = self.locate(trace_id)?;
        self.subplots[loc.subplot.row][loc.subplot.col].layers.get(loc.layer)
    }

    /// Make the trace at `location` the active one.
    pub fn focus(&mut self, location: TraceLocation) -> bool {
        if !self.grid.move_to_index(location.subplot) {
            return false;
        }
        self.subplot_mut().focus(location.layer)
    }

    /// Every trace, subplot by subplot.
    pub fn traces(&self) -> impl Iterator<Item = &Trace> {
        self.subplots.iter().flatten().flat_map(|s| s.layers.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{BarModel, LineModel};

    fn bar(id: &str) -> Trace {
        Trace::new(id, BarModel::single(vec!["a".into(), "b".into()], vec![1.0, 2.0]).unwrap()).unwrap()
    }

    fn line(id: &str) -> Trace {
        Trace::new(id, LineModel::single(vec![(0.0, 1.0), (1.0, 2.0)]).unwrap()).unwrap()
    }

    fn figure() -> Figure {
        Figure::new(
            "fig",
            vec![
                vec![Subplot::new(vec![bar("b0"), line("l0")]).unwrap(), Subplot::single(bar("b1"))],
                vec![Subplot::single(line("l1"))],
            ],
        )
        .unwrap()
    }

    #[test]
    fn subplot_grid_starts_entered() {
        let mut f = figure();
        assert_eq!(f.subplot_position(), Position::new(0, 0));
        assert!(!f.move_subplot(NavDirection::Left));
        assert!(f.move_subplot(NavDirection::Right));
        assert_eq!(f.subplot_index(), 2);
        assert!(f.move_subplot(NavDirection::Up));
        assert_eq!(f.subplot_position(), Position::new(1, 0));
        assert_eq!(f.subplot_index(), 3);
    }

    #[test]
    fn layers_step_within_bounds() {
        let mut f = figure();
        let s = f.subplot_mut();
        assert!(!s.step_layer(NavDirection::Down));
        assert!(s.step_layer(NavDirection::Up));
        assert_eq!(s.active().id(), "l0");
        assert!(!s.step_layer(NavDirection::Up));
    }

    #[test]
    fn locate_and_focus() {
        let mut f = figure();
        let loc = f.locate("l1").unwrap();
        assert_eq!(loc.subplot, Position::new(1, 0));
        assert!(f.focus(loc));
        assert_eq!(f.active_trace().id(), "l1");
        assert!(f.locate("nope").is_none());
    }

    #[test]
    fn subplot_state_lists_kinds() {
        let f = figure();
        let state = f.subplot_state();
        assert_eq!(state.kinds, vec![TraceKind::Bar, TraceKind::Line]);
        assert_eq!((state.index, state.size), (1, 3));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Figure::new("f", vec![vec![Subplot::single(bar("x")), Subplot::single(bar("x"))]]);
        assert!(matches!(err, Err(EngineError::InvalidData(_))));
    }
}
