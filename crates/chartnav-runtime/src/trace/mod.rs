#![forbid(unsafe_code)]

//! Traces: one chart layer with its own cursor.
//!
//! A [`Trace`] pairs a [`TraceModel`] (the data of one chart kind and how to
//! describe it) with the [`Topology`] its cursor walks. Movement is delegated
//! to the topology; every description is derived from the model at the
//! current position, so there is no cached per-point state to go stale.
//!
//! # Invariants
//!
//! 1. The topology is built by the model once and never replaced, except by
//!    a committed lookahead during [`Trace::seek`].
//! 2. A failed move leaves the position unchanged.
//! 3. The braille series is computed once, at construction.
//!
//! # Models
//!
//! | Model | Topology | Rows | Columns |
//! |-------|----------|------|---------|
//! | [`BarModel`] | grid | series | categories |
//! | [`LineModel`] | jagged grid | lines | points |
//! | [`HeatmapModel`] | grid | y labels | x labels |
//! | [`BoxModel`] | grid | boxes | sections |
//! | [`CandlestickModel`] | graph | value rank | candles |
//! | [`ScatterModel`] | plane | distinct y | distinct x |
//! | [`SmoothModel`] | jagged grid | curves | points |
//! | [`ViolinModel`] | plane | density levels | violins |
//! | [`SegmentedModel`] | grid | levels, then sum | categories |

mod bar;
mod boxplot;
mod candlestick;
mod heatmap;
mod line;
mod scatter;
mod segmented;
mod smooth;
mod violin;

pub use bar::{BarModel, BarSeries};
pub use boxplot::BoxModel;
pub use candlestick::{Candle, CandlestickModel};
pub use heatmap::HeatmapModel;
pub use line::{LineModel, LineSeries};
pub use scatter::ScatterModel;
pub use segmented::{SUM_LEVEL, SegmentedModel};
pub use smooth::SmoothModel;
pub use violin::{DEFAULT_LEVELS, Violin, ViolinModel};

use std::fmt;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use chartnav_core::{
    AudioCue, AxisLabels, BrailleCue, BrailleSeries, MoveTarget, Movable, NavDirection, Point,
    Position, Selector, TextCue, Topology, TraceKind, TraceState, Value, ValueRange,
};

use crate::error::Result;

/// Upper bound on lookahead steps; plane toggles can otherwise cycle.
const STEP_LIMIT: usize = 100_000;

/// Everything a model says about one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub point: Point,
    pub audio: AudioCue,
    pub text: TextCue,
}

/// A one-dimensional run of values through the trace, with the position of
/// each value. Extrema and line sweeps walk lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Stable identifier of the line inside its trace (usually the row).
    pub key: usize,
    pub values: Vec<f64>,
    pub positions: Vec<Position>,
}

impl Line {
    /// Observed range, `None` when the line has no finite value.
    #[must_use]
    pub fn range(&self) -> Option<ValueRange> {
        ValueRange::of(&self.values).ok()
    }
}

/// Data of one chart kind.
pub trait TraceModel: fmt::Debug {
    fn kind(&self) -> TraceKind;

    /// Fresh topology over the data, cursor before initial entry.
    ///
    /// # Errors
    ///
    /// Topology construction errors for data without positions.
    fn topology(&self) -> Result<Topology>;

    /// Describe the datum at the topology's position.
    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description;

    /// Whole-series data for braille output, if the kind has one.
    fn braille(&self) -> Option<BrailleSeries> {
        None
    }

    /// Whether any cell holds several values.
    fn multi_valued(&self) -> bool {
        false
    }

    /// Main-axis key at `pos`, used to keep the x position across layers.
    fn x_value(&self, topology: &Topology) -> Option<Value>;

    /// Position whose main-axis key equals `x`, preferring `row`.
    fn locate_x(&self, x: &Value, row: usize) -> Option<Position>;

    /// The line through `pos`.
    fn line(&self, topology: &Topology) -> Option<Line>;

    /// Scalar value at `pos`; `None` for multi-value or missing cells.
    fn value_at(&self, topology: &Topology, pos: Position) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// One navigable chart layer.
pub struct Trace {
    id: String,
    title: Option<String>,
    axes: AxisLabels,
    model: Box<dyn TraceModel>,
    topology: Topology,
    selectors: AHashMap<Position, Vec<Selector>>,
    braille: Option<Arc<BrailleSeries>>,
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("id", &self.id)
            .field("kind", &self.model.kind())
            .field("position", &self.topology.position())
            .finish_non_exhaustive()
    }
}

impl Trace {
    /// Build a trace over `model`.
    ///
    /// # Errors
    ///
    /// Propagates the model's topology error.
    pub fn new(id: impl Into<String>, model: impl TraceModel + 'static) -> Result<Self> {
        let topology = model.topology()?;
        let braille = model.braille().map(Arc::new);
        Ok(Self {
            id: id.into(),
            title: None,
            axes: AxisLabels::default(),
            model: Box::new(model),
            topology,
            selectors: AHashMap::new(),
            braille,
        })
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.axes.x = x.into();
        self.axes.y = y.into();
        self
    }

    #[must_use]
    pub fn with_fill_label(mut self, fill: impl Into<String>) -> Self {
        self.axes.fill = Some(fill.into());
        self
    }

    /// Bind element selectors to the datum at `pos`.
    #[must_use]
    pub fn with_selectors(mut self, pos: Position, selectors: Vec<Selector>) -> Self {
        self.selectors.insert(pos, selectors);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> TraceKind {
        self.model.kind()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn axes(&self) -> &AxisLabels {
        &self.axes
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.topology.position()
    }

    #[must_use]
    pub fn is_initial_entry(&self) -> bool {
        self.topology.is_initial_entry()
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    pub fn move_once(&mut self, dir: NavDirection) -> bool {
        let moved = self.topology.move_once(dir);
        tracing::debug!(
            trace_id = %self.id,
            ?dir,
            moved,
            row = self.position().row,
            col = self.position().col,
            "trace move"
        );
        moved
    }

    pub fn move_up(&mut self) -> bool {
        self.move_once(NavDirection::Up)
    }

    pub fn move_down(&mut self) -> bool {
        self.move_once(NavDirection::Down)
    }

    pub fn move_left(&mut self) -> bool {
        self.move_once(NavDirection::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_once(NavDirection::Right)
    }

    pub fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        let moved = self.topology.move_to_extreme(dir);
        tracing::debug!(trace_id = %self.id, ?dir, moved, "trace move to extreme");
        moved
    }

    /// Validate `(row, col)`, then move there. Invalid indices never clamp.
    pub fn move_to_index(&mut self, row: usize, col: usize) -> bool {
        let moved = self.topology.move_to_index(Position::new(row, col));
        tracing::debug!(trace_id = %self.id, row, col, moved, "trace move to index");
        moved
    }

    #[must_use]
    pub fn is_movable(&self, target: impl Into<MoveTarget>) -> bool {
        self.topology.is_movable(target.into())
    }

    /// Resolve initial entry without a directional step. Returns whether
    /// entry happened.
    pub fn enter(&mut self) -> bool {
        if self.topology.is_initial_entry() {
            self.topology.move_once(NavDirection::Right)
        } else {
            false
        }
    }

    /// Back to the start, re-arming initial entry.
    pub fn reset(&mut self) {
        self.topology.reset();
    }

    /// Step in `dir` until a position satisfies `accept`, skipping the rest.
    ///
    /// Commits only on success; otherwise the cursor stays put.
    pub fn seek(&mut self, dir: NavDirection, mut accept: impl FnMut(f64) -> bool) -> bool {
        let mut ahead = self.topology.clone();
        let mut visited = AHashSet::new();
        visited.insert(ahead.position());
        for _ in 0..STEP_LIMIT {
            if !ahead.move_once(dir) {
                return false;
            }
            let pos = ahead.position();
            if !visited.insert(pos) {
                return false;
            }
            if self.model.value_at(&ahead, pos).is_some_and(&mut accept) {
                tracing::debug!(trace_id = %self.id, ?dir, row = pos.row, col = pos.col, "seek hit");
                self.topology = ahead;
                return true;
            }
        }
        false
    }

    /// Number of steps available from the cursor towards `dir`.
    #[must_use]
    pub fn steps_towards(&self, dir: NavDirection) -> usize {
        let mut ahead = self.topology.clone();
        let mut visited = AHashSet::new();
        visited.insert(ahead.position());
        let mut steps = 0;
        while steps < STEP_LIMIT && ahead.move_once(dir) && visited.insert(ahead.position()) {
            steps += 1;
        }
        steps
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn describe(&self) -> Description {
        self.model.describe(&self.topology, &self.axes)
    }

    #[must_use]
    pub fn point(&self) -> Point {
        self.describe().point
    }

    /// Full state for the observers.
    #[must_use]
    pub fn state(&self) -> TraceState {
        self.state_of(&self.topology)
    }

    /// State the trace would have at `(row, col)`, without moving.
    #[must_use]
    pub fn state_at(&self, row: usize, col: usize) -> Option<TraceState> {
        let mut ahead = self.topology.clone();
        ahead
            .move_to_index(Position::new(row, col))
            .then(|| self.state_of(&ahead))
    }

    fn state_of(&self, topology: &Topology) -> TraceState {
        let position = topology.position();
        let Description { point, audio, text } = self.model.describe(topology, &self.axes);
        TraceState {
            trace_id: self.id.clone(),
            kind: self.kind(),
            title: self.title.clone(),
            axes: self.axes.clone(),
            position,
            point,
            audio,
            text,
            braille: self.braille.as_ref().map(|series| BrailleCue {
                trace_id: self.id.clone(),
                position,
                series: Arc::clone(series),
            }),
            highlight: self.selectors.get(&position).cloned().unwrap_or_default(),
        }
    }

    /// Scalar value under the cursor.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.model.value_at(&self.topology, self.position())
    }

    #[must_use]
    pub fn x_value(&self) -> Option<Value> {
        self.model.x_value(&self.topology)
    }

    /// Move to the datum sharing main-axis key `x`.
    pub fn move_to_x_value(&mut self, x: &Value) -> bool {
        let row = self.position().row;
        match self.model.locate_x(x, row) {
            Some(pos) => self.move_to_index(pos.row, pos.col),
            None => false,
        }
    }

    #[must_use]
    pub fn line(&self) -> Option<Line> {
        self.model.line(&self.topology)
    }

    #[must_use]
    pub fn multi_valued(&self) -> bool {
        self.model.multi_valued()
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the models
// ---------------------------------------------------------------------------

/// Label of the fill reading, falling back to `default`.
pub(crate) fn fill_label(axes: &AxisLabels, default: &str) -> String {
    axes.fill.clone().unwrap_or_else(|| default.to_owned())
}

/// Range over every finite value, or the unit range when there is none.
pub(crate) fn range_or_unit(values: impl IntoIterator<Item = f64>) -> ValueRange {
    let flat: Vec<f64> = values.into_iter().collect();
    ValueRange::of(&flat).unwrap_or(ValueRange::new(0.0, 1.0))
}

pub(crate) fn category(labels: &[String], index: usize) -> Value {
    labels
        .get(index)
        .map_or(Value::Missing, |s| Value::Category(s.clone()))
}

/// Index of a category key in `labels`.
pub(crate) fn category_index(labels: &[String], x: &Value) -> Option<usize> {
    match x {
        Value::Category(s) => labels.iter().position(|l| l == s),
        _ => None,
    }
}
