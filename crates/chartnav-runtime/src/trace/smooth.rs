#![forbid(unsafe_code)]

//! Smoothed curves: a line chart voiced as a continuous glide.
//!
//! Navigation and text follow [`LineModel`]. Each point is voiced as a short
//! glide through its neighbours `[prev, curr, next]`, scaled against its own
//! curve's range, and a sweep plays the whole curve as one voice. Curves do
//! not report intersections.

use chartnav_core::{
    AxisLabels, BrailleSeries, Movable, Position, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, LineModel, LineSeries, TraceModel, range_or_unit};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothModel {
    line: LineModel,
}

impl SmoothModel {
    /// # Errors
    ///
    /// As [`LineModel::new`].
    pub fn new(series: Vec<LineSeries>) -> Result<Self> {
        Ok(Self {
            line: LineModel::new(series)?,
        })
    }

    /// A single unnamed curve.
    ///
    /// # Errors
    ///
    /// As [`LineModel::new`].
    pub fn single(points: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(vec![LineSeries { name: None, points }])
    }
}

/// `[prev, curr, next]` around `col`, clamped at the ends.
fn neighbourhood(values: &[f64], col: usize) -> Option<Vec<f64>> {
    let last = values.len().checked_sub(1)?;
    let at = |i: usize| values[i.min(last)];
    Some(vec![at(col.saturating_sub(1)), at(col), at(col + 1)])
}

impl TraceModel for SmoothModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Smooth
    }

    fn topology(&self) -> Result<Topology> {
        self.line.topology()
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let mut description = self.line.describe_at(pos, axes, Vec::new());
        let Some(values) = self.line.row_values(pos.row) else {
            return description;
        };
        if let Some(around) = neighbourhood(&values, pos.col) {
            description.audio.value = Value::Numbers(around);
            description.audio.range = row_range(&values);
            description.audio.continuous = true;
        }
        description
    }

    fn braille(&self) -> Option<BrailleSeries> {
        self.line.braille()
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.line.x_value(topology)
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        self.line.locate_x(x, row)
    }

    fn line(&self, topology: &Topology) -> Option<Line> {
        self.line.line(topology)
    }

    fn value_at(&self, topology: &Topology, pos: Position) -> Option<f64> {
        self.line.value_at(topology, pos)
    }
}

fn row_range(values: &[f64]) -> ValueRange {
    range_or_unit(values.iter().copied())
}
