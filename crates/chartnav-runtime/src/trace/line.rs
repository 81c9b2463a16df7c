#![forbid(unsafe_code)]

//! Line charts. Each line is a row; rows may differ in length.
//!
//! Where several lines pass through the same `(x, y)` the point is an
//! intersection: the cue lists every line meeting there and the text names
//! them, the line under the cursor first.

use chartnav_core::{
    AudioCue, AxisLabels, BrailleSeries, Grid, Labeled, Movable, MovableOptions, Panning, Point,
    Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, fill_label, range_or_unit};
use crate::error::{EngineError, Result};

/// One line of `(x, y)` points, in x order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: Option<String>,
    pub points: Vec<(f64, f64)>,
}

impl LineSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: Some(name.into()),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineModel {
    series: Vec<LineSeries>,
    range: ValueRange,
}

impl LineModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without series or with an empty line.
    pub fn new(series: Vec<LineSeries>) -> Result<Self> {
        if series.is_empty() {
            return Err(EngineError::InvalidData("line chart has no series".into()));
        }
        if let Some(row) = series.iter().position(|s| s.points.is_empty()) {
            return Err(EngineError::InvalidData(format!("line {row} has no points")));
        }
        let range = range_or_unit(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
        Ok(Self { series, range })
    }

    /// A single unnamed line.
    ///
    /// # Errors
    ///
    /// As [`LineModel::new`].
    pub fn single(points: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(vec![LineSeries { name: None, points }])
    }

    fn grouped(&self) -> bool {
        self.series.len() > 1
    }

    fn point(&self, pos: Position) -> Option<(f64, f64)> {
        self.series.get(pos.row)?.points.get(pos.col).copied()
    }

    /// Y values of line `row`.
    pub(super) fn row_values(&self, row: usize) -> Option<Vec<f64>> {
        self.series.get(row).map(|s| s.points.iter().map(|p| p.1).collect())
    }

    fn series_label(&self, row: usize) -> String {
        self.series
            .get(row)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| format!("l{}", row + 1))
    }

    /// Rows of every line through the point at `pos`, `pos.row` first.
    /// Empty unless at least two lines meet there.
    #[must_use]
    pub fn intersections(&self, pos: Position) -> Vec<usize> {
        let Some(here) = self.point(pos) else {
            return Vec::new();
        };
        let others = (0..self.series.len())
            .filter(|&r| r != pos.row && self.series[r].points.contains(&here));
        let rows: Vec<usize> = std::iter::once(pos.row).chain(others).collect();
        if rows.len() > 1 { rows } else { Vec::new() }
    }

    /// Description of the point at `pos`, given the lines meeting there.
    pub(super) fn describe_at(
        &self,
        pos: Position,
        axes: &AxisLabels,
        intersections: Vec<usize>,
    ) -> Description {
        let (x, y) = self
            .point(pos)
            .map_or((Value::Missing, Value::Missing), |(x, y)| (Value::Number(x), Value::Number(y)));
        let series = self.series.get(pos.row);
        let name = series.and_then(|s| s.name.clone());
        let size = series.map_or(1, |s| s.points.len());

        let mut point = Point::new(x.clone()).with_secondary(y.clone());
        if let Some(name) = &name {
            point = point.with_group(name.clone());
        }
        let fill = if intersections.is_empty() {
            match (self.grouped(), name) {
                (true, Some(name)) => Some(Labeled::new(fill_label(axes, "Group"), name.as_str())),
                _ => None,
            }
        } else {
            let names: Vec<String> = intersections.iter().map(|&r| self.series_label(r)).collect();
            Some(Labeled::new(
                fill_label(axes, "Group"),
                format!("intersection at ({})", names.join(", ")),
            ))
        };
        Description {
            point,
            audio: AudioCue {
                value: y.clone(),
                range: self.range,
                panning: Panning::new(pos.col, size),
                group: self.grouped().then_some(pos.row),
                segment: Segment::Datum,
                multi_valued: false,
                intersections,
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), x),
                cross: Labeled::new(axes.y.clone(), y),
                fill,
                section: None,
                range: None,
            },
        }
    }
}

impl TraceModel for LineModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Line
    }

    fn topology(&self) -> Result<Topology> {
        let lengths = self.series.iter().map(|s| s.points.len()).collect();
        Ok(Grid::new(lengths, MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        self.describe_at(pos, axes, self.intersections(pos))
    }

    fn braille(&self) -> Option<BrailleSeries> {
        Some(BrailleSeries::Line {
            rows: self
                .series
                .iter()
                .map(|s| s.points.iter().map(|p| p.1).collect())
                .collect(),
        })
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.point(topology.position()).map(|(x, _)| Value::Number(x))
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let x = x.as_f64()?;
        let preferred = row.min(self.series.len() - 1);
        let find = |r: usize| {
            self.series[r]
                .points
                .iter()
                .position(|p| p.0 == x)
                .map(|c| Position::new(r, c))
        };
        find(preferred).or_else(|| (0..self.series.len()).find_map(find))
    }

    fn line(&self, topology: &Topology) -> Option<Line> {
        let row = topology.position().row;
        let series = self.series.get(row)?;
        Some(Line {
            key: row,
            values: series.points.iter().map(|p| p.1).collect(),
            positions: (0..series.points.len()).map(|col| Position::new(row, col)).collect(),
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        self.point(pos).map(|p| p.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::NavDirection;

    fn model() -> LineModel {
        LineModel::new(vec![
            LineSeries::new("a", vec![(1.0, 10.0), (2.0, 20.0), (3.0, 15.0)]),
            LineSeries::new("b", vec![(2.0, 5.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn jagged_rows_clamp_column() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_to_index(Position::new(0, 2));
        assert!(topo.move_once(NavDirection::Up));
        assert_eq!(topo.position(), Position::new(1, 0));
    }

    #[test]
    fn describes_point_with_group() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_to_index(Position::new(0, 1));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.point.value, Value::Number(2.0));
        assert_eq!(d.audio.value, Value::Number(20.0));
        assert_eq!(d.audio.panning, Panning::new(1, 3));
        assert_eq!(d.text.fill, Some(Labeled::new("Group", "a")));
    }

    #[test]
    fn locate_x_prefers_row_then_falls_back() {
        let m = model();
        assert_eq!(m.locate_x(&Value::Number(2.0), 1), Some(Position::new(1, 0)));
        assert_eq!(m.locate_x(&Value::Number(3.0), 1), Some(Position::new(0, 2)));
        assert_eq!(m.locate_x(&Value::Number(9.0), 0), None);
    }

    #[test]
    fn crossing_lines_report_an_intersection() {
        let m = LineModel::new(vec![
            LineSeries::new("up", vec![(0.0, 0.0), (1.0, 5.0), (2.0, 10.0)]),
            LineSeries::new("down", vec![(0.0, 10.0), (1.0, 5.0), (2.0, 0.0)]),
            LineSeries {
                name: None,
                points: vec![(1.0, 5.0)],
            },
        ])
        .unwrap();
        let mut topo = m.topology().unwrap();
        topo.move_to_index(Position::new(1, 1));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.audio.intersections, vec![1, 0, 2]);
        assert_eq!(
            d.text.fill,
            Some(Labeled::new("Group", "intersection at (down, up, l3)"))
        );

        topo.move_to_index(Position::new(0, 2));
        let d = m.describe(&topo, &AxisLabels::default());
        assert!(d.audio.intersections.is_empty());
        assert_eq!(d.text.fill, Some(Labeled::new("Group", "up")));
    }

    #[test]
    fn same_x_different_y_is_not_an_intersection() {
        let m = model();
        assert!(m.intersections(Position::new(0, 1)).is_empty());
        assert!(m.intersections(Position::new(1, 0)).is_empty());
    }

    #[test]
    fn rejects_empty_line() {
        assert!(LineModel::single(Vec::new()).is_err());
    }
}
