#![forbid(unsafe_code)]

//! Heatmaps: a labelled grid whose cell value is the fill.

use chartnav_core::{
    AudioCue, AxisLabels, BrailleSeries, Grid, Labeled, Movable, MovableOptions, Panning, Point,
    Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, category, category_index, fill_label, range_or_unit};
use crate::error::{EngineError, Result};

/// `values[row][col]`, row 0 at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapModel {
    x_labels: Vec<String>,
    y_labels: Vec<String>,
    values: Vec<Vec<f64>>,
    range: ValueRange,
}

impl HeatmapModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] when the value matrix does not match the
    /// labels.
    pub fn new(x_labels: Vec<String>, y_labels: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        if values.len() != y_labels.len() || values.iter().any(|row| row.len() != x_labels.len()) {
            return Err(EngineError::InvalidData(format!(
                "heatmap needs {} rows of {} values",
                y_labels.len(),
                x_labels.len()
            )));
        }
        let range = range_or_unit(values.iter().flatten().copied());
        Ok(Self {
            x_labels,
            y_labels,
            values,
            range,
        })
    }

    fn value(&self, pos: Position) -> Option<f64> {
        self.values.get(pos.row)?.get(pos.col).copied()
    }
}

impl TraceModel for HeatmapModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Heatmap
    }

    fn topology(&self) -> Result<Topology> {
        Ok(Grid::rectangular(self.y_labels.len(), self.x_labels.len(), MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let x = category(&self.x_labels, pos.col);
        let y = category(&self.y_labels, pos.row);
        let v = self.value(pos).map_or(Value::Missing, Value::Number);

        let mut point = Point::new(x.clone()).with_secondary(v.clone());
        if let Value::Category(label) = &y {
            point = point.with_group(label.clone());
        }
        Description {
            point,
            audio: AudioCue {
                value: v.clone(),
                range: self.range,
                panning: Panning::new(pos.col, self.x_labels.len()),
                group: None,
                segment: Segment::Datum,
                multi_valued: false,
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), x),
                cross: Labeled::new(axes.y.clone(), y),
                fill: Some(Labeled::new(fill_label(axes, "Value"), v)),
                section: None,
                range: None,
            },
        }
    }

    fn braille(&self) -> Option<BrailleSeries> {
        Some(BrailleSeries::Heatmap {
            rows: self.values.clone(),
        })
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.x_labels
            .get(topology.position().col)
            .map(|s| Value::Category(s.clone()))
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let col = category_index(&self.x_labels, x)?;
        Some(Position::new(row.min(self.y_labels.len() - 1), col))
    }

    fn line(&self, topology: &Topology) -> Option<Line> {
        let row = topology.position().row;
        let values = self.values.get(row)?.clone();
        let positions = (0..values.len()).map(|col| Position::new(row, col)).collect();
        Some(Line {
            key: row,
            values,
            positions,
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        self.value(pos)
    }
}
