#![forbid(unsafe_code)]

//! Segmented bars: stacked, dodged or normalized bars over shared categories.
//!
//! Each level (fill value) is a row, bottom first, and one more row on top
//! holds the per-category sum. Every row is voiced in its own timbre and
//! scaled against its own range, so the sum never drowns out the levels.

use chartnav_core::{
    AudioCue, AxisLabels, BrailleSeries, Grid, Labeled, Movable, MovableOptions, Panning, Point,
    Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{BarSeries, Description, Line, TraceModel, category, category_index, range_or_unit};
use crate::error::{EngineError, Result};

/// Fill label of the summary row.
pub const SUM_LEVEL: &str = "Sum";
const LEVEL_LABEL: &str = "Level";
const UNNAMED_LEVEL: &str = "undefined";

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedModel {
    categories: Vec<String>,
    /// Levels bottom first, then the summary row.
    rows: Vec<BarSeries>,
    ranges: Vec<ValueRange>,
}

impl SegmentedModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without levels or with a level that does
    /// not have one value per category.
    pub fn new(categories: Vec<String>, levels: Vec<BarSeries>) -> Result<Self> {
        if levels.is_empty() {
            return Err(EngineError::InvalidData("segmented bars have no level".into()));
        }
        if let Some(bad) = levels.iter().find(|s| s.values.len() != categories.len()) {
            return Err(EngineError::InvalidData(format!(
                "level {:?} has {} values for {} categories",
                bad.name.as_deref().unwrap_or(UNNAMED_LEVEL),
                bad.values.len(),
                categories.len()
            )));
        }
        let sums = (0..categories.len())
            .map(|col| {
                levels
                    .iter()
                    .map(|s| s.values[col])
                    .filter(|v| v.is_finite())
                    .sum()
            })
            .collect();
        let mut rows = levels;
        rows.push(BarSeries::new(SUM_LEVEL, sums));
        let ranges = rows
            .iter()
            .map(|s| range_or_unit(s.values.iter().copied()))
            .collect();
        Ok(Self {
            categories,
            rows,
            ranges,
        })
    }

    /// Whether `row` is the summary row.
    #[must_use]
    pub fn is_sum_row(&self, row: usize) -> bool {
        row + 1 == self.rows.len()
    }

    fn value(&self, pos: Position) -> Option<f64> {
        self.rows.get(pos.row)?.values.get(pos.col).copied()
    }
}

impl TraceModel for SegmentedModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Segmented
    }

    fn topology(&self) -> Result<Topology> {
        Ok(Grid::rectangular(self.rows.len(), self.categories.len(), MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let x = category(&self.categories, pos.col);
        let y = self.value(pos).map_or(Value::Missing, Value::Number);
        let level = self
            .rows
            .get(pos.row)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| UNNAMED_LEVEL.to_owned());

        Description {
            point: Point::new(x.clone())
                .with_secondary(y.clone())
                .with_group(level.clone()),
            audio: AudioCue {
                value: y.clone(),
                range: self
                    .ranges
                    .get(pos.row)
                    .copied()
                    .unwrap_or(ValueRange::new(0.0, 1.0)),
                panning: Panning::new(pos.col, self.categories.len()),
                group: Some(pos.row),
                segment: Segment::Datum,
                multi_valued: false,
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), x),
                cross: Labeled::new(axes.y.clone(), y),
                fill: Some(Labeled::new(LEVEL_LABEL, level)),
                section: None,
                range: None,
            },
        }
    }

    fn braille(&self) -> Option<BrailleSeries> {
        Some(BrailleSeries::Bar {
            rows: self.rows.iter().map(|s| s.values.clone()).collect(),
        })
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.categories
            .get(topology.position().col)
            .map(|s| Value::Category(s.clone()))
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let col = category_index(&self.categories, x)?;
        Some(Position::new(row.min(self.rows.len() - 1), col))
    }

    fn line(&self, topology: &Topology) -> Option<Line> {
        let row = topology.position().row;
        let series = self.rows.get(row)?;
        Some(Line {
            key: row,
            values: series.values.clone(),
            positions: (0..series.values.len()).map(|col| Position::new(row, col)).collect(),
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        self.value(pos)
    }
}
