#![forbid(unsafe_code)]

//! Box plots. Each box is a row of seven sections, lower outliers first.
//!
//! Outlier sections hold a list (possibly empty); the five summary sections
//! hold one value each. Sections are tagged with their [`Segment`] so audio
//! can shape them and text can name them.

use chartnav_core::{
    AudioCue, AxisLabels, BoxSummary, BrailleSeries, Grid, Labeled, Movable, MovableOptions,
    Panning, Point, Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, category, category_index, range_or_unit};
use crate::error::{EngineError, Result};

const SECTIONS: usize = Segment::BOX.len();

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    labels: Vec<String>,
    boxes: Vec<BoxSummary>,
    range: ValueRange,
}

impl BoxModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without boxes, with a label count that
    /// differs from the box count, or with unordered summaries.
    pub fn new(labels: Vec<String>, boxes: Vec<BoxSummary>) -> Result<Self> {
        if boxes.is_empty() || labels.len() != boxes.len() {
            return Err(EngineError::InvalidData(format!(
                "box plot needs one label per box, got {} labels for {} boxes",
                labels.len(),
                boxes.len()
            )));
        }
        if let Some(i) = boxes
            .iter()
            .position(|b| !(b.min <= b.q1 && b.q1 <= b.median && b.median <= b.q3 && b.q3 <= b.max))
        {
            return Err(EngineError::InvalidData(format!("box {i} summary is not ordered")));
        }
        let range = range_or_unit(boxes.iter().flat_map(|b| {
            b.lower_outliers
                .iter()
                .chain(b.upper_outliers.iter())
                .copied()
                .chain([b.min, b.max])
                .collect::<Vec<_>>()
        }));
        Ok(Self { labels, boxes, range })
    }

    fn section(&self, pos: Position) -> Option<(Segment, Value)> {
        let summary = self.boxes.get(pos.row)?;
        let segment = *Segment::BOX.get(pos.col)?;
        let value = match segment {
            Segment::LowerOutlier => Value::Numbers(summary.lower_outliers.clone()),
            Segment::Minimum => Value::Number(summary.min),
            Segment::Q1 => Value::Number(summary.q1),
            Segment::Median => Value::Number(summary.median),
            Segment::Q3 => Value::Number(summary.q3),
            Segment::Maximum => Value::Number(summary.max),
            _ => Value::Numbers(summary.upper_outliers.clone()),
        };
        Some((segment, value))
    }
}

impl TraceModel for BoxModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Box
    }

    fn topology(&self) -> Result<Topology> {
        Ok(Grid::rectangular(self.boxes.len(), SECTIONS, MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let label = category(&self.labels, pos.row);
        let (segment, value) = self
            .section(pos)
            .unwrap_or((Segment::Datum, Value::Missing));
        Description {
            point: Point::new(label.clone())
                .with_secondary(value.clone())
                .with_segment(segment),
            audio: AudioCue {
                value: value.clone(),
                range: self.range,
                panning: Panning::new(pos.col, SECTIONS),
                group: None,
                segment,
                multi_valued: self.multi_valued(),
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), label),
                cross: Labeled::new(axes.y.clone(), value),
                fill: None,
                section: segment.label().map(str::to_owned),
                range: None,
            },
        }
    }

    fn braille(&self) -> Option<BrailleSeries> {
        Some(BrailleSeries::Box {
            boxes: self.boxes.clone(),
            range: self.range,
        })
    }

    fn multi_valued(&self) -> bool {
        self.boxes
            .iter()
            .any(|b| b.lower_outliers.len() > 1 || b.upper_outliers.len() > 1)
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.labels
            .get(topology.position().row)
            .map(|s| Value::Category(s.clone()))
    }

    fn locate_x(&self, x: &Value, _row: usize) -> Option<Position> {
        let row = category_index(&self.labels, x)?;
        // Land on the median, the section every box has.
        Some(Position::new(row, 3))
    }

    /// The current section across every box; outlier sections have no line.
    fn line(&self, topology: &Topology) -> Option<Line> {
        let col = topology.position().col;
        let positions: Vec<Position> = (0..self.boxes.len()).map(|row| Position::new(row, col)).collect();
        let values = positions
            .iter()
            .map(|&pos| self.value_at(topology, pos))
            .collect::<Option<Vec<f64>>>()?;
        Some(Line {
            key: col,
            values,
            positions,
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        match self.section(pos)? {
            (_, Value::Number(v)) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::{NavDirection, SegmentShape};

    fn summary(base: f64, upper: Vec<f64>) -> BoxSummary {
        BoxSummary {
            lower_outliers: Vec::new(),
            min: base,
            q1: base + 1.0,
            median: base + 2.0,
            q3: base + 3.0,
            max: base + 4.0,
            upper_outliers: upper,
        }
    }

    fn model() -> BoxModel {
        BoxModel::new(
            vec!["A".into(), "B".into()],
            vec![summary(0.0, vec![30.0, 41.0]), summary(5.0, Vec::new())],
        )
        .unwrap()
    }

    #[test]
    fn sections_walk_left_to_right() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        let segments: Vec<Segment> = (0..SECTIONS)
            .map(|_| {
                let s = m.describe(&topo, &AxisLabels::default()).point.segment;
                topo.move_once(NavDirection::Right);
                s
            })
            .collect();
        assert_eq!(segments, Segment::BOX);
    }

    #[test]
    fn outliers_are_lists() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_to_index(Position::new(0, 6));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.cross.value, Value::Numbers(vec![30.0, 41.0]));
        assert_eq!(d.text.section.as_deref(), Some("Upper outlier(s)"));
        assert_eq!(d.audio.segment.shape(), SegmentShape::Punctual);
        assert!(d.audio.multi_valued);
        assert_eq!(m.value_at(&topo, Position::new(0, 6)), None);
    }

    #[test]
    fn range_covers_outliers() {
        assert_eq!(model().range, ValueRange::new(0.0, 41.0));
    }

    #[test]
    fn median_line_spans_boxes() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_to_index(Position::new(1, 3));
        let line = m.line(&topo).unwrap();
        assert_eq!(line.values, vec![2.0, 7.0]);
        topo.move_to_index(Position::new(1, 0));
        assert!(m.line(&topo).is_none());
    }

    #[test]
    fn rejects_unordered_summary() {
        let mut bad = summary(0.0, Vec::new());
        bad.q1 = 10.0;
        assert!(BoxModel::new(vec!["A".into()], vec![bad]).is_err());
    }
}
